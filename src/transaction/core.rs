//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row, named_params};
use rust_decimal::Decimal;
use serde::Serialize;
use time::{Date, macros::format_description};

use crate::{
    Error,
    auth::UserID,
    category::{CategoryId, CategoryName},
    money::{MAX_AMOUNT, get_decimal, parse_amount},
};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Database identifier for a transaction.
pub type TransactionId = i64;

// ============================================================================
// MODELS
// ============================================================================

/// Money spent by a user in one of their categories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The ID of the category the transaction belongs to.
    pub category_id: CategoryId,
    /// The name of the category the transaction belongs to.
    pub category_name: CategoryName,
    /// The amount of money spent, always positive.
    pub amount: Decimal,
    /// When the transaction happened.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// An optional note about what the money was spent on.
    pub comment: Option<String>,
}

/// A validated transaction that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The ID of the category to file the transaction under.
    pub category_id: CategoryId,
    /// The amount of money spent.
    pub amount: Decimal,
    /// When the transaction happened.
    pub date: Date,
    /// An optional note, `None` when the form's comment was blank.
    pub comment: Option<String>,
}

impl NewTransaction {
    /// Validate raw form values.
    ///
    /// Fields are checked in the order amount, category, date and the first failure is returned.
    /// A blank comment is treated as no comment.
    ///
    /// # Errors
    /// Returns:
    /// - [Error::InvalidAmount] if `amount` is missing, not a number, not positive or above
    ///   [MAX_AMOUNT],
    /// - [Error::InvalidCategory] if `category` is missing or not an integer,
    /// - [Error::InvalidDate] if `date` is missing or not formatted as YYYY-MM-DD.
    pub fn parse(amount: &str, category: &str, date: &str, comment: &str) -> Result<Self, Error> {
        let amount = parse_amount(amount)
            .filter(|amount| {
                amount.is_sign_positive() && !amount.is_zero() && *amount <= MAX_AMOUNT
            })
            .ok_or(Error::InvalidAmount)?;

        let category_id = category
            .trim()
            .parse::<CategoryId>()
            .map_err(|_| Error::InvalidCategory)?;

        let date = Date::parse(date.trim(), format_description!("[year]-[month]-[day]"))
            .map_err(|_| Error::InvalidDate)?;

        let comment = Some(comment.trim())
            .filter(|comment| !comment.is_empty())
            .map(str::to_owned);

        Ok(Self {
            category_id,
            amount,
            date,
            comment,
        })
    }
}

/// Optional constraints on which transactions to list.
///
/// A `None` field places no constraint on the results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Only list transactions dated in this month, 1 to 12.
    pub month: Option<i64>,
    /// Only list transactions dated in this year.
    pub year: Option<i64>,
    /// Only list transactions in this category.
    pub category_id: Option<CategoryId>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Store a new transaction for `user_id` and return its ID.
///
/// # Errors
/// Returns [Error::InvalidCategory] if the category does not belong to `user_id`,
/// in which case nothing is written.
pub fn create_transaction(
    user_id: UserID,
    transaction: &NewTransaction,
    connection: &Connection,
) -> Result<TransactionId, Error> {
    // Inserting from the category table writes nothing unless the user owns the category.
    let rows_affected = connection.execute(
        "INSERT INTO \"transaction\" (user_id, category_id, amount, date, comment)
        SELECT :user_id, category.id, :amount, :date, :comment
        FROM category
        WHERE category.id = :category_id AND category.user_id = :user_id",
        named_params! {
            ":user_id": user_id.as_i64(),
            ":category_id": transaction.category_id,
            ":amount": transaction.amount.to_string(),
            ":date": transaction.date,
            ":comment": transaction.comment,
        },
    )?;

    if rows_affected == 0 {
        return Err(Error::InvalidCategory);
    }

    Ok(connection.last_insert_rowid())
}

/// Retrieve one of the user's transactions by ID.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction does not exist or belongs to another user.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT \"transaction\".id, category.id, category.name, amount, date, comment
            FROM \"transaction\"
            INNER JOIN category ON \"transaction\".category_id = category.id
            WHERE \"transaction\".id = :id AND \"transaction\".user_id = :user_id",
        )?
        .query_row(
            named_params! {":id": id, ":user_id": user_id.as_i64()},
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Get the user's transactions that match `filter`, newest first.
///
/// Transactions on the same date are ordered by descending ID so the order is stable.
pub fn get_transactions(
    user_id: UserID,
    filter: TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT \"transaction\".id, category.id, category.name, amount, date, comment
            FROM \"transaction\"
            INNER JOIN category ON \"transaction\".category_id = category.id
            WHERE \"transaction\".user_id = :user_id
                AND (:month IS NULL OR CAST(strftime('%m', date) AS INTEGER) = :month)
                AND (:year IS NULL OR CAST(strftime('%Y', date) AS INTEGER) = :year)
                AND (:category_id IS NULL OR \"transaction\".category_id = :category_id)
            ORDER BY date DESC, \"transaction\".id DESC",
        )?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":month": filter.month,
                ":year": filter.year,
                ":category_id": filter.category_id,
            },
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Delete one of the user's transactions.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction does not exist or belongs to another user.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Create the transaction table.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            amount TEXT NOT NULL,
            date TEXT NOT NULL,
            comment TEXT,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
    )?;

    Ok(())
}

fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_category_name: String = row.get(2)?;

    Ok(Transaction {
        id: row.get(0)?,
        category_id: row.get(1)?,
        category_name: CategoryName::new_unchecked(&raw_category_name),
        amount: get_decimal(row, 3)?,
        date: row.get(4)?,
        comment: row.get(5)?,
    })
}

#[cfg(test)]
mod new_transaction_tests {
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::Error;

    use super::NewTransaction;

    #[test]
    fn parses_valid_form() {
        let got = NewTransaction::parse("12.50", "3", "2024-03-05", "  lunch ");

        assert_eq!(
            got,
            Ok(NewTransaction {
                category_id: 3,
                amount: Decimal::new(1250, 2),
                date: date!(2024 - 03 - 05),
                comment: Some("lunch".to_owned()),
            })
        );
    }

    #[test]
    fn blank_comment_is_none() {
        let got = NewTransaction::parse("1", "1", "2024-03-05", "   ").unwrap();

        assert_eq!(got.comment, None);
    }

    #[test]
    fn rejects_bad_amounts() {
        for amount in ["", "abc", "0", "0.00", "-5"] {
            assert_eq!(
                NewTransaction::parse(amount, "1", "2024-03-05", ""),
                Err(Error::InvalidAmount),
                "amount {amount:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_amounts_above_the_maximum() {
        for amount in ["1000000000000.01", "79228162514264337593543950335"] {
            assert_eq!(
                NewTransaction::parse(amount, "1", "2024-03-05", ""),
                Err(Error::InvalidAmount),
                "amount {amount:?} should be rejected"
            );
        }

        let got = NewTransaction::parse("1000000000000", "1", "2024-03-05", "").unwrap();
        assert_eq!(got.amount, Decimal::new(1_000_000_000_000, 0));
    }

    #[test]
    fn rejects_bad_category() {
        for category in ["", "food", "1.5"] {
            assert_eq!(
                NewTransaction::parse("10", category, "2024-03-05", ""),
                Err(Error::InvalidCategory),
                "category {category:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_bad_date() {
        for date in ["", "2024-13-01", "05/03/2024", "yesterday"] {
            assert_eq!(
                NewTransaction::parse("10", "1", date, ""),
                Err(Error::InvalidDate),
                "date {date:?} should be rejected"
            );
        }
    }

    #[test]
    fn amount_is_checked_before_category_and_date() {
        assert_eq!(
            NewTransaction::parse("-1", "x", "nope", ""),
            Err(Error::InvalidAmount)
        );
        assert_eq!(
            NewTransaction::parse("1", "x", "nope", ""),
            Err(Error::InvalidCategory)
        );
    }
}
