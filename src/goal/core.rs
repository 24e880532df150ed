//! Monthly spending goals per category and the queries for storing them.

use std::collections::BTreeMap;

use rusqlite::{Connection, named_params};
use rust_decimal::Decimal;

use crate::{
    Error,
    auth::UserID,
    category::CategoryId,
    money::{get_decimal, parse_amount},
    period::Period,
};

/// An unvalidated goal from a submitted form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGoalEntry {
    /// The category ID as it appeared in the form.
    pub category: String,
    /// The goal amount as it appeared in the form.
    pub amount: String,
}

impl RawGoalEntry {
    /// An entry holding the form values `category` and `amount` as given.
    pub fn new(category: &str, amount: &str) -> Self {
        Self {
            category: category.to_owned(),
            amount: amount.to_owned(),
        }
    }

    fn parse(&self) -> Option<(CategoryId, Decimal)> {
        let category_id = self
            .category
            .trim()
            .parse::<CategoryId>()
            .ok()
            .filter(|id| *id > 0)?;
        let amount = parse_amount(&self.amount)?;

        Some((category_id, amount))
    }
}

/// How many goals of a batch were stored and how many were ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoalBatchReport {
    /// Goals inserted or updated.
    pub applied: usize,
    /// Entries ignored for a bad category ID or amount.
    pub skipped: usize,
}

/// Get the user's goals for `period` keyed by category ID.
pub fn get_goals_for_period(
    user_id: UserID,
    period: Period,
    connection: &Connection,
) -> Result<BTreeMap<CategoryId, Decimal>, Error> {
    connection
        .prepare(
            "SELECT category_id, goal_amount FROM spending_goal
            WHERE user_id = :user_id AND month = :month AND year = :year",
        )?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":month": period.month,
                ":year": period.year,
            },
            |row| Ok((row.get::<_, CategoryId>(0)?, get_decimal(row, 1)?)),
        )?
        .map(|maybe_goal| maybe_goal.map_err(Error::from))
        .collect()
}

/// Insert or update the user's goals for `period`.
///
/// Entries with a non-positive or non-integer category ID, an amount that is not a number, or a
/// category the user does not own are skipped and logged. All writes happen in one database
/// transaction, so an SQL error leaves the stored goals unchanged.
///
/// # Errors
/// Returns [Error::SqlError] if any write fails.
pub fn upsert_goals(
    user_id: UserID,
    period: Period,
    entries: &[RawGoalEntry],
    connection: &mut Connection,
) -> Result<GoalBatchReport, Error> {
    let transaction = connection.transaction()?;
    let mut report = GoalBatchReport::default();

    {
        // The WHERE clause is required for SQLite to parse the upsert after a SELECT.
        let mut statement = transaction.prepare(
            "INSERT INTO spending_goal (user_id, category_id, month, year, goal_amount)
            SELECT :user_id, category.id, :month, :year, :amount
            FROM category
            WHERE category.id = :category_id AND category.user_id = :user_id
            ON CONFLICT (user_id, category_id, month, year)
            DO UPDATE SET goal_amount = excluded.goal_amount",
        )?;

        for entry in entries {
            let Some((category_id, amount)) = entry.parse() else {
                tracing::warn!(
                    "Skipping invalid goal for user {user_id}: category={:?}, amount={:?}",
                    entry.category,
                    entry.amount
                );
                report.skipped += 1;
                continue;
            };

            let rows_affected = statement.execute(named_params! {
                ":user_id": user_id.as_i64(),
                ":category_id": category_id,
                ":month": period.month,
                ":year": period.year,
                ":amount": amount.to_string(),
            })?;

            if rows_affected == 0 {
                tracing::warn!("Skipping goal for unknown category {category_id} (user {user_id})");
                report.skipped += 1;
            } else {
                report.applied += 1;
            }
        }
    }

    transaction.commit()?;

    Ok(report)
}

/// Create the spending goal table.
pub fn create_spending_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS spending_goal (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
            year INTEGER NOT NULL,
            goal_amount TEXT NOT NULL,
            UNIQUE(user_id, category_id, month, year),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
        );",
    )?;

    Ok(())
}
