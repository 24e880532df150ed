//! Per-category spending totals compared against the month's goals.

use std::collections::BTreeMap;

use rusqlite::{Connection, named_params};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    Error,
    auth::UserID,
    category::get_categories,
    money::get_decimal,
    period::Period,
};

/// What a user spent in a month next to what they planned to spend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    /// The month the summary covers, 1 to 12.
    pub month: u8,
    /// The year the summary covers.
    pub year: i32,
    /// Category name to the total spent. Categories without spending are absent.
    pub spending_by_category: BTreeMap<String, Decimal>,
    /// Category name to the goal set for the month.
    pub goals_by_category: BTreeMap<String, Decimal>,
    /// Every category name of the user, sorted ascending.
    pub categories: Vec<String>,
}

/// Summarize the user's spending and goals for `period`.
///
/// Amounts are summed as decimals so the totals are exact.
///
/// # Errors
/// Returns [Error::AmountOverflow] if a category's total is too large to represent.
pub fn get_stats_summary(
    user_id: UserID,
    period: Period,
    connection: &Connection,
) -> Result<StatsSummary, Error> {
    let categories = get_categories(user_id, connection)?
        .into_iter()
        .map(|category| category.name.to_string())
        .collect();

    let mut spending_by_category = BTreeMap::new();
    let mut statement = connection.prepare(
        "SELECT category.name, \"transaction\".amount
        FROM \"transaction\"
        INNER JOIN category ON category.id = \"transaction\".category_id
        WHERE \"transaction\".user_id = :user_id
            AND CAST(strftime('%m', \"transaction\".date) AS INTEGER) = :month
            AND CAST(strftime('%Y', \"transaction\".date) AS INTEGER) = :year",
    )?;
    let rows = statement.query_map(
        named_params! {
            ":user_id": user_id.as_i64(),
            ":month": period.month,
            ":year": period.year,
        },
        |row| Ok((row.get::<_, String>(0)?, get_decimal(row, 1)?)),
    )?;

    for row in rows {
        let (name, amount) = row?;
        let total = spending_by_category.entry(name).or_insert(Decimal::ZERO);
        *total = total.checked_add(amount).ok_or(Error::AmountOverflow)?;
    }

    let goals_by_category = connection
        .prepare(
            "SELECT category.name, spending_goal.goal_amount
            FROM spending_goal
            INNER JOIN category ON category.id = spending_goal.category_id
            WHERE spending_goal.user_id = :user_id
                AND spending_goal.month = :month
                AND spending_goal.year = :year",
        )?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":month": period.month,
                ":year": period.year,
            },
            |row| Ok((row.get::<_, String>(0)?, get_decimal(row, 1)?)),
        )?
        .collect::<Result<BTreeMap<_, _>, _>>()?;

    Ok(StatsSummary {
        month: period.month,
        year: period.year,
        spending_by_category,
        goals_by_category,
        categories,
    })
}
