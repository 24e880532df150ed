//! Helpers for exact decimal money amounts.
//!
//! Amounts are stored as decimal text in SQLite and only ever summed as [Decimal].

use std::str::FromStr;

use rusqlite::{Row, types::Type};
use rust_decimal::Decimal;

use crate::Error;

/// The largest amount a single transaction may hold, one trillion.
///
/// Far below [Decimal::MAX], so a month of transactions cannot overflow when summed.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Parse a user supplied amount such as "12.50".
///
/// Returns `None` for blank or non-numeric input.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();

    if raw.is_empty() {
        return None;
    }

    Decimal::from_str(raw).ok()
}

/// Add up `amounts` exactly.
///
/// # Errors
/// Returns [Error::AmountOverflow] if the total does not fit in a [Decimal].
pub fn sum_amounts(amounts: impl IntoIterator<Item = Decimal>) -> Result<Decimal, Error> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
        .ok_or(Error::AmountOverflow)
}

/// Read the decimal text in column `index` of `row`.
pub fn get_decimal(row: &Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let raw: String = row.get(index)?;

    Decimal::from_str(&raw)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::Error;

    use super::{MAX_AMOUNT, parse_amount, sum_amounts};

    #[test]
    fn parses_decimal_text() {
        assert_eq!(parse_amount(" 12.50 "), Some(Decimal::new(1250, 2)));
        assert_eq!(parse_amount("-3"), Some(Decimal::new(-3, 0)));
    }

    #[test]
    fn rejects_blank_and_garbage() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("   "), None);
        assert_eq!(parse_amount("twelve"), None);
        assert_eq!(parse_amount("1.2.3"), None);
    }

    #[test]
    fn max_amount_is_one_trillion() {
        assert_eq!(MAX_AMOUNT, Decimal::new(1_000_000_000_000, 0));
    }

    #[test]
    fn sums_exactly() {
        let amounts = [Decimal::new(10, 2), Decimal::new(20, 2), Decimal::new(30, 2)];

        assert_eq!(sum_amounts(amounts), Ok(Decimal::new(60, 2)));
        assert_eq!(sum_amounts([]), Ok(Decimal::ZERO));
    }

    #[test]
    fn overflowing_sum_is_an_error() {
        assert_eq!(sum_amounts([Decimal::MAX, Decimal::MAX]), Err(Error::AmountOverflow));
    }
}
