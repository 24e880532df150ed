//! Spending per category for a month compared against the month's goals.

mod chart;
mod core;
mod page;

pub use self::core::{StatsSummary, get_stats_summary};
pub use page::get_stats_page;
