//! Monthly spending goals per category.

mod core;
mod endpoint;
mod form;
mod page;

pub use self::core::{
    GoalBatchReport, RawGoalEntry, create_spending_goal_table, get_goals_for_period, upsert_goals,
};
pub use endpoint::save_goals_endpoint;
pub use page::get_goals_page;
