//! Per-user categories for grouping transactions and spending goals.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use create::create_category_endpoint;
pub use db::{
    create_category, create_category_table, delete_category, get_categories, get_category,
    rename_category,
};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryId, CategoryName};
pub use edit::rename_category_endpoint;
pub use list::{get_categories_json, get_categories_page};
