//! The endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/categories/{category_id}', use [format_endpoint].

/// The root route which serves the log-in page.
pub const ROOT: &str = "/";
/// The route for logging in a user.
pub const LOG_IN: &str = "/login";
/// The route for the registration page and form.
pub const REGISTER: &str = "/create-account";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/logout";
/// The page for recording a new transaction, and the form target for creating one.
pub const TRANSACTION: &str = "/transaction";
/// The page for listing and filtering a user's transactions.
pub const TRANSACTIONS_VIEW: &str = "/crudtrans";
/// The route to delete a single transaction.
pub const DELETE_TRANSACTION: &str = "/delete-transaction/{transaction_id}";
/// The route to list (JSON) and create categories.
pub const CATEGORIES: &str = "/categories";
/// The route to rename or delete a single category.
pub const CATEGORY: &str = "/categories/{category_id}";
/// The page for managing categories.
pub const CATEGORIES_VIEW: &str = "/crudCategories";
/// The page and form target for monthly spending goals.
pub const GOALS: &str = "/goals";
/// The page comparing spending against goals.
pub const STATS: &str = "/stats";
/// The route for static files.
pub const STATIC: &str = "/static";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
