//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{delete, get, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{auth_guard, get_log_in_page, get_log_out, get_register_page, post_log_in, register_user},
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_json,
        get_categories_page, rename_category_endpoint,
    },
    endpoints,
    goal::{get_goals_page, save_goals_endpoint},
    not_found::get_404_not_found,
    stats::get_stats_page,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_create_transaction_page,
        get_transactions_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_log_in_page))
        .route(endpoints::LOG_IN, get(get_log_in_page).post(post_log_in))
        .route(
            endpoints::REGISTER,
            get(get_register_page).post(register_user),
        )
        .route(endpoints::LOG_OUT, get(get_log_out));

    // The guard answers unauthenticated callers in the form they expect, so the same layer serves
    // pages, HTMX forms and JSON clients.
    let protected_routes = Router::new()
        .route(
            endpoints::TRANSACTION,
            get(get_create_transaction_page).post(create_transaction_endpoint),
        )
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::DELETE_TRANSACTION,
            delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::CATEGORIES,
            get(get_categories_json).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            put(rename_category_endpoint).delete(delete_category_endpoint),
        )
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .route(
            endpoints::GOALS,
            get(get_goals_page).post(save_goals_endpoint),
        )
        .route(endpoints::STATS, get(get_stats_page))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}
