//! Category deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    category::{CategoryId, db::delete_category},
};

/// The state needed for deleting a category.
#[derive(Debug, Clone)]
pub struct DeleteCategoryState {
    /// The database connection for deleting categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle category deletion. Returns a success alert or an error alert.
///
/// The category's transactions and goals are deleted along with it.
pub async fn delete_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<DeleteCategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_category(category_id, user_id, &connection) {
        Ok(()) => Alert::Success {
            message: "Category deleted".to_owned(),
            details: "Its transactions and goals were deleted too.".to_owned(),
        }
        .into_response(),
        Err(Error::NotFound) => Error::NotFound.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };

    use crate::{
        Error,
        category::{CategoryName, create_category, get_category},
        test_utils::{assert_valid_html, create_test_user, get_test_connection, parse_html_fragment},
    };

    use super::{DeleteCategoryState, delete_category_endpoint};

    #[tokio::test]
    async fn delete_category_endpoint_succeeds() {
        let connection = get_test_connection();
        let user_id = create_test_user("test@example.com", &connection).id;
        let category =
            create_category(CategoryName::new_unchecked("Food"), user_id, &connection).unwrap();
        let state = DeleteCategoryState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response =
            delete_category_endpoint(Path(category.id), State(state.clone()), Extension(user_id))
                .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert!(html.html().contains("Category deleted"));
        assert_eq!(
            get_category(category.id, user_id, &state.db_connection.lock().unwrap()),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn deleting_another_users_category_is_not_found() {
        let connection = get_test_connection();
        let owner = create_test_user("owner@example.com", &connection).id;
        let other = create_test_user("other@example.com", &connection).id;
        let category =
            create_category(CategoryName::new_unchecked("Food"), owner, &connection).unwrap();
        let state = DeleteCategoryState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response =
            delete_category_endpoint(Path(category.id), State(state.clone()), Extension(other))
                .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(get_category(category.id, owner, &state.db_connection.lock().unwrap()).is_ok());
    }
}
