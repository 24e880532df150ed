//! Category rename endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{CategoryId, CategoryName, db::rename_category, domain::CategoryFormData},
    endpoints,
};

/// The state needed for renaming a category.
#[derive(Debug, Clone)]
pub struct EditCategoryState {
    /// The database connection for renaming categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle the rename form for a single category.
pub async fn rename_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<CategoryFormData>,
) -> Response {
    let name = match CategoryName::new(&form.name) {
        Ok(name) => name,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match rename_category(category_id, name, user_id, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::NotFound | Error::DuplicateCategory)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while renaming category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod rename_category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Form,
        extract::{Path, State},
        http::StatusCode,
    };

    use crate::{
        auth::UserID,
        category::{
            Category, CategoryName, create_category, domain::CategoryFormData,
            edit::EditCategoryState, get_category,
        },
        endpoints,
        test_utils::{assert_hx_redirect, create_test_user, get_test_connection},
    };

    use super::rename_category_endpoint;

    fn get_state() -> (EditCategoryState, UserID, UserID, Category) {
        let connection = get_test_connection();
        let owner = create_test_user("owner@example.com", &connection).id;
        let other = create_test_user("other@example.com", &connection).id;
        let category =
            create_category(CategoryName::new_unchecked("Food"), owner, &connection).unwrap();

        (
            EditCategoryState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            owner,
            other,
            category,
        )
    }

    fn form(name: &str) -> Form<CategoryFormData> {
        Form(CategoryFormData {
            name: name.to_owned(),
        })
    }

    #[tokio::test]
    async fn can_rename_category() {
        let (state, owner, _, category) = get_state();

        let response = rename_category_endpoint(
            Path(category.id),
            State(state.clone()),
            Extension(owner),
            form("Groceries"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CATEGORIES_VIEW);
        let got = get_category(category.id, owner, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(got.name, CategoryName::new_unchecked("Groceries"));
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let (state, owner, _, category) = get_state();

        let response = rename_category_endpoint(
            Path(category.id),
            State(state.clone()),
            Extension(owner),
            form(""),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let got = get_category(category.id, owner, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(got.name, CategoryName::new_unchecked("Food"));
    }

    #[tokio::test]
    async fn renaming_another_users_category_is_not_found() {
        let (state, owner, other, category) = get_state();

        let response = rename_category_endpoint(
            Path(category.id),
            State(state.clone()),
            Extension(other),
            form("Stolen"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let got = get_category(category.id, owner, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(got.name, CategoryName::new_unchecked("Food"));
    }
}
