//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    transaction::core::{NewTransaction, create_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw form data for creating a transaction.
///
/// Every field defaults to an empty string so that missing fields are reported
/// as validation errors rather than rejected by the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionForm {
    /// The amount spent in dollars.
    #[serde(default)]
    pub amount: String,
    /// The ID of the category to file the transaction under.
    #[serde(default)]
    pub category: String,
    /// The date the money was spent, formatted as YYYY-MM-DD.
    #[serde(default)]
    pub date: String,
    /// An optional note.
    #[serde(default, alias = "comment")]
    pub comments: String,
}

/// A route handler for creating a new transaction, redirects back to the transaction page on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let transaction =
        match NewTransaction::parse(&form.amount, &form.category, &form.date, &form.comments) {
            Ok(transaction) => transaction,
            Err(error) => {
                tracing::debug!("Rejected transaction from user {user_id}: {error}");
                return error.into_alert_response();
            }
        };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_transaction(user_id, &transaction, &connection) {
        Ok(id) => {
            tracing::info!("User {user_id} created transaction {id}");

            (
                HxRedirect(endpoints::TRANSACTION.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(Error::InvalidCategory) => Error::InvalidCategory.into_alert_response(),
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            error.into_alert_response()
        }
    }
}
