//! The endpoint for saving a batch of spending goals.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    endpoints,
    goal::{core::upsert_goals, form::GoalsForm},
    period::PeriodQuery,
};

/// The state needed to save goals.
#[derive(Debug, Clone)]
pub struct SaveGoalsState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for storing goals.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SaveGoalsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Save the submitted goals and redirect back to the goals page for the same month.
///
/// The body is decoded as raw pairs so that both the map and array shapes of the
/// `goals` field are accepted.
pub async fn save_goals_endpoint(
    State(state): State<SaveGoalsState>,
    Extension(user_id): Extension<UserID>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let form = GoalsForm::from_pairs(pairs);

    let period = match (PeriodQuery {
        month: form.month,
        year: form.year,
    })
    .resolve(&state.local_timezone)
    {
        Ok(period) => period,
        Err(error) => return error.into_alert_response(),
    };

    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match upsert_goals(user_id, period, &form.entries, &mut connection) {
        Ok(report) => {
            tracing::info!(
                "Saved goals for user {user_id} for {}/{}: {} applied, {} skipped",
                period.month,
                period.year,
                report.applied,
                report.skipped
            );

            let redirect_url = format!(
                "{}?month={}&year={}",
                endpoints::GOALS,
                period.month,
                period.year
            );

            (HxRedirect(redirect_url), StatusCode::SEE_OTHER).into_response()
        }
        Err(error) => {
            tracing::error!("Could not save goals for user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}
