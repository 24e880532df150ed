//! The registration page for creating an account.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{PasswordHash, User, ValidatedPassword, create_user},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, base, email_input, link, log_in_register, password_input},
};

fn registration_form(email: &str, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::REGISTER)
            hx-swap="outerHTML"
            hx-target-error="this"
            hx-indicator="#indicator"
            hx-disabled-elt="#password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (email_input(email))

            (password_input(error_message))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::ROOT, "Log in here"))
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form("", None);
    let content = log_in_register("Create an account", &registration_form);
    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The database connection for storing the new user.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost for hashing new passwords.
    pub password_cost: u32,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            password_cost: PasswordHash::DEFAULT_COST,
        }
    }
}

/// The raw data entered by the user in the registration form.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    /// Email entered during registration.
    #[serde(default)]
    pub email: String,
    /// Password entered during registration.
    #[serde(default)]
    pub password: String,
}

/// Validate `form`, hash the password and store the new user.
///
/// # Errors
///
/// Returns:
/// - [Error::MissingCredentials] if the email or password is empty,
/// - [Error::InvalidEmail] if the email is not a valid email address,
/// - [Error::DuplicateEmail] if the email belongs to an existing user,
/// - [Error::HashingError] or [Error::SqlError] if storing the user failed.
pub fn register(
    form: &RegisterForm,
    password_cost: u32,
    connection: &Connection,
) -> Result<User, Error> {
    let email = form.email.trim();

    if email.is_empty() {
        return Err(Error::MissingCredentials);
    }

    let password = ValidatedPassword::new(&form.password)?;

    if !EmailAddress::is_valid(email) {
        return Err(Error::InvalidEmail(email.to_owned()));
    }

    let password_hash = PasswordHash::new(password, password_cost)?;

    create_user(email, password_hash, connection)
}

/// Create a new account from the registration form.
///
/// On success the client is redirected to the log-in page, otherwise the form
/// is returned with the reason the account could not be created.
pub async fn register_user(
    State(state): State<RegistrationState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match register(&form, state.password_cost, &connection) {
        Ok(user) => {
            tracing::info!("Registered user {}", user.id);

            (HxRedirect(endpoints::ROOT.to_owned()), StatusCode::SEE_OTHER).into_response()
        }
        Err(error) if error.status_code() == StatusCode::BAD_REQUEST => (
            StatusCode::BAD_REQUEST,
            registration_form(&form.email, Some(&error.to_string())),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not register user: {error}");
            error.into_alert_response()
        }
    }
}
