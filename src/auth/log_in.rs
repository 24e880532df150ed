//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The cookie module handles the lower level session cookie logic.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{User, get_user_by_email, invalidate_auth_cookie, set_auth_cookie},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, base, email_input, link, log_in_register, password_input},
};

fn log_in_form(email: &str, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (email_input(email))

            (password_input(error_message))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                "Log in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400" {
                "Don't have an account? "
                (link(endpoints::REGISTER, "Create one here"))
            }
        }
    }
}

/// Display the log-in page.
pub async fn get_log_in_page() -> Response {
    let log_in_form = log_in_form("", None);
    let content = log_in_register("Log in to your account", &log_in_form);
    base("Log In", &[], &content).into_response()
}

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the log-in form.
///
/// There is no need for validation beyond checking for empty fields since the
/// values are compared against the registered user.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct LogInData {
    /// Email entered during log-in.
    #[serde(default)]
    pub email: String,
    /// Password entered during log-in.
    #[serde(default)]
    pub password: String,
}

/// Check `credentials` against the registered users.
///
/// # Errors
///
/// Returns:
/// - [Error::MissingCredentials] if the email or password is empty,
/// - [Error::InvalidCredentials] if the email is unknown or the password does not match,
/// - [Error::HashingError] or [Error::SqlError] if the check itself failed.
pub fn verify_credentials(credentials: &LogInData, connection: &Connection) -> Result<User, Error> {
    let email = credentials.email.trim();

    if email.is_empty() || credentials.password.is_empty() {
        return Err(Error::MissingCredentials);
    }

    let user = match get_user_by_email(email, connection) {
        Ok(user) => user,
        Err(Error::NotFound) => return Err(Error::InvalidCredentials),
        Err(error) => return Err(error),
    };

    match user.password_hash.verify(&credentials.password) {
        Ok(true) => Ok(user),
        Ok(false) => Err(Error::InvalidCredentials),
        Err(error) => Err(Error::HashingError(error.to_string())),
    }
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie is set and the client is redirected to the
/// transaction page. Otherwise, the form is returned with an error message explaining the problem.
/// Unknown emails and wrong passwords get exactly the same message.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_alert_response();
            }
        };

        verify_credentials(&user_data, &connection)
    };

    let user = match user {
        Ok(user) => user,
        Err(error @ (Error::MissingCredentials | Error::InvalidCredentials)) => {
            return log_in_form(&user_data.email, Some(&error.to_string())).into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_form(
                &user_data.email,
                Some("An internal error occurred. Please try again later."),
            )
            .into_response();
        }
    };

    tracing::info!("User {} logged in", user.id);

    match set_auth_cookie(jar.clone(), user.id, state.cookie_duration) {
        Ok(updated_jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::TRANSACTION.to_owned()),
            updated_jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            (invalidate_auth_cookie(jar), error.into_alert_response()).into_response()
        }
    }
}


#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form, Router,
        body::Body,
        extract::State,
        http::{Response, StatusCode, header::SET_COOKIE},
        routing::post,
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use sha2::{Digest, Sha512};
    use time::OffsetDateTime;

    use crate::{
        Error,
        auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, PasswordHash, create_user, create_user_table},
        endpoints,
        test_utils::assert_hx_redirect,
    };

    use super::{LogInData, LoginState, post_log_in, verify_credentials};

    fn get_test_state() -> LoginState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");
        create_user(
            "test@example.com",
            PasswordHash::from_raw_password("test", 4).expect("Could not hash password"),
            &connection,
        )
        .expect("Could not create test user");

        LoginState {
            cookie_key: axum_extra::extract::cookie::Key::from(&Sha512::digest("foobar")),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    async fn new_log_in_request(email: &str, password: &str) -> Response<Body> {
        let state = get_test_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        post_log_in(
            State(state),
            jar,
            Form(LogInData {
                email: email.to_owned(),
                password: password.to_owned(),
            }),
        )
        .await
    }

    async fn get_error_message(response: Response<Body>) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&body).to_string();
        let fragment = scraper::Html::parse_fragment(&text);
        let error_selector = scraper::Selector::parse("p.text-red-500.text-base").unwrap();

        fragment
            .select(&error_selector)
            .next()
            .expect("expected error message paragraph")
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let response = new_log_in_request("test@example.com", "test").await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTION);

        let cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|header| Cookie::parse(header.to_str().unwrap().to_owned()).unwrap())
            .find(|cookie| cookie.name() == COOKIE_TOKEN)
            .expect("session cookie not set");
        assert!(cookie.expires_datetime() > Some(OffsetDateTime::now_utc()));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_get_identical_errors() {
        let wrong_password = new_log_in_request("test@example.com", "wrong").await;
        let unknown_email = new_log_in_request("nobody@example.com", "test").await;

        assert_eq!(wrong_password.status(), unknown_email.status());
        assert!(wrong_password.headers().get(SET_COOKIE).is_none());

        let wrong_password_message = get_error_message(wrong_password).await;
        let unknown_email_message = get_error_message(unknown_email).await;

        assert_eq!(wrong_password_message, "Invalid email or password.");
        assert_eq!(wrong_password_message, unknown_email_message);
    }

    #[tokio::test]
    async fn empty_fields_get_missing_credentials_message() {
        let response = new_log_in_request("", "").await;

        assert_eq!(
            get_error_message(response).await,
            "Email and password are required."
        );
    }

    #[test]
    fn verify_credentials_maps_unknown_email_to_invalid_credentials() {
        let state = get_test_state();
        let connection = state.db_connection.lock().unwrap();

        let result = verify_credentials(
            &LogInData {
                email: "nobody@example.com".to_owned(),
                password: "test".to_owned(),
            },
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidCredentials));
    }

    #[tokio::test]
    async fn form_deserialises_with_missing_fields() {
        let app = Router::new()
            .route(endpoints::LOG_IN, post(post_log_in))
            .with_state(get_test_state());
        let server = TestServer::new(app).expect("Could not create test server.");

        let response = server
            .post(endpoints::LOG_IN)
            .form(&[("email", "test@example.com")])
            .await;

        assert_ne!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
