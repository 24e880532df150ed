//! Defines the app level error type and conversions to rendered HTML pages, alerts and JSON.
use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::json;

use crate::{alert::Alert, html::error_view, not_found::get_404_not_found_response};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email or password field of a log-in or registration form was empty.
    #[error("Email and password are required.")]
    MissingCredentials,

    /// The email used for registration is not a valid email address.
    #[error("\"{0}\" is not a valid email address.")]
    InvalidEmail(String),

    /// The email used for registration belongs to an existing user.
    #[error("Email is already in use.")]
    DuplicateEmail,

    /// The email does not belong to a user or the password did not match.
    ///
    /// Both cases share this variant so that clients cannot tell which emails
    /// are registered.
    #[error("Invalid email or password.")]
    InvalidCredentials,

    /// The request did not carry a valid session.
    #[error("You must be logged in to do that.")]
    Unauthenticated,

    /// The transaction amount was missing, not a number, not positive, or above one trillion.
    #[error("Invalid amount")]
    InvalidAmount,

    /// The category ID was missing, not an integer, or does not refer to one
    /// of the user's categories.
    #[error("Invalid category")]
    InvalidCategory,

    /// The date was missing or could not be parsed as a calendar date.
    #[error("Invalid date")]
    InvalidDate,

    /// The month or year does not describe a valid goal period.
    #[error("Invalid month or year")]
    InvalidPeriod,

    /// An empty string was used as a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// The user already has a category with the same name.
    #[error("Category already exists.")]
    DuplicateCategory,

    /// The requested resource was not found.
    ///
    /// Resources owned by other users are reported as not found as well.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The session cookie could not be created or read.
    #[error("could not create the session cookie: {0}")]
    CookieError(String),

    /// A total of stored amounts is too large to represent.
    #[error("the total of the stored amounts overflowed")]
    AmountOverflow,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.contains("category.name") =>
            {
                Error::DuplicateCategory
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code that best describes the error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingCredentials
            | Error::InvalidEmail(_)
            | Error::InvalidAmount
            | Error::InvalidCategory
            | Error::InvalidDate
            | Error::InvalidPeriod
            | Error::EmptyCategoryName
            | Error::DuplicateEmail
            | Error::DuplicateCategory => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials | Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::SqlError(_)
            | Error::HashingError(_)
            | Error::DatabaseLockError
            | Error::InvalidTimezoneError(_)
            | Error::CookieError(_)
            | Error::AmountOverflow => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message that is safe to show to the client.
    ///
    /// Internal errors are replaced with a generic message, their details
    /// only go to the server logs.
    fn public_message(&self) -> String {
        if self.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        }
    }

    fn log_if_internal(&self) {
        if self.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self);
        }
    }

    /// Render the error as an HTML alert fragment for HTMX requests.
    pub fn into_alert_response(self) -> Response {
        self.log_if_internal();

        let title = match self {
            Error::NotFound => "Not found",
            Error::DuplicateEmail | Error::DuplicateCategory => "Duplicate entry",
            Error::InvalidCredentials | Error::Unauthenticated => "Not logged in",
            ref error if error.status_code() == StatusCode::BAD_REQUEST => "Invalid input",
            _ => "Something went wrong",
        };

        (
            self.status_code(),
            Alert::Error {
                message: title.to_owned(),
                details: self.public_message(),
            },
        )
            .into_response()
    }

    /// Render the error as a JSON object for API clients.
    pub fn into_json_response(self) -> Response {
        self.log_if_internal();

        (
            self.status_code(),
            Json(json!({ "error": self.public_message() })),
        )
            .into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let (description, fix) = match self {
            Error::NotFound => return get_404_not_found_response(),
            Error::InvalidTimezoneError(ref timezone) => {
                tracing::error!("Could not get local timezone \"{timezone}\"");
                (
                    "Invalid Timezone Settings".to_owned(),
                    "Check your server settings and ensure the timezone has been set to a \
                    valid, canonical timezone string"
                        .to_owned(),
                )
            }
            ref error if status_code == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    "Sorry, something went wrong.".to_owned(),
                    "Try again later or check the server logs".to_owned(),
                )
            }
            error => (error.to_string(), "Go back and try again.".to_owned()),
        };

        let title = status_code.canonical_reason().unwrap_or("Error");

        (
            status_code,
            Html(error_view(title, status_code.as_str(), &description, &fix).into_string()),
        )
            .into_response()
    }
}
