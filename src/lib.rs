//! Budget Tracker is a web app for recording income and expenses and
//! comparing them against planned budgets.
//!
//! This library provides a web server that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod category;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod landing;
mod logging;
mod navigation;
mod not_found;
mod report;
mod routing;
mod timezone;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{PasswordHash, ValidatedPassword};
pub use category::{CategoryName, NewCategory, TransactionType, create_category};
pub use database_id::{CategoryId, TransactionId};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use timezone::get_local_offset;
pub use transaction::{NewTransaction, add_transaction};
pub use user::{NewUser, User, UserID, create_user, get_user_by_id, recompute_balance};

use crate::{
    html::error_view, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A required form field was left empty.
    ///
    /// The string is the human readable name of the field, e.g. "Amount".
    #[error("{0} is mandatory")]
    MissingField(&'static str),

    /// The amount could not be parsed as a positive, finite number.
    #[error("\"{0}\" is not a valid amount, enter a positive number")]
    InvalidAmount(String),

    /// The date could not be parsed as a `YYYY-MM-DD` date.
    #[error("\"{0}\" is not a valid date, use the format YYYY-MM-DD")]
    InvalidDate(String),

    /// The transaction type was something other than "Income" or "Expense".
    #[error("\"{0}\" is not a valid type, choose either Income or Expense")]
    InvalidTransactionType(String),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// The email address is not well formed.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The password does not meet the password policy.
    ///
    /// The string explains which rule was broken.
    #[error("{0}")]
    InvalidPassword(String),

    /// The password and the confirmation password are different.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// The email is not registered or the password is wrong.
    #[error("Incorrect email or password")]
    InvalidCredentials,

    /// The email address is already used by another user.
    #[error("An account with this email address already exists")]
    DuplicateEmail,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The category ID used to create a transaction does not refer to one of
    /// the user's categories.
    #[error("the selected category does not exist")]
    CategoryNotFound,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The auth token could not be written to or read from the cookie jar.
    #[error("could not process the auth cookie: {0}")]
    CookieError(String),
}

impl Error {
    /// Whether the error was caused by bad user input that the user can fix
    /// by editing the form and submitting it again.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Error::MissingField(_)
                | Error::InvalidAmount(_)
                | Error::InvalidDate(_)
                | Error::InvalidTransactionType(_)
                | Error::EmptyCategoryName
                | Error::InvalidEmail(_)
                | Error::InvalidPassword(_)
                | Error::PasswordMismatch
        )
    }

    /// Whether the error means a row the user asked for does not exist (or
    /// belongs to somebody else).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NotFound
                | Error::CategoryNotFound
                | Error::DeleteMissingTransaction
                | Error::UpdateMissingCategory
                | Error::DeleteMissingCategory
        )
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            error if error.is_not_found() => get_404_not_found_response(),
            error if error.is_validation_error() => (
                StatusCode::UNPROCESSABLE_ENTITY,
                error_view(
                    "Invalid Input",
                    "422",
                    &error.to_string(),
                    "Go back, fix the highlighted field and try again.",
                ),
            )
                .into_response(),
            Error::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                error_view(
                    "Unauthorized",
                    "401",
                    &Error::InvalidCredentials.to_string(),
                    "Log in again and try once more.",
                ),
            )
                .into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}
