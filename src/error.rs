//! Defines the app level error type and its conversion into JSON error responses.

use axum::{
    Json,
    http::{StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A transaction was given a negative (or NaN) amount.
    ///
    /// Amounts are always stored as non-negative numbers, the transaction
    /// type says whether money came in or went out.
    #[error("amount must be zero or greater, got {0}")]
    InvalidAmount(f64),

    /// A transaction type other than "income" or "expense" was used.
    #[error("transaction type must be \"income\" or \"expense\", got \"{0}\"")]
    InvalidTransactionType(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The bearer token is missing, malformed, has a bad signature, has
    /// expired or does not name a subject.
    #[error("invalid or expired token")]
    InvalidToken,

    /// The username and password did not match the demo credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The token could not be signed.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidAmount(_) | Error::InvalidTransactionType(_) => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::InvalidToken | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::TokenCreation(_) | Error::DatabaseLockError | Error::SqlError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Any internal errors are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "internal server error".to_owned()
        } else {
            self.to_string()
        };

        let body = Json(json!({ "error": message }));

        match self {
            Error::InvalidToken => (status, [(WWW_AUTHENTICATE, "Bearer")], body).into_response(),
            _ => (status, body).into_response(),
        }
    }
}
