//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The seed dataset could not be fetched or decoded.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("could not fetch the seed dataset: {0}")]
    UpstreamFetch(String),

    /// A seed record had a date of sale that could not be parsed as a calendar date.
    #[error("invalid date of sale \"{0}\"")]
    InvalidSaleDate(String),

    /// The `page` or `perPage` query parameter was not an integer of at least one.
    #[error("invalid pagination parameter: {0}")]
    InvalidPagination(String),

    /// The query string could not be decoded, e.g. because a key was repeated.
    #[error("invalid query string: {0}")]
    InvalidQuery(String),

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A database query took longer than the configured timeout.
    #[error("the database query timed out")]
    QueryTimeout,

    /// The blocking task running a database query panicked or was cancelled.
    #[error("the background query task failed: {0}")]
    BackgroundTaskFailed(String),

    /// One of the sub-queries of the combined view failed.
    ///
    /// Wraps the first error that occurred. No partial results are returned.
    #[error("could not build the combined view: {0}")]
    CombinedViewFailed(Box<Error>),
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

/// The JSON body sent to clients when a request fails.
#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

impl Error {
    /// The HTTP status code clients should receive for this error.
    pub(crate) fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidPagination(_) | Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::CombinedViewFailed(inner) => inner.status_code(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert the error into a JSON response with a client-facing `message`.
    ///
    /// Server errors are logged with their full cause and only `message` is
    /// sent to the client. Client errors include their own description.
    pub(crate) fn into_json_response(self, message: &str) -> Response {
        let status = self.status_code();

        let error = if status.is_server_error() {
            tracing::error!("{message}: {self}");
            message.to_owned()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.into_json_response("An unexpected error occurred")
    }
}
