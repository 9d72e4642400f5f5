//! Spenn is a small backend for keeping track of personal income and expenses.
//!
//! Callers are authenticated by an OAuth2 proxy that sits in front of the
//! server. The proxy's session cookie is exchanged for the caller's email
//! address, and every transaction belongs to the user with that address.
//!
//! This library provides a JSON API, with an HTML fragment variant of the
//! transaction list for HTMX clients.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod database_id;
mod db;
mod endpoints;
mod identity;
mod logging;
mod not_found;
mod routing;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use database_id::TransactionId;
pub use db::initialize as initialize_db;
pub use identity::{
    DEFAULT_USERINFO_TIMEOUT, Identity, IdentityError, IdentityResolver, SESSION_COOKIE,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{NewTransaction, Transaction, create_transaction};
pub use user::{User, UserID, get_or_create_user};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
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
    /// The caller's session could not be exchanged for an identity.
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] IdentityError),

    /// The request body or path could not be parsed.
    ///
    /// Holds a description of what was wrong that is safe to show the client.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The caller tried to modify a transaction owned by another user.
    #[error("forbidden")]
    Forbidden,

    /// The caller's user account has been soft-deleted and may no longer record transactions.
    #[error("the user account has been deleted")]
    DisabledUser,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A transaction refers to a user that no longer exists.
    #[error("transaction {0} refers to a user that does not exist")]
    MissingOwner(TransactionId),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
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
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Forbidden | Error::DisabledUser => StatusCode::FORBIDDEN,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::MissingOwner(_) | Error::SqlError(_) | Error::DatabaseLockError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// The JSON body sent to the client for every failed request.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match self {
            // The reason may name the userinfo endpoint, so it stays in the logs.
            Error::Unauthorized(ref error) => {
                tracing::warn!("Rejected unauthenticated request: {error}");
                "unauthorized".to_owned()
            }
            // Internal details are for the server logs only.
            Error::MissingOwner(_) | Error::SqlError(_) | Error::DatabaseLockError => {
                tracing::error!("An unexpected error occurred: {}", self);
                "an unexpected error occurred, check the server logs for more details".to_owned()
            }
            error => error.to_string(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
