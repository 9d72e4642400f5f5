//! Defines the endpoint that lists the caller's transactions.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_htmx::HxRequest;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    identity::Identity,
    transaction::{service::list_transactions, view::transactions_fragment},
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing the caller's transactions, most recent first, with their sum.
///
/// Responds with JSON, or with an HTML fragment when the request was made by HTMX.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionsState>,
    Extension(identity): Extension<Identity>,
    HxRequest(is_htmx_request): HxRequest,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let list = match list_transactions(&identity, &connection) {
        Ok(list) => list,
        Err(error) => {
            tracing::error!("could not list transactions for {}: {error}", identity.email);
            return error.into_response();
        }
    };

    if is_htmx_request {
        transactions_fragment(&list).into_response()
    } else {
        Json(list).into_response()
    }
}
