//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    identity::Identity,
    transaction::{reload_transactions_response, service::record_transaction},
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

/// The JSON body for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// The value of the transaction in the smallest currency unit, as a string.
    #[serde(with = "crate::transaction::amount")]
    pub amount: i64,
    /// Text detailing the transaction.
    pub description: String,
}

/// A route handler for creating a new transaction owned by the caller.
///
/// Responds 204 No Content with the `HX-Trigger: reload-transactions` header on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(identity): Extension<Identity>,
    form: Result<Json<TransactionForm>, JsonRejection>,
) -> Response {
    let form = match form {
        Ok(Json(form)) => form,
        Err(rejection) => {
            tracing::debug!("Rejected transaction body: {rejection}");
            return Error::BadRequest(rejection.body_text()).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    if let Err(error) = record_transaction(&identity, form.amount, &form.description, &connection)
    {
        tracing::error!("could not create transaction: {error}");
        return error.into_response();
    }

    reload_transactions_response()
}
