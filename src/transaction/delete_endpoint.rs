use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    identity::Identity,
    transaction::{reload_transactions_response, service::delete_owned_transaction},
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    db_connection: Arc<Mutex<Connection>>,
    /// Report other users' transactions as missing rather than forbidden.
    conceal_foreign_transactions: bool,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            conceal_foreign_transactions: state.conceal_foreign_transactions,
        }
    }
}

/// A route handler for deleting one of the caller's transactions.
///
/// Responds 204 No Content with the `HX-Trigger: reload-transactions` header on success.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(identity): Extension<Identity>,
    transaction_id: Result<Path<TransactionId>, PathRejection>,
) -> Response {
    let transaction_id = match transaction_id {
        Ok(Path(transaction_id)) => transaction_id,
        Err(rejection) => return Error::BadRequest(rejection.body_text()).into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_owned_transaction(&identity, transaction_id, &connection) {
        Ok(()) => reload_transactions_response(),
        Err(Error::Forbidden) if state.conceal_foreign_transactions => {
            Error::NotFound.into_response()
        }
        Err(error) => {
            tracing::debug!("Could not delete transaction {transaction_id}: {error}");
            error.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_extra::extract::cookie::Cookie;
    use axum_htmx::HX_TRIGGER;
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        endpoints::{self, format_endpoint},
        identity::SESSION_COOKIE,
        test_utils::{ALICE_SESSION, BOB_SESSION, bypass_router, userinfo_router},
        transaction::{RELOAD_TRANSACTIONS_EVENT, get_transaction},
    };

    async fn create_as(server: &TestServer, session: &'static str, description: &str) {
        server
            .post(endpoints::TRANSACTION)
            .add_cookie(Cookie::new(SESSION_COOKIE, session))
            .json(&json!({ "amount": "10", "description": description }))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn owner_can_delete() {
        let (server, state) = userinfo_router().await;
        create_as(&server, ALICE_SESSION, "mine").await;

        let response = server
            .delete(&format_endpoint(endpoints::TRANSACTION_BY_ID, 1))
            .add_cookie(Cookie::new(SESSION_COOKIE, ALICE_SESSION))
            .await;

        response.assert_status(StatusCode::NO_CONTENT);
        assert_eq!(response.header(HX_TRIGGER), RELOAD_TRANSACTIONS_EVENT);
        let connection = state.db_connection.lock().unwrap();
        assert!(get_transaction(1, &connection).is_err());
    }

    #[tokio::test]
    async fn non_owner_is_forbidden_and_transaction_survives() {
        let (server, state) = userinfo_router().await;
        create_as(&server, ALICE_SESSION, "mine").await;

        let response = server
            .delete(&format_endpoint(endpoints::TRANSACTION_BY_ID, 1))
            .add_cookie(Cookie::new(SESSION_COOKIE, BOB_SESSION))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
        response.assert_json(&json!({ "error": "forbidden" }));
        let connection = state.db_connection.lock().unwrap();
        assert!(get_transaction(1, &connection).is_ok());
    }

    #[tokio::test]
    async fn non_owner_gets_not_found_when_concealed() {
        let (server, state) = crate::test_utils::userinfo_router_with(|state| {
            state.with_foreign_transactions_concealed(true)
        })
        .await;
        create_as(&server, ALICE_SESSION, "mine").await;

        let foreign = server
            .delete(&format_endpoint(endpoints::TRANSACTION_BY_ID, 1))
            .add_cookie(Cookie::new(SESSION_COOKIE, BOB_SESSION))
            .await;
        let missing = server
            .delete(&format_endpoint(endpoints::TRANSACTION_BY_ID, 2))
            .add_cookie(Cookie::new(SESSION_COOKIE, BOB_SESSION))
            .await;

        foreign.assert_status_not_found();
        missing.assert_status_not_found();
        assert_eq!(foreign.text(), missing.text());
        let connection = state.db_connection.lock().unwrap();
        assert!(get_transaction(1, &connection).is_ok());
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found_every_time() {
        let server = TestServer::new(bypass_router());
        let path = format_endpoint(endpoints::TRANSACTION_BY_ID, 42);

        server.delete(&path).await.assert_status_not_found();
        server.delete(&path).await.assert_status_not_found();
    }

    #[tokio::test]
    async fn deleting_twice_is_not_found() {
        let server = TestServer::new(bypass_router());
        server
            .post(endpoints::TRANSACTION)
            .json(&json!({ "amount": "10", "description": "once" }))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        let path = format_endpoint(endpoints::TRANSACTION_BY_ID, 1);

        server
            .delete(&path)
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server.delete(&path).await.assert_status_not_found();
    }

    #[tokio::test]
    async fn non_numeric_id_is_bad_request() {
        let server = TestServer::new(bypass_router());

        let response = server.delete("/api/transaction/abc").await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
