//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router, middleware,
    routing::{delete, get, post},
};
use serde::Serialize;

use crate::{
    AppState, endpoints,
    identity::identity_guard,
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new().route(endpoints::STATUS, get(get_status));

    // `route_layer` so that unknown paths fall through to the 404 handler
    // instead of being rejected as unauthorized.
    let protected_routes = Router::new()
        .route(endpoints::TRANSACTION, post(create_transaction_endpoint))
        .route(endpoints::TRANSACTIONS, get(get_transactions_endpoint))
        .route(
            endpoints::TRANSACTION_BY_ID,
            delete(delete_transaction_endpoint),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), identity_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct Status {
    status: &'static str,
}

/// Report that the server is up. Downstream services are not checked.
async fn get_status() -> Json<Status> {
    Json(Status { status: "ok" })
}

#[cfg(test)]
mod routing_tests {
    use axum::http::StatusCode;
    use axum_extra::extract::cookie::Cookie;
    use axum_htmx::HX_TRIGGER;
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        endpoints::{self, format_endpoint},
        identity::SESSION_COOKIE,
        test_utils::{bypass_router, userinfo_router},
        transaction::{RELOAD_TRANSACTIONS_EVENT, count_transactions},
        user::count_users,
    };

    #[tokio::test]
    async fn status_is_ok() {
        let server = TestServer::new(bypass_router());

        let response = server.get(endpoints::STATUS).await;

        response.assert_status_ok();
        response.assert_json(&json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn status_needs_no_session() {
        let (server, _) = userinfo_router().await;

        server.get(endpoints::STATUS).await.assert_status_ok();
    }

    #[tokio::test]
    async fn protected_routes_without_session_are_unauthorized_and_write_nothing() {
        let (server, state) = userinfo_router().await;
        let delete_path = format_endpoint(endpoints::TRANSACTION_BY_ID, 1);

        let responses = [
            server
                .post(endpoints::TRANSACTION)
                .json(&json!({ "amount": "500", "description": "salary" }))
                .await,
            server.get(endpoints::TRANSACTIONS).await,
            server.delete(&delete_path).await,
        ];

        for response in responses {
            response.assert_status(StatusCode::UNAUTHORIZED);
        }
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_users(&connection).unwrap(), 0);
        assert_eq!(count_transactions(&connection).unwrap(), 0);
    }

    #[tokio::test]
    async fn invalid_session_is_unauthorized() {
        let (server, state) = userinfo_router().await;

        let response = server
            .post(endpoints::TRANSACTION)
            .add_cookie(Cookie::new(SESSION_COOKIE, "expired"))
            .json(&json!({ "amount": "500", "description": "salary" }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_users(&connection).unwrap(), 0);
    }

    #[tokio::test]
    async fn create_then_list_end_to_end() {
        let server = TestServer::new(bypass_router());

        let response = server
            .post(endpoints::TRANSACTION)
            .json(&json!({ "amount": "500", "description": "salary" }))
            .await;

        response.assert_status(StatusCode::NO_CONTENT);
        assert_eq!(response.header(HX_TRIGGER), RELOAD_TRANSACTIONS_EVENT);
        assert!(response.text().is_empty());

        let response = server.get(endpoints::TRANSACTIONS).await;

        response.assert_status_ok();
        response.assert_json(&json!({
            "transactions": [{
                "id": 1,
                "amount": "500",
                "description": "salary",
                "user_email": "test@example.com",
            }],
            "sum": "500",
        }));
    }
}
