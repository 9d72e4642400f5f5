#![allow(missing_docs)]

//! Shared fixtures: routers over in-memory databases and a stand-in for the
//! OAuth2 proxy's userinfo endpoint.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::CookieJar;
use axum_test::TestServer;
use reqwest::Url;
use rusqlite::Connection;

use crate::{
    AppState, build_router,
    identity::{Identity, IdentityResolver, SESSION_COOKIE},
};

pub(crate) const ALICE_SESSION: &str = "alice-session";
pub(crate) const BOB_SESSION: &str = "bob-session";
/// The identity provider answers 200 OK with a body that is not JSON.
pub(crate) const MALFORMED_SESSION: &str = "malformed-session";
/// The identity provider takes two seconds to answer.
pub(crate) const SLOW_SESSION: &str = "slow-session";

const USERINFO_PATH: &str = "/oauth2/userinfo";

pub(crate) fn alice() -> Identity {
    Identity {
        username: "alice".to_owned(),
        email: "alice@example.com".to_owned(),
    }
}

pub(crate) fn bob() -> Identity {
    Identity {
        username: "bob".to_owned(),
        email: "bob@example.com".to_owned(),
    }
}

async fn userinfo(jar: CookieJar) -> Response {
    let session = jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_owned());

    match session.as_deref() {
        Some(ALICE_SESSION) => Json(alice()).into_response(),
        Some(BOB_SESSION) => Json(bob()).into_response(),
        Some(MALFORMED_SESSION) => "not json".into_response(),
        Some(SLOW_SESSION) => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(alice()).into_response()
        }
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

/// Serve a fake userinfo endpoint on a random local port and return its URL.
pub(crate) async fn spawn_identity_provider() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Could not bind identity provider");
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route(USERINFO_PATH, get(userinfo));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Url::parse(&format!("http://{addr}{USERINFO_PATH}")).unwrap()
}

/// A router over a fresh in-memory database where every caller is [Identity::stub].
pub(crate) fn bypass_router() -> Router {
    let state = AppState::new(
        Connection::open_in_memory().unwrap(),
        IdentityResolver::bypass(),
    )
    .unwrap();

    build_router(state)
}

/// A router with authentication bypassed over an already initialised database.
pub(crate) fn router_with_connection(db_connection: Arc<Mutex<Connection>>) -> Router {
    build_router(AppState {
        db_connection,
        identity_resolver: IdentityResolver::bypass(),
        conceal_foreign_transactions: false,
    })
}

/// A test server that authenticates callers against [spawn_identity_provider].
///
/// The returned state shares its database with the server.
pub(crate) async fn userinfo_router() -> (TestServer, AppState) {
    userinfo_router_with(|state| state).await
}

/// Like [userinfo_router], with `configure` applied to the state first.
pub(crate) async fn userinfo_router_with(
    configure: impl FnOnce(AppState) -> AppState,
) -> (TestServer, AppState) {
    let endpoint = spawn_identity_provider().await;
    let resolver = IdentityResolver::userinfo(Some(endpoint), Duration::from_secs(5)).unwrap();
    let state = configure(AppState::new(Connection::open_in_memory().unwrap(), resolver).unwrap());
    let server = TestServer::new(build_router(state.clone()));

    (server, state)
}
