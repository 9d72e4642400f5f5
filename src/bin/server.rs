use std::{fs::OpenOptions, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use reqwest::Url;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use spenn::{
    AppState, IdentityResolver, build_router, graceful_shutdown, logging_middleware,
};

/// The REST API server for spenn.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DATABASE_PATH")]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// The OAuth2 proxy endpoint that exchanges a session cookie for the caller's identity.
    #[arg(long, env = "OAUTH2_USERINFO_ENDPOINT")]
    userinfo_endpoint: Option<Url>,

    /// How many seconds to wait for the userinfo endpoint.
    #[arg(long, env = "OAUTH2_USERINFO_TIMEOUT_SECS", default_value_t = 5)]
    userinfo_timeout_secs: u64,

    /// Skip authentication and treat every caller as the test user.
    #[arg(long, env = "DEV")]
    dev: bool,

    /// Answer 404 instead of 403 when a caller deletes another user's transaction.
    #[arg(long, env = "CONCEAL_FOREIGN_TRANSACTIONS")]
    conceal_foreign_transactions: bool,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

    let identity_resolver = if args.dev {
        IdentityResolver::bypass()
    } else {
        IdentityResolver::userinfo(
            args.userinfo_endpoint,
            Duration::from_secs(args.userinfo_timeout_secs),
        )
        .expect("Could not create the HTTP client for the userinfo endpoint")
    };

    let conn = Connection::open(&args.db_path).expect("Could not open the database");
    let app_state = AppState::new(conn, identity_resolver)
        .expect("Could not initialize the database")
        .with_foreign_transactions_concealed(args.conceal_foreign_transactions);

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(app_state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("The server stopped unexpectedly");
}

/// Log INFO and above to stdout and everything from DEBUG up to `debug.log`.
///
/// `RUST_LOG` overrides the stdout level.
fn setup_logging() {
    let stdout_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(stdout_filter);

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file))
        .with_filter(filter::LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are turned into responses.
        .on_failure(());

    router.layer(tracing_layer)
}
