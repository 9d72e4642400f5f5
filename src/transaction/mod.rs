//! Transaction management.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the database functions for storing and querying it
//! - The operations a caller may perform on their own transactions
//! - The route handlers for the transaction API

mod amount;
mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;
mod service;
mod view;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HX_TRIGGER;

pub use core::{NewTransaction, Transaction, create_transaction, create_transaction_table};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use list_endpoint::get_transactions_endpoint;

#[cfg(test)]
pub use core::{count_transactions, get_transaction};

/// The HTMX event clients listen for to refresh their transaction list.
pub const RELOAD_TRANSACTIONS_EVENT: &str = "reload-transactions";

/// An empty 204 No Content response that tells HTMX clients to reload their transactions.
fn reload_transactions_response() -> Response {
    (
        StatusCode::NO_CONTENT,
        [(HX_TRIGGER, RELOAD_TRANSACTIONS_EVENT)],
    )
        .into_response()
}
