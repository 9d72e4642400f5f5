//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, db::initialize, identity::IdentityResolver};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// Works out who is making each request.
    pub identity_resolver: IdentityResolver,

    /// Whether deleting another user's transaction should look the same as
    /// deleting a transaction that does not exist (404 instead of 403).
    pub conceal_foreign_transactions: bool,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        identity_resolver: IdentityResolver,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            identity_resolver,
            conceal_foreign_transactions: false,
        })
    }

    /// Answer 404 Not Found instead of 403 Forbidden when a caller tries to
    /// delete a transaction they do not own.
    pub fn with_foreign_transactions_concealed(mut self, conceal: bool) -> Self {
        self.conceal_foreign_transactions = conceal;
        self
    }
}
