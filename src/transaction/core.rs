//! Defines the core data model and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, database_id::TransactionId, user::UserID};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent or earned in this transaction.
    ///
    /// Measured in the smallest unit of the currency, e.g. øre or cents.
    pub amount: i64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The ID of the user that owns the transaction.
    pub user_id: UserID,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
    /// When the row was last written.
    pub updated_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [NewTransaction] for discoverability.
    pub fn build(amount: i64, description: &str, user_id: UserID) -> NewTransaction {
        NewTransaction {
            amount,
            description: description.to_owned(),
            user_id,
        }
    }
}

/// The data needed to insert a [Transaction].
#[derive(Debug, PartialEq, Clone)]
pub struct NewTransaction {
    /// The monetary amount of the transaction in the smallest currency unit.
    ///
    /// Positive values represent income/credits, negative values represent
    /// expenses/debits. The sign is chosen by the caller.
    ///
    /// # Examples
    /// - `50000` - Salary deposit
    /// - `-4599` - Coffee shop purchase
    pub amount: i64,

    /// A human-readable description of the transaction.
    pub description: String,

    /// The owner of the transaction. Must refer to an existing user.
    pub user_id: UserID,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

type RowsAffected = usize;

/// Create a new transaction in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] if `user_id` does not refer
/// to a user or there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let now = OffsetDateTime::now_utc();

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (amount, description, user_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             RETURNING id, amount, description, user_id, created_at, updated_at",
        )?
        .query_row(
            (
                new_transaction.amount,
                new_transaction.description,
                new_transaction.user_id.as_i64(),
                now,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// Soft-deleted transactions are treated as missing.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, amount, description, user_id, created_at, updated_at
             FROM \"transaction\" WHERE id = :id AND deleted_at IS NULL",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Get all of a user's transactions, most recent first.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_user_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, amount, description, user_id, created_at, updated_at
             FROM \"transaction\" WHERE user_id = :user_id AND deleted_at IS NULL
             ORDER BY id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .map(|row| row.map_err(Error::from))
        .collect()
}

/// Mark a transaction as deleted.
///
/// Returns the number of rows affected, zero if `id` does not refer to a live transaction.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn soft_delete_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    let now = OffsetDateTime::now_utc();

    connection
        .execute(
            "UPDATE \"transaction\" SET deleted_at = ?1, updated_at = ?1
             WHERE id = ?2 AND deleted_at IS NULL",
            (now, id),
        )
        .map_err(|error| error.into())
}

/// Get the total number of live transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE deleted_at IS NULL;",
            [],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount INTEGER NOT NULL,
                description TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE RESTRICT
                )",
        (),
    )?;

    // Used by the transaction list.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user ON \"transaction\"(user_id, deleted_at);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let amount = row.get(1)?;
    let description = row.get(2)?;
    let user_id = UserID::new(row.get(3)?);
    let created_at = row.get(4)?;
    let updated_at = row.get(5)?;

    Ok(Transaction {
        id,
        amount,
        description,
        user_id,
        created_at,
        updated_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================
