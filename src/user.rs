//! Code for creating the user table and fetching users from the database.
//!
//! Users are identified by the email address reported by the identity
//! provider. There are no local credentials.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::Error;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The email address the identity provider reports for the user.
    ///
    /// Compared case-sensitively.
    pub email: String,
    /// When the user was first seen.
    pub created_at: OffsetDateTime,
    /// When the row was last written.
    pub updated_at: OffsetDateTime,
    /// Set when the user has been soft-deleted.
    pub deleted_at: Option<OffsetDateTime>,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT
                )",
        (),
    )?;

    Ok(())
}

/// Get the user with `email`, creating them first if they have never been seen.
///
/// This is a single upsert on the unique email column, so concurrent first
/// requests for the same email resolve to the same row.
///
/// # Errors
///
/// This function will return a:
/// - [Error::DisabledUser] if the user exists but has been soft-deleted,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_or_create_user(email: &str, connection: &Connection) -> Result<User, Error> {
    let now = OffsetDateTime::now_utc();

    let user = connection
        .prepare(
            "INSERT INTO user (email, created_at, updated_at) VALUES (?1, ?2, ?2)
             ON CONFLICT(email) DO UPDATE SET email = excluded.email
             RETURNING id, email, created_at, updated_at, deleted_at",
        )?
        .query_row((email, now), map_user_row)?;

    if user.deleted_at.is_some() {
        tracing::warn!("Deleted user {} tried to record a transaction", user.id);
        return Err(Error::DisabledUser);
    }

    Ok(user)
}

/// Get the user whose email is exactly `email`.
///
/// # Errors
///
/// This function will return an error if:
/// - no active user has the email ([Error::NotFound]),
/// - there was an error trying to access the store.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, email, created_at, updated_at, deleted_at FROM user
             WHERE email = :email AND deleted_at IS NULL",
        )?
        .query_row(&[(":email", &email)], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to an active user ([Error::NotFound]),
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, email, created_at, updated_at, deleted_at FROM user
             WHERE id = :id AND deleted_at IS NULL",
        )?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the number of users in the database, including soft-deleted users.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
#[cfg(test)]
pub fn count_users(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: UserID::new(row.get(0)?),
        email: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
        deleted_at: row.get(4)?,
    })
}
