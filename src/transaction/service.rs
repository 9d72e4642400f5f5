//! The operations callers can perform on their transactions.
//!
//! Each operation takes the caller's [Identity] and enforces that callers only
//! ever see or change their own transactions. The results are plain view
//! models so the HTTP layer can render them as JSON or HTML.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use serde::Serialize;

use crate::{
    Error,
    database_id::TransactionId,
    identity::Identity,
    transaction::core::{
        Transaction, create_transaction, get_transaction, get_user_transactions,
        soft_delete_transaction,
    },
    user::{get_or_create_user, get_user_by_email, get_user_by_id},
};

/// A transaction as shown to its owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionView {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount in the smallest currency unit, sent as a string.
    #[serde(with = "crate::transaction::amount")]
    pub amount: i64,
    /// What the transaction was for.
    pub description: String,
    /// The email of the owner.
    pub user_email: String,
}

/// A caller's transactions, most recent first, and their total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionList {
    /// The transactions, most recent first.
    pub transactions: Vec<TransactionView>,
    /// The sum of all amounts in `transactions`, sent as a string.
    ///
    /// Wider than an amount so that any number of valid amounts can be added up.
    #[serde(with = "crate::transaction::amount")]
    pub sum: i128,
}

impl TransactionList {
    /// The list shown to a caller without any transactions.
    pub fn empty() -> Self {
        Self {
            transactions: Vec::new(),
            sum: 0,
        }
    }
}

/// Add up the amounts of `transactions`.
pub fn sum_amounts<'a>(transactions: impl IntoIterator<Item = &'a TransactionView>) -> i128 {
    transactions
        .into_iter()
        .map(|transaction| i128::from(transaction.amount))
        .sum()
}

/// Record a new transaction for the caller.
///
/// The caller's user row is created on their first transaction. Both writes
/// happen in one SQL transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::DisabledUser] if the caller's user has been deleted,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn record_transaction(
    identity: &Identity,
    amount: i64,
    description: &str,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let user = get_or_create_user(&identity.email, &sql_transaction)?;
    let transaction = create_transaction(
        Transaction::build(amount, description, user.id),
        &sql_transaction,
    )?;

    sql_transaction.commit()?;

    tracing::info!(
        "Recorded transaction {} for user {}",
        transaction.id,
        transaction.user_id
    );

    Ok(transaction)
}

/// Get the caller's transactions, most recent first, with their sum.
///
/// A caller who has never recorded a transaction gets an empty list.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn list_transactions(
    identity: &Identity,
    connection: &Connection,
) -> Result<TransactionList, Error> {
    let user = match get_user_by_email(&identity.email, connection) {
        Ok(user) => user,
        Err(Error::NotFound) => return Ok(TransactionList::empty()),
        Err(error) => return Err(error),
    };

    let transactions: Vec<TransactionView> = get_user_transactions(user.id, connection)?
        .into_iter()
        .map(|transaction| TransactionView {
            id: transaction.id,
            amount: transaction.amount,
            description: transaction.description,
            user_email: user.email.clone(),
        })
        .collect();
    let sum = sum_amounts(&transactions);

    Ok(TransactionList { transactions, sum })
}

/// Delete one of the caller's transactions.
///
/// Existence is checked before ownership, so [Error::Forbidden] tells the
/// caller that the transaction exists.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `transaction_id` does not refer to a live transaction,
/// - [Error::Forbidden] if the transaction belongs to someone else,
/// - [Error::MissingOwner] if the transaction's owner cannot be found,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_owned_transaction(
    identity: &Identity,
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let transaction = get_transaction(transaction_id, connection)?;

    let owner = match get_user_by_id(transaction.user_id, connection) {
        Ok(owner) => owner,
        Err(Error::NotFound) => return Err(Error::MissingOwner(transaction_id)),
        Err(error) => return Err(error),
    };

    if owner.email != identity.email {
        tracing::warn!(
            "{} tried to delete transaction {transaction_id} owned by user {}",
            identity.email,
            owner.id
        );
        return Err(Error::Forbidden);
    }

    match soft_delete_transaction(transaction_id, connection)? {
        // Deleted by a concurrent request after the lookup above.
        0 => Err(Error::NotFound),
        _ => {
            tracing::info!("Deleted transaction {transaction_id}");
            Ok(())
        }
    }
}
