//! Database bootstrap and the per-request database session.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::{Connection, TransactionBehavior};

use crate::{AppState, Error, transaction::create_transaction_table};

/// Create the tables for the domain models if they do not exist yet.
///
/// Calling this on an already initialized database is a no-op.
///
/// # Errors
/// Returns an error if a table cannot be created or if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        rusqlite::Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// A handle to the application database that request handlers use to run
/// their queries.
///
/// Each call to [DbSession::run] holds the connection lock and a SQL
/// transaction for exactly the duration of the operation.
#[derive(Debug, Clone)]
pub struct DbSession {
    connection: Arc<Mutex<Connection>>,
}

impl DbSession {
    /// Create a session handle over a shared connection.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    /// Run `operation` inside a SQL transaction and commit it if `operation` succeeds.
    ///
    /// If `operation` fails the transaction is rolled back. The connection
    /// lock is released before this function returns in either case.
    ///
    /// # Errors
    /// Returns [Error::DatabaseLockError] if the connection lock is poisoned,
    /// otherwise any error from `operation` or from beginning or committing
    /// the transaction.
    pub fn run<T>(
        &self,
        operation: impl FnOnce(&Connection) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let mut connection = self.connection.lock().map_err(|error| {
            tracing::error!("Could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        let transaction = connection.transaction()?;
        let result = operation(&transaction)?;
        transaction.commit()?;

        Ok(result)
    }
}

impl FromRef<AppState> for DbSession {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.db_connection.clone())
    }
}
