//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    database_id::{DatabaseId, TransactionId},
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in, e.g. a salary payment.
    Income,
    /// Money going out, e.g. rent.
    Expense,
}

impl TransactionType {
    /// The name of the type as it is stored in the database and sent over JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse::<TransactionType>()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseId,
    /// A short label for the transaction, e.g. "Weekly groceries".
    pub title: String,
    /// The amount of money spent or earned, never negative.
    pub amount: f64,
    /// Whether the money was earned or spent.
    pub transaction_type: TransactionType,
    /// A free text category, e.g. "Food" or "Rent".
    pub category: String,
    /// When the transaction happened.
    pub transaction_date: Date,
    /// Archived transactions are hidden from listings unless explicitly requested.
    pub archived: bool,
}

/// The fields of a transaction as sent by a client when creating or updating a transaction.
///
/// The amount and type are checked when converting into a [NewTransaction].
/// An `id` in the request body is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPayload {
    /// A short label for the transaction.
    pub title: String,
    /// The amount of money, must not be negative.
    pub amount: f64,
    /// Either "income" or "expense".
    pub transaction_type: String,
    /// A free text category.
    pub category: String,
    /// When the transaction happened, e.g. "2025-10-05".
    pub transaction_date: Date,
    /// Whether the transaction should start out archived.
    ///
    /// Only used when creating a transaction, updates leave the archived flag as is.
    #[serde(default)]
    pub archived: bool,
}

/// A validated transaction that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// A short label for the transaction.
    pub title: String,
    /// The amount of money, zero or greater.
    pub amount: f64,
    /// Whether the money was earned or spent.
    pub transaction_type: TransactionType,
    /// A free text category.
    pub category: String,
    /// When the transaction happened.
    pub transaction_date: Date,
    /// Whether the transaction is hidden from default listings.
    pub archived: bool,
}

impl TryFrom<TransactionPayload> for NewTransaction {
    type Error = Error;

    /// # Errors
    /// Returns [Error::InvalidAmount] if the amount is negative or NaN and
    /// [Error::InvalidTransactionType] if the type is not "income" or "expense".
    fn try_from(payload: TransactionPayload) -> Result<Self, Self::Error> {
        if payload.amount.is_nan() || payload.amount < 0.0 {
            return Err(Error::InvalidAmount(payload.amount));
        }

        let transaction_type = payload.transaction_type.parse::<TransactionType>()?;

        Ok(Self {
            title: payload.title,
            amount: payload.amount,
            transaction_type,
            category: payload.category,
            transaction_date: payload.transaction_date,
            archived: payload.archived,
        })
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

type RowsAffected = usize;

/// Insert a new transaction and return it with its assigned ID.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" \
                (title, amount, transaction_type, category, transaction_date, archived) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             RETURNING id, title, amount, transaction_type, category, transaction_date, archived",
        )?
        .query_row(
            (
                transaction.title,
                transaction.amount,
                transaction.transaction_type,
                transaction.category,
                transaction.transaction_date,
                transaction.archived,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// Archived transactions are returned too.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, title, amount, transaction_type, category, transaction_date, archived \
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Get transactions ordered by ID.
///
/// Archived transactions are only included if `include_archived` is true.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_transactions(
    include_archived: bool,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, title, amount, transaction_type, category, transaction_date, archived \
             FROM \"transaction\" \
             WHERE archived = 0 OR :include_archived \
             ORDER BY id ASC",
        )?
        .query_map(&[(":include_archived", &include_archived)], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Overwrite every field of the transaction `id` except its ID and archived flag.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "UPDATE \"transaction\" \
             SET title = ?1, \
                 amount = ?2, \
                 transaction_type = ?3, \
                 category = ?4, \
                 transaction_date = ?5 \
             WHERE id = ?6 \
             RETURNING id, title, amount, transaction_type, category, transaction_date, archived",
        )?
        .query_row(
            (
                transaction.title,
                transaction.amount,
                transaction.transaction_type,
                transaction.category,
                transaction.transaction_date,
                id,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Mark the transaction `id` as archived.
///
/// Archiving an already archived transaction succeeds.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn archive_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected: RowsAffected = connection.execute(
        "UPDATE \"transaction\" SET archived = 1 WHERE id = :id",
        &[(":id", &id)],
    )?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

/// Permanently remove the transaction `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected: RowsAffected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = :id",
        &[(":id", &id)],
    )?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

/// Get the total number of transactions in the database, archived or not.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
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
                title TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                transaction_type TEXT NOT NULL CHECK (transaction_type IN ('income', 'expense')),
                category TEXT NOT NULL,
                transaction_date TEXT NOT NULL,
                archived INTEGER NOT NULL DEFAULT 0
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_archived ON \"transaction\"(archived);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let title = row.get(1)?;
    let amount = row.get(2)?;
    let transaction_type = row.get(3)?;
    let category = row.get(4)?;
    let transaction_date = row.get(5)?;
    let archived = row.get(6)?;

    Ok(Transaction {
        id,
        title,
        amount,
        transaction_type,
        category,
        transaction_date,
        archived,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        transaction::{
            NewTransaction, Transaction, TransactionType, archive_transaction,
            count_transactions, create_transaction, delete_transaction, get_transaction,
            list_transactions, update_transaction,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn new_transaction(title: &str, amount: f64) -> NewTransaction {
        NewTransaction {
            title: title.to_owned(),
            amount,
            transaction_type: TransactionType::Expense,
            category: "Food".to_owned(),
            transaction_date: date!(2025 - 10 - 05),
            archived: false,
        }
    }

    #[test]
    fn create_assigns_id() {
        let conn = get_test_connection();

        let first = create_transaction(new_transaction("first", 1.0), &conn).unwrap();
        let second = create_transaction(new_transaction("second", 2.0), &conn).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(second.title, "second");
        assert!(!second.archived);
    }

    #[test]
    fn get_returns_created_transaction() {
        let conn = get_test_connection();
        let want = create_transaction(new_transaction("Groceries", 87.25), &conn).unwrap();

        let got = get_transaction(want.id, &conn);

        assert_eq!(got, Ok(want));
    }

    #[test]
    fn get_fails_on_missing_id() {
        let conn = get_test_connection();

        assert_eq!(get_transaction(1, &conn), Err(Error::NotFound));
    }

    #[test]
    fn list_excludes_archived_by_default() {
        let conn = get_test_connection();
        let visible = create_transaction(new_transaction("visible", 1.0), &conn).unwrap();
        let hidden = create_transaction(new_transaction("hidden", 2.0), &conn).unwrap();
        archive_transaction(hidden.id, &conn).unwrap();

        let got = list_transactions(false, &conn).unwrap();

        assert_eq!(got, vec![visible]);
    }

    #[test]
    fn list_includes_archived_on_request() {
        let conn = get_test_connection();
        let visible = create_transaction(new_transaction("visible", 1.0), &conn).unwrap();
        let hidden = create_transaction(new_transaction("hidden", 2.0), &conn).unwrap();
        archive_transaction(hidden.id, &conn).unwrap();

        let got = list_transactions(true, &conn).unwrap();

        assert_eq!(
            got,
            vec![
                visible,
                Transaction {
                    archived: true,
                    ..hidden
                }
            ]
        );
    }

    #[test]
    fn update_overwrites_fields_but_not_archived() {
        let conn = get_test_connection();
        let original = create_transaction(new_transaction("before", 1.0), &conn).unwrap();
        archive_transaction(original.id, &conn).unwrap();
        let update = NewTransaction {
            title: "after".to_owned(),
            amount: 3.5,
            transaction_type: TransactionType::Income,
            category: "Gift".to_owned(),
            transaction_date: date!(2025 - 11 - 01),
            archived: false,
        };

        let got = update_transaction(original.id, update, &conn).unwrap();

        assert_eq!(
            got,
            Transaction {
                id: original.id,
                title: "after".to_owned(),
                amount: 3.5,
                transaction_type: TransactionType::Income,
                category: "Gift".to_owned(),
                transaction_date: date!(2025 - 11 - 01),
                archived: true,
            }
        );
        assert_eq!(get_transaction(original.id, &conn), Ok(got));
    }

    #[test]
    fn update_fails_on_missing_id() {
        let conn = get_test_connection();

        let got = update_transaction(7, new_transaction("nope", 1.0), &conn);

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn archive_is_repeatable() {
        let conn = get_test_connection();
        let transaction = create_transaction(new_transaction("coffee", 4.0), &conn).unwrap();

        archive_transaction(transaction.id, &conn).unwrap();

        assert_eq!(archive_transaction(transaction.id, &conn), Ok(()));
    }

    #[test]
    fn archive_fails_on_missing_id() {
        let conn = get_test_connection();

        assert_eq!(archive_transaction(3, &conn), Err(Error::NotFound));
    }

    #[test]
    fn delete_removes_row() {
        let conn = get_test_connection();
        let transaction = create_transaction(new_transaction("coffee", 4.0), &conn).unwrap();

        delete_transaction(transaction.id, &conn).unwrap();

        assert_eq!(get_transaction(transaction.id, &conn), Err(Error::NotFound));
        assert_eq!(count_transactions(&conn), Ok(0));
    }

    #[test]
    fn delete_fails_on_missing_id() {
        let conn = get_test_connection();

        assert_eq!(delete_transaction(3, &conn), Err(Error::NotFound));
    }

    #[test]
    fn get_count() {
        let conn = get_test_connection();
        let want_count = 20;
        for i in 1..=want_count {
            create_transaction(new_transaction("", i as f64), &conn)
                .expect("Could not create transaction");
        }

        let got_count = count_transactions(&conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }
}
