use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    Error,
    database_id::TransactionId,
    db::DbSession,
    transaction::{Transaction, get_transaction},
};

/// A route handler for fetching a single transaction, archived or not.
///
/// Does not require authentication.
///
/// # Errors
/// Responds with 404 if there is no transaction with the ID.
pub async fn get_transaction_endpoint(
    State(session): State<DbSession>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    session
        .run(|connection| get_transaction(transaction_id, connection))
        .map(Json)
}
