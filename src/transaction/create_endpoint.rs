use axum::{Json, extract::State, http::StatusCode};

use crate::{
    Error,
    db::DbSession,
    transaction::{NewTransaction, Transaction, TransactionPayload, create_transaction},
};

/// A route handler for creating a new transaction, responds with the stored transaction.
///
/// Does not require authentication.
///
/// # Errors
/// Responds with 400 if the amount is negative or the transaction type is not
/// "income" or "expense".
pub async fn create_transaction_endpoint(
    State(session): State<DbSession>,
    Json(payload): Json<TransactionPayload>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let new_transaction = NewTransaction::try_from(payload)?;

    let transaction = session.run(|connection| create_transaction(new_transaction, connection))?;
    tracing::info!("Created transaction {}", transaction.id);

    Ok((StatusCode::CREATED, Json(transaction)))
}
