use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    Error,
    auth::CurrentUser,
    database_id::TransactionId,
    db::DbSession,
    transaction::{NewTransaction, Transaction, TransactionPayload, update_transaction},
};

/// A route handler for overwriting a transaction, responds with the updated transaction.
///
/// Every field except the ID and archived flag is replaced. Any valid token
/// may edit any transaction.
///
/// # Errors
/// Responds with 400 if the new amount or type is invalid and 404 if there is
/// no transaction with the ID.
pub async fn edit_transaction_endpoint(
    State(session): State<DbSession>,
    Extension(user): Extension<CurrentUser>,
    Path(transaction_id): Path<TransactionId>,
    Json(payload): Json<TransactionPayload>,
) -> Result<Json<Transaction>, Error> {
    let new_transaction = NewTransaction::try_from(payload)?;

    let transaction = session
        .run(|connection| update_transaction(transaction_id, new_transaction, connection))?;
    tracing::info!(
        "User \"{}\" updated transaction {transaction_id}",
        user.username
    );

    Ok(Json(transaction))
}
