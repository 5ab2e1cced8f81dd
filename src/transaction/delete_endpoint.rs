use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    Error,
    auth::CurrentUser,
    database_id::TransactionId,
    db::DbSession,
    transaction::{MessageResponse, delete_transaction},
};

/// A route handler for permanently deleting a transaction.
///
/// # Errors
/// Responds with 404 if there is no transaction with the ID.
pub async fn delete_transaction_endpoint(
    State(session): State<DbSession>,
    Extension(user): Extension<CurrentUser>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<MessageResponse>, Error> {
    session.run(|connection| delete_transaction(transaction_id, connection))?;
    tracing::info!(
        "User \"{}\" deleted transaction {transaction_id}",
        user.username
    );

    Ok(MessageResponse::new("Deleted"))
}
