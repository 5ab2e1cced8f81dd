use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error, auth::CurrentUser, database_id::TransactionId, db::DbSession,
    transaction::archive_transaction,
};

/// A short confirmation sent back after archiving or deleting a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// What happened, e.g. "Archived".
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_owned(),
        })
    }
}

/// A route handler for archiving (soft deleting) a transaction.
///
/// # Errors
/// Responds with 404 if there is no transaction with the ID.
pub async fn archive_transaction_endpoint(
    State(session): State<DbSession>,
    Extension(user): Extension<CurrentUser>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<MessageResponse>, Error> {
    session.run(|connection| archive_transaction(transaction_id, connection))?;
    tracing::info!(
        "User \"{}\" archived transaction {transaction_id}",
        user.username
    );

    Ok(MessageResponse::new("Archived"))
}
