#![allow(missing_docs)]

use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, build_router,
    config::{AppConfig, DEFAULT_TOKEN_LIFETIME},
    transaction::{NewTransaction, Transaction, TransactionPayload, create_transaction},
};

#[track_caller]
pub(crate) fn must_create_test_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("could not create in-memory SQLite database");
    let config = AppConfig::new(Some("foobar".to_owned()), DEFAULT_TOKEN_LIFETIME);

    AppState::new(connection, &config).expect("could not create test app state")
}

#[track_caller]
pub(crate) fn must_create_test_server() -> (TestServer, AppState) {
    let state = must_create_test_state();
    let server =
        TestServer::new(build_router(state.clone())).expect("Could not create test server.");

    (server, state)
}

/// A token for the demo user signed with the test state's secret.
#[track_caller]
pub(crate) fn must_get_token(state: &AppState) -> String {
    state
        .token_service
        .issue("admin")
        .expect("could not issue test token")
}

/// A valid JSON body for creating or updating a transaction.
pub(crate) fn sample_payload() -> Value {
    json!({
        "title": "Salary",
        "amount": 100.0,
        "transaction_type": "income",
        "category": "Salary",
        "transaction_date": "2025-10-01",
    })
}

/// Insert a transaction directly into the test database.
#[track_caller]
pub(crate) fn must_insert_transaction(state: &AppState, title: &str) -> Transaction {
    let payload: TransactionPayload = serde_json::from_value(json!({
        "title": title,
        "amount": 12.5,
        "transaction_type": "expense",
        "category": "Food",
        "transaction_date": "2025-09-30",
    }))
    .expect("could not parse test payload");
    let new_transaction =
        NewTransaction::try_from(payload).expect("test payload should be valid");
    let connection = state
        .db_connection
        .lock()
        .expect("could not acquire database lock");

    create_transaction(new_transaction, &connection).expect("could not create test transaction")
}
