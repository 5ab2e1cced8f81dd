use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Deserializer};

use crate::{
    Error,
    db::DbSession,
    transaction::{Transaction, list_transactions},
};

/// The query parameters for listing transactions.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Whether archived transactions should be included, defaults to false.
    ///
    /// Accepts the usual spellings of a boolean flag in any case, e.g.
    /// `true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub include_archived: bool,
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlagVisitor;

    impl serde::de::Visitor<'_> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a boolean such as true, false, 1, 0, yes or no")
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            match value.to_ascii_lowercase().as_str() {
                "true" | "t" | "1" | "yes" | "y" | "on" => Ok(true),
                "false" | "f" | "0" | "no" | "n" | "off" => Ok(false),
                _ => Err(E::invalid_value(serde::de::Unexpected::Str(value), &self)),
            }
        }
    }

    deserializer.deserialize_str(FlagVisitor)
}

/// A route handler for listing transactions ordered by ID.
///
/// Does not require authentication.
pub async fn list_transactions_endpoint(
    State(session): State<DbSession>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let transactions =
        session.run(|connection| list_transactions(query.include_archived, connection))?;

    Ok(Json(transactions))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{must_create_test_server, must_get_token, must_insert_transaction},
        transaction::Transaction,
    };

    #[tokio::test]
    async fn empty_list() {
        let (server, _) = must_create_test_server();

        let response = server.get(endpoints::TRANSACTIONS).await;

        response.assert_status_ok();
        assert_eq!(response.json::<Vec<Transaction>>(), vec![]);
    }

    #[tokio::test]
    async fn archived_transaction_is_hidden_by_default() {
        let (server, state) = must_create_test_server();
        let kept = must_insert_transaction(&state, "rent");
        let archived = must_insert_transaction(&state, "old rent");
        server
            .patch(&format_endpoint(endpoints::ARCHIVE_TRANSACTION, archived.id))
            .authorization_bearer(must_get_token(&state))
            .await
            .assert_status_ok();

        let got = server
            .get(endpoints::TRANSACTIONS)
            .await
            .json::<Vec<Transaction>>();

        assert_eq!(got, vec![kept]);
    }

    #[tokio::test]
    async fn include_archived_returns_everything() {
        let (server, state) = must_create_test_server();
        let kept = must_insert_transaction(&state, "rent");
        let archived = must_insert_transaction(&state, "old rent");
        server
            .patch(&format_endpoint(endpoints::ARCHIVE_TRANSACTION, archived.id))
            .authorization_bearer(must_get_token(&state))
            .await
            .assert_status_ok();

        let got = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("include_archived", true)
            .await
            .json::<Vec<Transaction>>();

        assert_eq!(
            got,
            vec![
                kept,
                Transaction {
                    archived: true,
                    ..archived
                }
            ]
        );
    }

    #[tokio::test]
    async fn include_archived_false_hides_archived() {
        let (server, state) = must_create_test_server();
        let archived = must_insert_transaction(&state, "old rent");
        server
            .patch(&format_endpoint(endpoints::ARCHIVE_TRANSACTION, archived.id))
            .authorization_bearer(must_get_token(&state))
            .await
            .assert_status_ok();

        let got = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("include_archived", false)
            .await
            .json::<Vec<Transaction>>();

        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn rejects_invalid_flag() {
        let (server, _) = must_create_test_server();

        server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("include_archived", "sometimes")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn include_archived_accepts_common_spellings() {
        let (server, state) = must_create_test_server();
        must_insert_transaction(&state, "rent");
        let archived = must_insert_transaction(&state, "old rent");
        server
            .patch(&format_endpoint(endpoints::ARCHIVE_TRANSACTION, archived.id))
            .authorization_bearer(must_get_token(&state))
            .await
            .assert_status_ok();

        for (flag, want_len) in [("1", 2), ("yes", 2), ("True", 2), ("ON", 2), ("0", 1), ("No", 1)] {
            let got = server
                .get(endpoints::TRANSACTIONS)
                .add_query_param("include_archived", flag)
                .await
                .json::<Vec<Transaction>>();

            assert_eq!(got.len(), want_len, "include_archived={flag}");
        }
    }
}
