//! Process-wide settings that are decided once at start up and handed to [crate::AppState].

use time::Duration;

/// The secret used to sign tokens when none is configured.
///
/// Anyone who knows this value can forge tokens, so it must only ever be used for demos.
pub const INSECURE_DEFAULT_SECRET: &str = "finance_secret";

/// How long an issued token stays valid for by default.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::minutes(60);

/// The single username and password pair accepted by the log-in endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoCredentials {
    /// The username that must be entered to log in.
    pub username: String,
    /// The password that must be entered to log in.
    pub password: String,
}

impl DemoCredentials {
    /// Whether `username` and `password` match these credentials exactly.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl Default for DemoCredentials {
    fn default() -> Self {
        Self {
            username: "admin".to_owned(),
            password: "password".to_owned(),
        }
    }
}

/// The configuration for the REST server.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// The shared secret for signing and verifying bearer tokens.
    pub secret_key: String,
    /// How long a token is valid for after it has been issued.
    pub token_lifetime: Duration,
    /// The credentials accepted by the log-in endpoint.
    pub credentials: DemoCredentials,
}

impl AppConfig {
    /// Create a config that signs tokens with `secret_key`, or with
    /// [INSECURE_DEFAULT_SECRET] if no secret is given.
    pub fn new(secret_key: Option<String>, token_lifetime: Duration) -> Self {
        let secret_key = match secret_key {
            Some(secret_key) if !secret_key.is_empty() => secret_key,
            _ => {
                tracing::warn!(
                    "No secret key was configured, falling back to an insecure default. \
                    Set SECRET_KEY before exposing this server to anyone."
                );
                INSECURE_DEFAULT_SECRET.to_owned()
            }
        };

        Self {
            secret_key,
            token_lifetime,
            credentials: DemoCredentials::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(None, DEFAULT_TOKEN_LIFETIME)
    }
}
