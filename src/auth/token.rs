//! Issuing and verifying the signed bearer tokens handed out at log-in.

use std::fmt::Debug;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::Error;

/// The contents of a JSON Web Token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The name of the user the token was issued to.
    pub sub: String,
    /// The expiry time of the token as a unix timestamp in seconds.
    pub exp: i64,
}

/// Signs and checks HS256 tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl TokenService {
    /// Create a token service that signs with `secret` and issues tokens valid for `lifetime`.
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
        }
    }

    /// How long issued tokens are valid for.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Create a signed token for `subject` that expires [TokenService::lifetime] from now.
    ///
    /// # Errors
    /// Returns [Error::TokenCreation] if the expiry time overflows or the token
    /// could not be encoded.
    pub fn issue(&self, subject: &str) -> Result<String, Error> {
        self.issue_at(subject, OffsetDateTime::now_utc())
    }

    fn issue_at(&self, subject: &str, issued_at: OffsetDateTime) -> Result<String, Error> {
        let expires_at = issued_at.checked_add(self.lifetime).ok_or_else(|| {
            Error::TokenCreation(format!(
                "token lifetime of {} is out of range",
                self.lifetime
            ))
        })?;
        let claims = Claims {
            sub: subject.to_owned(),
            exp: expires_at.unix_timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|error| Error::TokenCreation(error.to_string()))
    }

    /// Check the signature and expiry of `token` and return its claims.
    ///
    /// # Errors
    /// Returns [Error::InvalidToken] if the token is malformed, was not signed
    /// with this service's secret, has expired, or has a missing or empty subject.
    pub fn verify(&self, token: &str) -> Result<Claims, Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|error| {
                tracing::debug!("Rejected token: {error}");
                Error::InvalidToken
            })?
            .claims;

        if claims.sub.is_empty() {
            tracing::debug!("Rejected token with an empty subject");
            return Err(Error::InvalidToken);
        }

        Ok(claims)
    }
}

impl Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}
