//! The demo log-in endpoint that exchanges the hardcoded credentials for a bearer token.

use axum::{
    Form, Json,
    extract::{FromRef, State},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, auth::TokenService, config::DemoCredentials};

/// The state needed to log in.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// Issues the token for a successful log-in.
    pub token_service: TokenService,
    /// The only credentials that are accepted.
    pub credentials: DemoCredentials,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            token_service: state.token_service.clone(),
            credentials: state.credentials.clone(),
        }
    }
}

/// The form data for a log-in request.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInForm {
    /// Username entered during log-in.
    pub username: String,
    /// Password entered during log-in.
    pub password: String,
}

/// The body of a successful log-in response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The signed bearer token.
    pub access_token: String,
    /// Always "bearer".
    pub token_type: String,
}

/// Handler for log-in requests via the POST method.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] if the username or password is wrong
/// and [Error::TokenCreation] if the token could not be signed.
pub async fn post_log_in(
    State(state): State<LogInState>,
    Form(form): Form<LogInForm>,
) -> Result<Json<TokenResponse>, Error> {
    if !state.credentials.matches(&form.username, &form.password) {
        tracing::warn!("Failed log-in attempt for user \"{}\"", form.username);
        return Err(Error::InvalidCredentials);
    }

    let access_token = state.token_service.issue(&form.username)?;
    tracing::info!("Issued token for user \"{}\"", form.username);

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_owned(),
    }))
}
