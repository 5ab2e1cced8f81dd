//! Authentication middleware that checks the bearer token on protected routes.

use axum::{
    RequestPartsExt,
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{AppState, Error, auth::TokenService};

/// The state needed for the auth middleware
#[derive(Debug, Clone)]
pub struct AuthState {
    /// Verifies the bearer tokens sent by clients.
    pub token_service: TokenService,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            token_service: state.token_service.clone(),
        }
    }
}

/// The user named by the bearer token of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// The `sub` claim of the token.
    pub username: String,
}

/// Middleware function that checks for a valid bearer token in the `Authorization` header.
///
/// The [CurrentUser] is placed into the request and the request executed
/// normally if the token is valid, otherwise a 401 response is returned.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(user): Extension<CurrentUser>` to receive the user.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let bearer = match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
        Ok(TypedHeader(Authorization(bearer))) => bearer,
        Err(error) => {
            tracing::debug!("Missing or malformed authorization header: {error}");
            return Error::InvalidToken.into_response();
        }
    };

    let claims = match state.token_service.verify(bearer.token()) {
        Ok(claims) => claims,
        Err(error) => return error.into_response(),
    };

    parts.extensions.insert(CurrentUser {
        username: claims.sub,
    });
    let request = Request::from_parts(parts, body);

    next.run(request).await
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{
        Extension, Router,
        http::{HeaderValue, StatusCode, header},
        middleware,
        routing::get,
    };
    use axum_test::TestServer;
    use time::Duration;

    use super::{AuthState, CurrentUser, auth_guard};
    use crate::auth::TokenService;

    const TEST_PROTECTED_ROUTE: &str = "/protected";

    async fn test_handler(Extension(user): Extension<CurrentUser>) -> String {
        user.username
    }

    fn get_test_server(token_service: TokenService) -> TestServer {
        let state = AuthState { token_service };
        let app = Router::new()
            .route(TEST_PROTECTED_ROUTE, get(test_handler))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .with_state(state);

        TestServer::new(app).expect("Could not create test server.")
    }

    fn get_token_service() -> TokenService {
        TokenService::new("nafstenoas", Duration::minutes(60))
    }

    #[tokio::test]
    async fn get_protected_route_with_valid_token() {
        let token_service = get_token_service();
        let token = token_service.issue("admin").unwrap();
        let server = get_test_server(token_service);

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .authorization_bearer(token)
            .await;

        response.assert_status_ok();
        response.assert_text("admin");
    }

    #[tokio::test]
    async fn get_protected_route_with_missing_header() {
        let server = get_test_server(get_token_service());

        server
            .get(TEST_PROTECTED_ROUTE)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn get_protected_route_with_empty_token() {
        let server = get_test_server(get_token_service());

        server
            .get(TEST_PROTECTED_ROUTE)
            .authorization_bearer("")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn get_protected_route_with_basic_auth() {
        let server = get_test_server(get_token_service());

        server
            .get(TEST_PROTECTED_ROUTE)
            .add_header(
                header::AUTHORIZATION,
                HeaderValue::from_static("Basic YWRtaW46cGFzc3dvcmQ="),
            )
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn get_protected_route_with_expired_token() {
        let expired_token = TokenService::new("nafstenoas", Duration::minutes(-5))
            .issue("admin")
            .unwrap();
        let server = get_test_server(get_token_service());

        server
            .get(TEST_PROTECTED_ROUTE)
            .authorization_bearer(expired_token)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
