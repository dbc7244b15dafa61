use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
    body::Body,
};
use headers::{authorization::Bearer, Authorization, HeaderMapExt};
use tracing::debug;

use shared_models::auth::AuthUser;
use shared_models::error::AppError;

use crate::jwt::validate_token;
use crate::state::AppState;

pub const TEST_MODE_USER_ID: &str = "00000000-0000-4000-8000-000000000001";

/// Identity used for every request while `AUTH_TEST_MODE` is enabled.
pub fn placeholder_user() -> AuthUser {
    AuthUser {
        id: TEST_MODE_USER_ID.to_string(),
        email: Some("test@example.com".to_string()),
        name: Some("Test User".to_string()),
        role: Some("patient".to_string()),
        created_at: None,
    }
}

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = if state.config.auth_test_mode {
        debug!("Auth test mode: using placeholder identity");
        placeholder_user()
    } else {
        authenticate(&request, &state.config.supabase_jwt_secret)?
    };

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

fn authenticate<B>(request: &Request<B>, jwt_secret: &str) -> Result<AuthUser, AppError> {
    if !request.headers().contains_key(AUTHORIZATION) {
        return Err(AppError::Auth("Authorization header required".to_string()));
    }

    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

    validate_token(bearer.token(), jwt_secret).map_err(|reason| {
        debug!("Rejected bearer token: {}", reason);
        AppError::Auth("Invalid token".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::{routing::get, Extension, Router, middleware};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use crate::test_utils::{JwtTestUtils, TestConfig, TestUser};

    fn request_with(header: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header("authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_authenticate_missing_header() {
        let result = authenticate(&request_with(None), "secret");
        assert_matches!(result, Err(AppError::Auth(msg)) if msg == "Authorization header required");
    }

    #[test]
    fn test_authenticate_wrong_scheme() {
        let result = authenticate(&request_with(Some("Basic abc")), "secret");
        assert_matches!(result, Err(AppError::Auth(msg)) if msg == "Invalid authorization header format");
    }

    #[test]
    fn test_authenticate_bad_token() {
        let result = authenticate(&request_with(Some("Bearer not.a.token")), "secret");
        assert_matches!(result, Err(AppError::Auth(msg)) if msg == "Invalid token");
    }

    #[test]
    fn test_authenticate_valid_token() {
        let config = TestConfig::default();
        let user = TestUser::patient("patient@example.com");
        let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));

        let header = format!("Bearer {}", token);
        let auth_user = authenticate(&request_with(Some(&header)), &config.jwt_secret).unwrap();
        assert_eq!(auth_user.id, user.id);
    }

    fn whoami_app(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/", get(|Extension(user): Extension<AuthUser>| async move { user.id }))
            .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_middleware_test_mode_injects_placeholder() {
        let state = TestConfig::default().to_test_mode_state();

        let response = whoami_app(state).oneshot(request_with(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], TEST_MODE_USER_ID.as_bytes());
    }

    #[tokio::test]
    async fn test_middleware_rejects_without_test_mode() {
        let state = TestConfig::default().to_state();

        let response = whoami_app(state).oneshot(request_with(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
