//! Signup, login and current-identity handlers.

use axum::extract::State;

use crate::error::{ApiJson, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::UserProfile;
use crate::response::{ApiResponse, Created};
use crate::services::auth::{AuthService, AuthSession, LoginRequest, SignupRequest};
use crate::state::AppState;

/// `POST /api/auth/signup`
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<Created<AuthSession>> {
    let session = AuthService::new(state.users(), state.tokens())
        .signup(request)
        .await?;

    add_breadcrumb("auth", "Signed up", None);
    Ok(Created(ApiResponse::ok("User created", session)))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<ApiResponse<AuthSession>> {
    let session = AuthService::new(state.users(), state.tokens())
        .login(request)
        .await?;

    add_breadcrumb("auth", "Logged in", None);
    Ok(ApiResponse::ok("Authenticated", session))
}

/// `GET /api/auth/me`
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> Result<ApiResponse<UserProfile>> {
    let user = AuthService::new(state.users(), state.tokens())
        .current_user(auth.id)
        .await?;

    Ok(ApiResponse::ok("Authenticated", UserProfile::from(&user)))
}
