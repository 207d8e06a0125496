use axum::{extract::State, Extension};

use crate::api::dto::UserDto;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /auth/current/user - Profile of the signed-in user
pub async fn current_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<UserDto> {
    let profile = state.auth.current_user(user.uid).await?;
    Ok(ApiResponse::success(profile))
}

/// POST /auth/refresh/token - Issue a new token; the old one stops working
pub async fn refresh_token(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<String> {
    let token = state.auth.refresh(user.uid).await?;
    Ok(ApiResponse::success(token))
}

/// POST /auth/logout - Drop the stored session token
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<()> {
    state.auth.logout(user.uid).await;
    Ok(ApiResponse::empty())
}
