// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::api::dto::{LoginRequest, LoginResponse};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/**
 * POST /auth/login - Authenticate and receive a session token
 *
 * Expected Input:
 * ```json
 * { "username": "admin", "password": "secret" }
 * ```
 *
 * Expected Output (Success):
 * ```json
 * {
 *   "code": 200,
 *   "message": "success",
 *   "data": {
 *     "token": "eyJhbGciOiJIUzI1NiI...",
 *     "user": { "id": 1, "username": "admin", "status": "active", ... }
 *   }
 * }
 * ```
 *
 * Issuing a token replaces any token previously issued to the same user.
 */
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;
    let response = state.auth.login(request).await?;
    Ok(ApiResponse::success(response))
}
