// handlers/protected/interface/execute.rs - POST /interface/execute handler

use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};

use crate::executor::{ExecuteRequest, ExecuteResponse, ExecutionContext};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ClientInfo};
use crate::state::AppState;

/**
 * POST /interface/execute - Call an upstream interface with caller parameters
 *
 * Expected Input:
 * ```json
 * {
 *   "interfaceId": 7,
 *   "urlParams": { "q": "abc" },
 *   "headers": { "X-Trace": "1" },
 *   "bodyParams": { "filter": "{\"a\":1}" },
 *   "timeout": 5
 * }
 * ```
 *
 * Expected Output (Success):
 * ```json
 * {
 *   "code": 200,
 *   "message": "success",
 *   "data": {
 *     "status": 200,
 *     "headers": { "content-type": "application/json" },
 *     "body": "{\"data\":{\"id\":42}}",
 *     "extractedValue": "42",
 *     "responseTime": 37,
 *     "success": true,
 *     "error": null
 *   }
 * }
 * ```
 *
 * Upstream failures, disabled interfaces and missing required parameters are
 * reported inside `data` with `success: false`; the envelope itself stays 200.
 */
pub async fn interface_execute(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    client: ClientInfo,
    payload: Result<Json<ExecuteRequest>, JsonRejection>,
) -> ApiResult<ExecuteResponse> {
    let Json(request) = payload?;

    let context = ExecutionContext {
        executor_id: user.uid,
        client_ip: client.ip,
        user_agent: client.user_agent,
    };

    let response = state.executor.execute(request, &context).await?;
    Ok(ApiResponse::success(response))
}
