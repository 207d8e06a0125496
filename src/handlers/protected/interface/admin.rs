// handlers/protected/interface/admin.rs - Interface CRUD handlers

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Path, Query, State},
    Json,
};

use crate::api::dto::{InterfaceDto, InterfaceForm, InterfaceListQuery, MostUsedQuery, StatusQuery};
use crate::api::format::PageResult;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /interface/list - Paged interface list, newest first
///
/// Query: `name` (substring), `method`, `status`, `environment`, `page`, `size`
pub async fn interface_list(
    State(state): State<AppState>,
    query: Result<Query<InterfaceListQuery>, QueryRejection>,
) -> ApiResult<PageResult<InterfaceDto>> {
    let Query(query) = query?;
    let page = state.interfaces.page(&query).await?;
    Ok(ApiResponse::success(page))
}

/// GET /interface/most/used - Enabled interfaces ranked by recent executions
pub async fn interface_most_used(
    State(state): State<AppState>,
    query: Result<Query<MostUsedQuery>, QueryRejection>,
) -> ApiResult<Vec<InterfaceDto>> {
    let Query(query) = query?;
    let ranked = state.interfaces.most_used(query.days, query.limit).await?;
    Ok(ApiResponse::success(ranked))
}

/// GET /interface/:id - Single interface with its parameter schema
pub async fn interface_get(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<InterfaceDto> {
    let Path(id) = id?;
    Ok(ApiResponse::success(state.interfaces.detail(id).await?))
}

/**
 * POST /interface - Create an interface definition
 *
 * Expected Input:
 * ```json
 * {
 *   "name": "user lookup",
 *   "method": "POST",
 *   "url": "https://upstream.example/users",
 *   "postType": "application/json",
 *   "environment": "TEST",
 *   "valuePath": "$.data.id",
 *   "bodyParams": [
 *     { "name": "uid", "displayName": "User id", "inputType": "TEXT",
 *       "dataType": "INTEGER", "required": true }
 *   ]
 * }
 * ```
 *
 * New interfaces start enabled.
 */
pub async fn interface_create(
    State(state): State<AppState>,
    payload: Result<Json<InterfaceForm>, JsonRejection>,
) -> ApiResult<InterfaceDto> {
    let Json(form) = payload?;
    Ok(ApiResponse::success(state.interfaces.create(form).await?))
}

/// PUT /interface/:id - Replace an interface definition; status is kept
pub async fn interface_update(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<InterfaceForm>, JsonRejection>,
) -> ApiResult<InterfaceDto> {
    let Path(id) = id?;
    let Json(form) = payload?;
    Ok(ApiResponse::success(state.interfaces.update(id, form).await?))
}

/// DELETE /interface/:id
pub async fn interface_delete(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    state.interfaces.delete(id).await?;
    Ok(ApiResponse::empty())
}

/// PUT /interface/:id/status?status=0|1 - Enable or disable
pub async fn interface_status(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> ApiResult<InterfaceDto> {
    let Path(id) = id?;
    let Query(query) = query?;
    Ok(ApiResponse::success(
        state.interfaces.update_status(id, query.status).await?,
    ))
}

/// POST /interface/:id/copy - Duplicate as `<name>_copy`
pub async fn interface_copy(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<InterfaceDto> {
    let Path(id) = id?;
    Ok(ApiResponse::success(state.interfaces.copy(id).await?))
}
