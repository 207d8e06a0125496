use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Path, Query, State},
    Json,
};

use crate::api::dto::{
    CleanupQuery, ExecutionRecordDto, ExecutionStatsDto, ExecutorRecordsQuery, RecordListQuery,
    TimeRangeQuery,
};
use crate::api::format::PageResult;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/**
 * POST /interface/execution/record/list - Filtered, paged record search
 *
 * Expected Input (every field optional):
 * ```json
 * {
 *   "interfaceId": 7,
 *   "keyword": "timeout",
 *   "success": false,
 *   "startTime": 1700000000000,
 *   "endTime": 1700086400000,
 *   "page": 1,
 *   "size": 20
 * }
 * ```
 */
pub async fn record_list(
    State(state): State<AppState>,
    payload: Result<Json<RecordListQuery>, JsonRejection>,
) -> ApiResult<PageResult<ExecutionRecordDto>> {
    let Json(query) = payload?;
    Ok(ApiResponse::success(state.records.page(&query).await?))
}

/// GET /interface/execution/record/:id
pub async fn record_get(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<ExecutionRecordDto> {
    let Path(id) = id?;
    Ok(ApiResponse::success(state.records.detail(id).await?))
}

/// GET /interface/execution/record/executor/:executor_id?limit=10
pub async fn records_by_executor(
    State(state): State<AppState>,
    executor_id: Result<Path<i64>, PathRejection>,
    query: Result<Query<ExecutorRecordsQuery>, QueryRejection>,
) -> ApiResult<Vec<ExecutionRecordDto>> {
    let Path(executor_id) = executor_id?;
    let Query(query) = query?;
    let records = state.records.by_executor(executor_id, query.limit).await?;
    Ok(ApiResponse::success(records))
}

/// GET /interface/execution/record/stats/:interface_id
pub async fn record_stats(
    State(state): State<AppState>,
    interface_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<ExecutionStatsDto> {
    let Path(interface_id) = interface_id?;
    Ok(ApiResponse::success(state.records.stats(interface_id).await?))
}

/// GET /interface/execution/record/count?startTime=..&endTime=..
pub async fn record_count(
    State(state): State<AppState>,
    query: Result<Query<TimeRangeQuery>, QueryRejection>,
) -> ApiResult<i64> {
    let Query(query) = query?;
    let count = state.records.count(query.start_time, query.end_time).await?;
    Ok(ApiResponse::success(count))
}

/// DELETE /interface/execution/record/cleanup?beforeTime=.. - Returns the number removed
pub async fn record_cleanup(
    State(state): State<AppState>,
    query: Result<Query<CleanupQuery>, QueryRejection>,
) -> ApiResult<u64> {
    let Query(query) = query?;
    let deleted = state.records.cleanup(query.before_time).await?;
    Ok(ApiResponse::success(deleted))
}
