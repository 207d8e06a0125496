// Wire shapes for the admin API (camelCase JSON)
use serde::{Deserialize, Serialize};

use crate::api::format::{format_time, format_time_opt};
use crate::database::models::{ApiInterface, ApiParam, ExecutionAggregate, ExecutionRecord, User};
use crate::database::RecordFilter;
use crate::types::ParamLocation;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDto {
    pub id: i64,
    pub name: String,
    pub method: String,
    pub url: String,
    pub description: Option<String>,
    pub status: i32,
    pub post_type: Option<String>,
    pub environment: Option<String>,
    pub timeout: Option<i64>,
    pub value_path: Option<String>,
    pub url_params: Vec<ApiParam>,
    pub header_params: Vec<ApiParam>,
    pub body_params: Vec<ApiParam>,
    pub create_time: String,
    pub update_time: String,
}

impl From<&ApiInterface> for InterfaceDto {
    fn from(interface: &ApiInterface) -> Self {
        Self {
            id: interface.id,
            name: interface.name.clone(),
            method: interface.method.clone(),
            url: interface.url.clone(),
            description: interface.description.clone(),
            status: interface.status,
            post_type: interface.post_type.clone(),
            environment: interface.environment.clone(),
            timeout: interface.timeout,
            value_path: interface.value_path.clone(),
            url_params: interface.params_at(ParamLocation::Url),
            header_params: interface.params_at(ParamLocation::Header),
            body_params: interface.params_at(ParamLocation::Body),
            create_time: format_time(interface.create_time),
            update_time: format_time(interface.update_time),
        }
    }
}

/// Create/update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceForm {
    pub name: Option<String>,
    pub method: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub post_type: Option<String>,
    pub environment: Option<String>,
    pub timeout: Option<i64>,
    pub value_path: Option<String>,
    #[serde(default)]
    pub url_params: Vec<ApiParam>,
    #[serde(default)]
    pub header_params: Vec<ApiParam>,
    #[serde(default)]
    pub body_params: Vec<ApiParam>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterfaceListQuery {
    pub name: Option<String>,
    pub method: Option<String>,
    pub status: Option<i32>,
    pub environment: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MostUsedQuery {
    pub days: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusQuery {
    pub status: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecordDto {
    pub id: i64,
    pub interface_id: i64,
    pub interface_name: Option<String>,
    pub executor_id: i64,
    pub executor_name: String,
    pub request_params: Option<String>,
    pub request_headers: Option<String>,
    pub request_body: Option<String>,
    pub response_status: Option<i32>,
    pub response_headers: Option<String>,
    pub response_body: Option<String>,
    pub execution_time: Option<i64>,
    pub success: bool,
    pub error_message: Option<String>,
    pub remark: Option<String>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub create_time: String,
    pub update_time: String,
}

impl ExecutionRecordDto {
    pub fn new(record: ExecutionRecord, interface_name: Option<String>) -> Self {
        Self {
            id: record.id,
            interface_id: record.interface_id,
            interface_name,
            executor_id: record.executor_id,
            executor_name: record.executor_name,
            request_params: record.request_params,
            request_headers: record.request_headers,
            request_body: record.request_body,
            response_status: record.response_status,
            response_headers: record.response_headers,
            response_body: record.response_body,
            execution_time: record.execution_time,
            success: record.success,
            error_message: record.error_message,
            remark: record.remark,
            client_ip: record.client_ip,
            user_agent: record.user_agent,
            create_time: format_time(record.create_time),
            update_time: format_time(record.update_time),
        }
    }
}

/// JSON body of the record search
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordListQuery {
    pub interface_id: Option<i64>,
    pub keyword: Option<String>,
    pub executor_id: Option<i64>,
    pub executor_name: Option<String>,
    pub success: Option<bool>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub min_execution_time: Option<i64>,
    pub max_execution_time: Option<i64>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl RecordListQuery {
    pub fn filter(&self) -> RecordFilter {
        RecordFilter {
            interface_id: self.interface_id,
            keyword: self.keyword.clone(),
            executor_id: self.executor_id,
            executor_name: self.executor_name.clone(),
            success: self.success,
            start_time: self.start_time,
            end_time: self.end_time,
            min_execution_time: self.min_execution_time,
            max_execution_time: self.max_execution_time,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStatsDto {
    pub interface_id: i64,
    pub interface_name: Option<String>,
    pub total_executions: i64,
    pub success_executions: i64,
    pub failed_executions: i64,
    /// Percent, 0 when there are no executions
    pub success_rate: f64,
    pub avg_execution_time: f64,
    pub min_execution_time: i64,
    pub max_execution_time: i64,
    pub last_execution_time: Option<String>,
}

impl ExecutionStatsDto {
    pub fn new(interface_id: i64, interface_name: Option<String>, agg: ExecutionAggregate) -> Self {
        let success_rate = if agg.total > 0 {
            agg.succeeded as f64 * 100.0 / agg.total as f64
        } else {
            0.0
        };
        Self {
            interface_id,
            interface_name,
            total_executions: agg.total,
            success_executions: agg.succeeded,
            failed_executions: agg.total - agg.succeeded,
            success_rate,
            avg_execution_time: agg.avg_time.unwrap_or(0.0),
            min_execution_time: agg.min_time.unwrap_or(0),
            max_execution_time: agg.max_time.unwrap_or(0),
            last_execution_time: format_time_opt(agg.last_create_time),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutorRecordsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRangeQuery {
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupQuery {
    pub before_time: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: String,
    pub last_login_time: Option<String>,
    pub create_time: String,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            status: user.status.clone(),
            last_login_time: format_time_opt(user.last_login_time),
            create_time: format_time(user.create_time),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_rate_is_percent_and_safe_on_empty() {
        let stats = ExecutionStatsDto::new(
            1,
            Some("weather".into()),
            ExecutionAggregate {
                total: 4,
                succeeded: 3,
                avg_time: Some(12.5),
                min_time: Some(5),
                max_time: Some(20),
                last_create_time: None,
            },
        );
        assert_eq!(stats.success_rate, 75.0);
        assert_eq!(stats.failed_executions, 1);

        let empty = ExecutionStatsDto::new(2, None, ExecutionAggregate::default());
        assert_eq!(empty.success_rate, 0.0);
        assert_eq!(empty.avg_execution_time, 0.0);
        assert_eq!(empty.last_execution_time, None);
    }
}
