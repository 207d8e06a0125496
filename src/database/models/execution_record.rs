use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Append-only audit row for one execution attempt (`api_interface_execution_record` table)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExecutionRecord {
    pub id: i64,
    pub interface_id: i64,
    pub executor_id: i64,
    pub executor_name: String,
    pub request_params: Option<String>,
    pub request_headers: Option<String>,
    pub request_body: Option<String>,
    pub response_status: Option<i32>,
    pub response_headers: Option<String>,
    pub response_body: Option<String>,
    /// Milliseconds
    pub execution_time: Option<i64>,
    pub success: bool,
    pub error_message: Option<String>,
    pub remark: Option<String>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub create_time: i64,
    pub update_time: i64,
}

/// Insert payload; id and timestamps are assigned by the store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewExecutionRecord {
    pub interface_id: i64,
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
}

impl NewExecutionRecord {
    pub fn into_record(self, id: i64, now: i64) -> ExecutionRecord {
        ExecutionRecord {
            id,
            interface_id: self.interface_id,
            executor_id: self.executor_id,
            executor_name: self.executor_name,
            request_params: self.request_params,
            request_headers: self.request_headers,
            request_body: self.request_body,
            response_status: self.response_status,
            response_headers: self.response_headers,
            response_body: self.response_body,
            execution_time: self.execution_time,
            success: self.success,
            error_message: self.error_message,
            remark: self.remark,
            client_ip: self.client_ip,
            user_agent: self.user_agent,
            create_time: now,
            update_time: now,
        }
    }
}

/// Aggregates over every record of one interface
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct ExecutionAggregate {
    pub total: i64,
    pub succeeded: i64,
    pub avg_time: Option<f64>,
    pub min_time: Option<i64>,
    pub max_time: Option<i64>,
    pub last_create_time: Option<i64>,
}
