use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::database::models::{ExecutionRecord, NewExecutionRecord};
use crate::database::ExecutionRecordStore;
use crate::executor::{ExecuteRequest, ExecuteResponse, ExecutionContext};
use crate::types::{HeaderMap, ParamMap};

/// Persists one audit row per execution attempt
#[derive(Clone)]
pub struct ExecutionRecorder {
    store: Arc<dyn ExecutionRecordStore>,
}

impl ExecutionRecorder {
    pub fn new(store: Arc<dyn ExecutionRecordStore>) -> Self {
        Self { store }
    }

    /// Never fails the caller: store errors are logged and swallowed
    pub async fn record(
        &self,
        interface_id: i64,
        executor_name: &str,
        context: &ExecutionContext,
        request: &ExecuteRequest,
        response: &ExecuteResponse,
    ) -> Option<ExecutionRecord> {
        let empty_params = ParamMap::new();
        let empty_headers = HeaderMap::new();

        let record = NewExecutionRecord {
            interface_id,
            executor_id: context.executor_id,
            executor_name: executor_name.to_string(),
            request_params: Some(to_json_or_empty(
                "request params",
                request.url_params.as_ref().unwrap_or(&empty_params),
            )),
            request_headers: Some(to_json_or_empty(
                "request headers",
                request.headers.as_ref().unwrap_or(&empty_headers),
            )),
            request_body: Some(to_json_or_empty(
                "request body",
                request.body_params.as_ref().unwrap_or(&empty_params),
            )),
            response_status: Some(response.status as i32),
            response_headers: Some(to_json_or_empty("response headers", &response.headers)),
            response_body: response.body.clone(),
            execution_time: Some(response.response_time),
            success: response.success,
            error_message: response.error.clone(),
            remark: request.remark.clone(),
            client_ip: Some(context.client_ip.clone()),
            user_agent: Some(context.user_agent.clone()),
        };

        match self.store.insert(record).await {
            Ok(saved) => Some(saved),
            Err(e) => {
                warn!(
                    "failed to save execution record for interface {}: {}",
                    interface_id, e
                );
                None
            }
        }
    }
}

/// Serialization failures fall back to `{}`
pub fn to_json_or_empty<T: Serialize + ?Sized>(what: &str, value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        warn!("failed to serialize {}: {}", what, e);
        "{}".to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryExecutionRecordStore;
    use serde_json::json;

    #[tokio::test]
    async fn absent_maps_are_recorded_as_empty_objects() {
        let store = Arc::new(MemoryExecutionRecordStore::new());
        let recorder = ExecutionRecorder::new(store.clone());
        let context = ExecutionContext {
            executor_id: 3,
            client_ip: "10.0.0.1".into(),
            user_agent: "curl/8".into(),
        };
        let request = ExecuteRequest {
            interface_id: Some(9),
            body_params: json!({ "k": "v" }).as_object().cloned(),
            remark: Some("smoke".into()),
            ..Default::default()
        };
        let response = ExecuteResponse::rejected(400, "URL parameter id is required", 2);

        let saved = recorder
            .record(9, "admin", &context, &request, &response)
            .await
            .unwrap();

        assert_eq!(saved.request_params.as_deref(), Some("{}"));
        assert_eq!(saved.request_headers.as_deref(), Some("{}"));
        assert_eq!(saved.request_body.as_deref(), Some(r#"{"k":"v"}"#));
        assert_eq!(saved.response_status, Some(400));
        assert_eq!(saved.execution_time, Some(2));
        assert!(!saved.success);
        assert_eq!(saved.remark.as_deref(), Some("smoke"));
        assert_eq!(saved.client_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(store.find_by_id(saved.id).await.unwrap().unwrap().executor_id, 3);
    }
}
