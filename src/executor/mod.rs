//! Dynamic interface execution: load a stored definition, process and check
//! the caller's parameters, issue the outbound call, extract the configured
//! value and write the audit record.

pub mod extractor;
pub mod invoker;
pub mod params;
pub mod recorder;

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::database::{InterfaceStore, UserStore};
use crate::services::ServiceError;
use crate::types::{HeaderMap, ParamMap};

pub use extractor::extract_value;
pub use invoker::{HttpInvoker, InvokeError, Invocation};
pub use params::{process_params, validate_required, ParamError};
pub use recorder::ExecutionRecorder;

/// Label recorded when the executor's account cannot be resolved
pub const UNKNOWN_EXECUTOR: &str = "unknown user";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub interface_id: Option<i64>,
    pub headers: Option<HeaderMap>,
    pub url_params: Option<ParamMap>,
    pub body_params: Option<ParamMap>,
    /// Seconds
    pub timeout: Option<i64>,
    pub remark: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Option<String>,
    pub extracted_value: Option<String>,
    /// Milliseconds
    pub response_time: i64,
    pub success: bool,
    pub error: Option<String>,
}

impl ExecuteResponse {
    /// Failure produced without (or instead of) an upstream response
    pub fn rejected(status: u16, error: impl Into<String>, response_time: i64) -> Self {
        Self {
            status,
            error: Some(error.into()),
            response_time,
            ..Default::default()
        }
    }

    fn from_invocation(invocation: Invocation) -> Self {
        let error = (!invocation.success).then(|| invocation.body.clone());
        Self {
            status: invocation.status,
            headers: invocation.headers,
            body: Some(invocation.body),
            extracted_value: None,
            response_time: invocation.elapsed_ms,
            success: invocation.success,
            error,
        }
    }
}

/// Who triggered the execution and from where
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    pub executor_id: i64,
    pub client_ip: String,
    pub user_agent: String,
}

#[derive(Clone)]
pub struct Executor {
    interfaces: Arc<dyn InterfaceStore>,
    users: Arc<dyn UserStore>,
    invoker: HttpInvoker,
    recorder: ExecutionRecorder,
}

impl Executor {
    pub fn new(
        interfaces: Arc<dyn InterfaceStore>,
        users: Arc<dyn UserStore>,
        invoker: HttpInvoker,
        recorder: ExecutionRecorder,
    ) -> Self {
        Self {
            interfaces,
            users,
            invoker,
            recorder,
        }
    }

    async fn executor_name(&self, uid: i64) -> String {
        match self.users.find_by_id(uid).await {
            Ok(Some(user)) => user.username,
            Ok(None) => UNKNOWN_EXECUTOR.to_string(),
            Err(e) => {
                warn!("could not resolve executor {}: {}", uid, e);
                UNKNOWN_EXECUTOR.to_string()
            }
        }
    }

    /// Runs one execution. Only a missing id, an unknown interface or a store
    /// failure on lookup is returned as an error; every other outcome is an
    /// `ExecuteResponse` with `success: false` and is recorded.
    pub async fn execute(
        &self,
        request: ExecuteRequest,
        context: &ExecutionContext,
    ) -> Result<ExecuteResponse, ServiceError> {
        let started = Instant::now();
        let elapsed = || started.elapsed().as_millis() as i64;

        let executor_name = self.executor_name(context.executor_id).await;

        let interface_id = request
            .interface_id
            .ok_or_else(|| ServiceError::Validation("interfaceId is required".into()))?;

        let interface = self
            .interfaces
            .find_by_id(interface_id)
            .await?
            .ok_or_else(|| {
                warn!("execution rejected, interface {} not found", interface_id);
                ServiceError::NotFound("interface not found".into())
            })?;

        info!(
            "executing interface {} ({}) for {}",
            interface_id, interface.name, executor_name
        );

        if !interface.is_enabled() {
            warn!("interface {} is disabled", interface_id);
            let response = ExecuteResponse::rejected(403, "interface is disabled", elapsed());
            self.recorder
                .record(interface_id, &executor_name, context, &request, &response)
                .await;
            return Ok(response);
        }

        let processed = process_params(interface.schema(), &request);

        if let Err(e) = validate_required(interface.schema(), &processed) {
            warn!("interface {} rejected: {}", interface_id, e);
            let response = ExecuteResponse::rejected(400, e.to_string(), elapsed());
            self.recorder
                .record(interface_id, &executor_name, context, &processed, &response)
                .await;
            return Ok(response);
        }

        let mut response = match self.invoker.invoke(&interface, &processed).await {
            Ok(invocation) => ExecuteResponse::from_invocation(invocation),
            Err(e) => {
                warn!("interface {} call failed: {}", interface_id, e);
                let response = ExecuteResponse::rejected(500, e.to_string(), elapsed());
                self.recorder
                    .record(interface_id, &executor_name, context, &processed, &response)
                    .await;
                return Ok(response);
            }
        };

        if let (Some(path), Some(body)) = (interface.value_path(), response.body.as_deref()) {
            if !body.is_empty() {
                response.extracted_value = extract_value(body, path);
            }
        }

        self.recorder
            .record(interface_id, &executor_name, context, &processed, &response)
            .await;

        info!(
            "interface {} finished: status={} success={} time={}ms",
            interface_id, response.status, response.success, response.response_time
        );
        Ok(response)
    }
}
