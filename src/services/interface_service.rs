use std::collections::HashMap;
use std::sync::Arc;

use sqlx::types::Json;
use tracing::info;

use crate::api::dto::{InterfaceDto, InterfaceForm, InterfaceListQuery};
use crate::api::format::{PageParams, PageResult};
use crate::config::AppConfig;
use crate::database::models::{ApiInterface, ApiParam, INTERFACE_DISABLED, INTERFACE_ENABLED};
use crate::database::{ExecutionRecordStore, InterfaceFilter, InterfaceStore};
use crate::services::ServiceError;
use crate::types::{now_millis, HttpMethod, InterfaceEnvironment, ParamLocation, PostType};

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Administration of stored interface definitions
#[derive(Clone)]
pub struct InterfaceService {
    interfaces: Arc<dyn InterfaceStore>,
    records: Arc<dyn ExecutionRecordStore>,
    config: Arc<AppConfig>,
}

impl InterfaceService {
    pub fn new(
        interfaces: Arc<dyn InterfaceStore>,
        records: Arc<dyn ExecutionRecordStore>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            interfaces,
            records,
            config,
        }
    }

    pub async fn page(&self, query: &InterfaceListQuery) -> Result<PageResult<InterfaceDto>, ServiceError> {
        let page = PageParams {
            page: query.page,
            size: query.size,
        }
        .resolve(&self.config.executor)?;
        let filter = InterfaceFilter {
            name: query.name.clone(),
            method: query.method.clone(),
            status: query.status,
            environment: query.environment.clone(),
        };

        let (rows, total) = self.interfaces.page(&filter, page).await?;
        let records = rows.iter().map(InterfaceDto::from).collect();
        Ok(PageResult::new(records, total, page))
    }

    /// Enabled interfaces ranked by recent execution count
    pub async fn most_used(
        &self,
        days: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<InterfaceDto>, ServiceError> {
        let days = days.unwrap_or(self.config.executor.most_used_days);
        let limit = limit.unwrap_or(self.config.executor.most_used_limit);
        if days < 1 || limit < 1 {
            return Err(ServiceError::Validation(
                "days and limit must be positive".into(),
            ));
        }

        let window = days
            .checked_mul(DAY_MILLIS)
            .ok_or_else(|| ServiceError::Validation("days is out of range".into()))?;
        let since = now_millis().saturating_sub(window);
        let ranked = self.records.most_used_interface_ids(since, limit).await?;
        if ranked.is_empty() {
            return Ok(vec![]);
        }

        let by_id: HashMap<i64, ApiInterface> = self
            .interfaces
            .find_enabled_by_ids(&ranked)
            .await?
            .into_iter()
            .map(|i| (i.id, i))
            .collect();

        Ok(ranked
            .iter()
            .filter_map(|id| by_id.get(id))
            .map(InterfaceDto::from)
            .collect())
    }

    async fn load(&self, id: i64) -> Result<ApiInterface, ServiceError> {
        self.interfaces
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("interface not found".into()))
    }

    pub async fn detail(&self, id: i64) -> Result<InterfaceDto, ServiceError> {
        Ok(InterfaceDto::from(&self.load(id).await?))
    }

    /// New definitions start enabled
    pub async fn create(&self, form: InterfaceForm) -> Result<InterfaceDto, ServiceError> {
        let mut interface = validate_form(form)?;
        let now = now_millis();
        interface.status = INTERFACE_ENABLED;
        interface.create_time = now;
        interface.update_time = now;

        let saved = self.interfaces.create(interface).await?;
        info!("created interface {} ({})", saved.id, saved.name);
        Ok(InterfaceDto::from(&saved))
    }

    /// Keeps id, status and creation time
    pub async fn update(&self, id: i64, form: InterfaceForm) -> Result<InterfaceDto, ServiceError> {
        let existing = self.load(id).await?;
        let mut interface = validate_form(form)?;
        interface.id = existing.id;
        interface.status = existing.status;
        interface.create_time = existing.create_time;
        interface.update_time = now_millis();

        self.interfaces.update(&interface).await?;
        info!("updated interface {}", id);
        Ok(InterfaceDto::from(&interface))
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !self.interfaces.delete(id).await? {
            return Err(ServiceError::NotFound("interface not found".into()));
        }
        info!("deleted interface {}", id);
        Ok(())
    }

    pub async fn update_status(&self, id: i64, status: i32) -> Result<InterfaceDto, ServiceError> {
        if status != INTERFACE_ENABLED && status != INTERFACE_DISABLED {
            return Err(ServiceError::Validation(format!(
                "status must be {} or {}",
                INTERFACE_DISABLED, INTERFACE_ENABLED
            )));
        }

        let mut interface = self.load(id).await?;
        interface.status = status;
        interface.update_time = now_millis();
        self.interfaces.update(&interface).await?;
        info!("interface {} status set to {}", id, status);
        Ok(InterfaceDto::from(&interface))
    }

    /// Duplicate named `<name>_copy`, enabled
    pub async fn copy(&self, id: i64) -> Result<InterfaceDto, ServiceError> {
        let mut copy = self.load(id).await?;
        let now = now_millis();
        copy.id = 0;
        copy.name = format!("{}_copy", copy.name);
        copy.status = INTERFACE_ENABLED;
        copy.create_time = now;
        copy.update_time = now;

        let saved = self.interfaces.create(copy).await?;
        info!("copied interface {} to {}", id, saved.id);
        Ok(InterfaceDto::from(&saved))
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, field: &str) -> Result<String, ServiceError> {
    blank_to_none(value).ok_or_else(|| ServiceError::Validation(format!("{} is required", field)))
}

/// Checks the form and builds an unsaved definition (id 0, no timestamps).
/// Parameter lists are merged in url, header, body order.
pub fn validate_form(form: InterfaceForm) -> Result<ApiInterface, ServiceError> {
    let name = required(form.name, "name")?;
    let method_raw = required(form.method, "method")?;
    let url = required(form.url, "url")?;

    let method: HttpMethod = method_raw
        .parse()
        .map_err(|_| ServiceError::Validation(format!("unsupported method: {}", method_raw)))?;

    match url::Url::parse(&url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        _ => {
            return Err(ServiceError::Validation(
                "url must be an absolute http(s) URL".into(),
            ))
        }
    }

    let post_type = blank_to_none(form.post_type);
    if let Some(code) = post_type.as_deref() {
        if code != PostType::Json.content_type() && code != PostType::Form.content_type() {
            return Err(ServiceError::Validation(format!("unsupported post type: {}", code)));
        }
    } else if method.requires_post_type() {
        return Err(ServiceError::Validation(format!(
            "post type is required for {}",
            method
        )));
    }

    let environment = blank_to_none(form.environment);
    if let Some(env) = environment.as_deref() {
        let known = [InterfaceEnvironment::Test, InterfaceEnvironment::Production];
        if !known.iter().any(|e| e.as_str() == env) {
            return Err(ServiceError::Validation(format!("unsupported environment: {}", env)));
        }
    }

    if let Some(timeout) = form.timeout {
        if timeout <= 0 {
            return Err(ServiceError::Validation("timeout must be positive".into()));
        }
    }

    let mut params: Vec<ApiParam> = Vec::new();
    for (location, group) in [
        (ParamLocation::Url, form.url_params),
        (ParamLocation::Header, form.header_params),
        (ParamLocation::Body, form.body_params),
    ] {
        for mut param in group {
            param.name = param.name.trim().to_string();
            if param.name.is_empty() {
                return Err(ServiceError::Validation(format!(
                    "{} parameter name is required",
                    location.label()
                )));
            }
            param.location = location;
            params.push(param);
        }
    }

    Ok(ApiInterface {
        id: 0,
        name,
        method: method.as_str().to_string(),
        url,
        description: blank_to_none(form.description),
        post_type,
        params: Json(params),
        status: INTERFACE_ENABLED,
        environment,
        timeout: form.timeout,
        value_path: blank_to_none(form.value_path),
        create_time: 0,
        update_time: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(value: serde_json::Value) -> InterfaceForm {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn valid_form_merges_params_in_location_order() {
        let interface = validate_form(form(json!({
            "name": " weather ",
            "method": "post",
            "url": "https://api.example.com/weather",
            "postType": "application/json",
            "environment": "TEST",
            "bodyParams": [{ "name": "payload", "paramType": "BODY_PARAM", "dataType": "JSON_OBJECT" }],
            "urlParams": [{ "name": "city", "paramType": "URL_PARAM", "required": true }],
            "headerParams": [{ "name": "X-Key", "paramType": "URL_PARAM" }]
        })))
        .unwrap();

        assert_eq!(interface.name, "weather");
        assert_eq!(interface.method, "POST");
        let names: Vec<_> = interface.schema().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["city", "X-Key", "payload"]);
        // bucket wins over the declared location
        assert_eq!(interface.schema()[1].location, ParamLocation::Header);
    }

    #[test]
    fn form_rules() {
        let base = json!({ "name": "n", "method": "GET", "url": "http://h/p" });
        assert!(validate_form(form(base.clone())).is_ok());

        let cases = [
            json!({ "method": "GET", "url": "http://h" }),
            json!({ "name": "n", "method": "TRACE", "url": "http://h" }),
            json!({ "name": "n", "method": "GET", "url": "ftp://h" }),
            json!({ "name": "n", "method": "GET", "url": "/relative" }),
            json!({ "name": "n", "method": "PUT", "url": "http://h" }),
            json!({ "name": "n", "method": "PUT", "url": "http://h", "postType": "text/xml" }),
            json!({ "name": "n", "method": "GET", "url": "http://h", "timeout": 0 }),
            json!({ "name": "n", "method": "GET", "url": "http://h", "environment": "DEV" }),
        ];
        for case in cases {
            assert!(
                matches!(validate_form(form(case.clone())), Err(ServiceError::Validation(_))),
                "expected rejection for {}",
                case
            );
        }
    }

    #[tokio::test]
    async fn most_used_window_must_fit() {
        use crate::database::memory::{MemoryExecutionRecordStore, MemoryInterfaceStore};

        let service = InterfaceService::new(
            Arc::new(MemoryInterfaceStore::new()),
            Arc::new(MemoryExecutionRecordStore::new()),
            Arc::new(AppConfig::development()),
        );

        let err = service.most_used(Some(i64::MAX), Some(5)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        // far past but representable: empty ranking, no overflow
        let ranked = service.most_used(Some(i64::MAX / DAY_MILLIS), Some(5)).await.unwrap();
        assert!(ranked.is_empty());
    }
}
