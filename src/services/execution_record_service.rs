use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::api::dto::{ExecutionRecordDto, ExecutionStatsDto, RecordListQuery};
use crate::api::format::{PageParams, PageResult};
use crate::config::AppConfig;
use crate::database::{ExecutionRecordStore, InterfaceStore};
use crate::services::ServiceError;

const DEFAULT_EXECUTOR_LIMIT: i64 = 10;

/// Read and retention operations over execution records
#[derive(Clone)]
pub struct ExecutionRecordService {
    records: Arc<dyn ExecutionRecordStore>,
    interfaces: Arc<dyn InterfaceStore>,
    config: Arc<AppConfig>,
}

impl ExecutionRecordService {
    pub fn new(
        records: Arc<dyn ExecutionRecordStore>,
        interfaces: Arc<dyn InterfaceStore>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            records,
            interfaces,
            config,
        }
    }

    async fn interface_name(&self, id: i64) -> Result<Option<String>, ServiceError> {
        Ok(self.interfaces.find_by_id(id).await?.map(|i| i.name))
    }

    async fn with_names(
        &self,
        records: Vec<crate::database::models::ExecutionRecord>,
    ) -> Result<Vec<ExecutionRecordDto>, ServiceError> {
        let mut names: HashMap<i64, Option<String>> = HashMap::new();
        for record in &records {
            if !names.contains_key(&record.interface_id) {
                let name = self.interface_name(record.interface_id).await?;
                names.insert(record.interface_id, name);
            }
        }

        Ok(records
            .into_iter()
            .map(|r| {
                let name = names.get(&r.interface_id).cloned().flatten();
                ExecutionRecordDto::new(r, name)
            })
            .collect())
    }

    pub async fn page(
        &self,
        query: &RecordListQuery,
    ) -> Result<PageResult<ExecutionRecordDto>, ServiceError> {
        let page = PageParams {
            page: query.page,
            size: query.size,
        }
        .resolve(&self.config.executor)?;

        let (rows, total) = self.records.page(&query.filter(), page).await?;
        Ok(PageResult::new(self.with_names(rows).await?, total, page))
    }

    pub async fn detail(&self, id: i64) -> Result<ExecutionRecordDto, ServiceError> {
        let record = self
            .records
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("execution record not found".into()))?;
        let name = self.interface_name(record.interface_id).await?;
        Ok(ExecutionRecordDto::new(record, name))
    }

    /// Most recent first; `limit` defaults to 10
    pub async fn by_executor(
        &self,
        executor_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<ExecutionRecordDto>, ServiceError> {
        let limit = limit.unwrap_or(DEFAULT_EXECUTOR_LIMIT);
        if limit < 1 || limit > self.config.executor.max_page_size {
            return Err(ServiceError::Validation(format!(
                "limit must be between 1 and {}",
                self.config.executor.max_page_size
            )));
        }

        let rows = self.records.find_by_executor(executor_id, limit).await?;
        self.with_names(rows).await
    }

    pub async fn stats(&self, interface_id: i64) -> Result<ExecutionStatsDto, ServiceError> {
        let aggregate = self.records.aggregate(interface_id).await?;
        let name = self.interface_name(interface_id).await?;
        Ok(ExecutionStatsDto::new(interface_id, name, aggregate))
    }

    /// Inclusive on both ends
    pub async fn count(&self, start: Option<i64>, end: Option<i64>) -> Result<i64, ServiceError> {
        let (Some(start), Some(end)) = (start, end) else {
            return Err(ServiceError::Validation("startTime and endTime are required".into()));
        };
        if start > end {
            return Err(ServiceError::Validation("startTime must not be after endTime".into()));
        }
        Ok(self.records.count_between(start, end).await?)
    }

    /// Deletes records created strictly before `before`
    pub async fn cleanup(&self, before: Option<i64>) -> Result<u64, ServiceError> {
        let before = before.ok_or_else(|| ServiceError::Validation("beforeTime is required".into()))?;
        let deleted = self.records.delete_before(before).await?;
        info!("removed {} execution records created before {}", deleted, before);
        Ok(deleted)
    }
}
