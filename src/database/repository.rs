use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    ApiInterface, ExecutionAggregate, ExecutionRecord, NewExecutionRecord, NewUser, User,
};

/// Validated page window (1-based page)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl PageRequest {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.size)
    }
}

/// Interface list filters. Blank strings are ignored.
#[derive(Debug, Clone, Default)]
pub struct InterfaceFilter {
    /// Substring match on name
    pub name: Option<String>,
    pub method: Option<String>,
    pub status: Option<i32>,
    pub environment: Option<String>,
}

/// Execution record search filters; time bounds are inclusive epoch millis
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub interface_id: Option<i64>,
    /// Substring match over executor name, error message and remark
    pub keyword: Option<String>,
    pub executor_id: Option<i64>,
    /// Substring match on executor name
    pub executor_name: Option<String>,
    pub success: Option<bool>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub min_execution_time: Option<i64>,
    pub max_execution_time: Option<i64>,
}

pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[async_trait]
pub trait InterfaceStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<ApiInterface>, DatabaseError>;

    /// Enabled definitions among `ids`, in no particular order
    async fn find_enabled_by_ids(&self, ids: &[i64]) -> Result<Vec<ApiInterface>, DatabaseError>;

    /// Newest first
    async fn page(
        &self,
        filter: &InterfaceFilter,
        page: PageRequest,
    ) -> Result<(Vec<ApiInterface>, i64), DatabaseError>;

    /// Inserts `interface`; its id is assigned by the store
    async fn create(&self, interface: ApiInterface) -> Result<ApiInterface, DatabaseError>;

    async fn update(&self, interface: &ApiInterface) -> Result<(), DatabaseError>;

    /// Returns false when nothing was deleted
    async fn delete(&self, id: i64) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait ExecutionRecordStore: Send + Sync {
    async fn insert(&self, record: NewExecutionRecord) -> Result<ExecutionRecord, DatabaseError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<ExecutionRecord>, DatabaseError>;

    /// Most recent first, at most `limit`
    async fn find_by_executor(
        &self,
        executor_id: i64,
        limit: i64,
    ) -> Result<Vec<ExecutionRecord>, DatabaseError>;

    /// Newest id first
    async fn page(
        &self,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<(Vec<ExecutionRecord>, i64), DatabaseError>;

    async fn aggregate(&self, interface_id: i64) -> Result<ExecutionAggregate, DatabaseError>;

    async fn count_between(&self, start: i64, end: i64) -> Result<i64, DatabaseError>;

    /// Removes records with `create_time < before`
    async fn delete_before(&self, before: i64) -> Result<u64, DatabaseError>;

    /// Interface ids ranked by execution count since `since`, ties by id
    async fn most_used_interface_ids(
        &self,
        since: i64,
        limit: i64,
    ) -> Result<Vec<i64>, DatabaseError>;
}

/// Lookups never return users whose status is `deleted`
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, uid: i64) -> Result<Option<User>, DatabaseError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    async fn create(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn touch_last_login(&self, uid: i64, at: i64) -> Result<(), DatabaseError>;

    async fn count(&self) -> Result<i64, DatabaseError>;
}
