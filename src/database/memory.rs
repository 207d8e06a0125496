// In-memory stores used by development mode and the test suite
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    ApiInterface, ExecutionAggregate, ExecutionRecord, NewExecutionRecord, NewUser, User,
};
use crate::database::repository::{
    non_blank, ExecutionRecordStore, InterfaceFilter, InterfaceStore, PageRequest, RecordFilter,
    UserStore,
};
use crate::types::{now_millis, EntityStatus};

fn paginate<T: Clone>(items: &[T], page: PageRequest) -> Vec<T> {
    items
        .iter()
        .skip(page.offset() as usize)
        .take(page.size as usize)
        .cloned()
        .collect()
}

fn contains(haystack: Option<&str>, needle: &str) -> bool {
    haystack.map(|h| h.contains(needle)).unwrap_or(false)
}

#[derive(Default)]
pub struct MemoryInterfaceStore {
    rows: RwLock<BTreeMap<i64, ApiInterface>>,
    next_id: AtomicI64,
}

impl MemoryInterfaceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InterfaceStore for MemoryInterfaceStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<ApiInterface>, DatabaseError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_enabled_by_ids(&self, ids: &[i64]) -> Result<Vec<ApiInterface>, DatabaseError> {
        let rows = self.rows.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| rows.get(id))
            .filter(|iface| iface.is_enabled())
            .cloned()
            .collect())
    }

    async fn page(
        &self,
        filter: &InterfaceFilter,
        page: PageRequest,
    ) -> Result<(Vec<ApiInterface>, i64), DatabaseError> {
        let rows = self.rows.read().await;
        let name = non_blank(&filter.name);
        let method = non_blank(&filter.method);
        let environment = non_blank(&filter.environment);

        let matched: Vec<ApiInterface> = rows
            .values()
            .rev()
            .filter(|i| name.map_or(true, |n| i.name.contains(n)))
            .filter(|i| method.map_or(true, |m| i.method.eq_ignore_ascii_case(m)))
            .filter(|i| filter.status.map_or(true, |s| i.status == s))
            .filter(|i| environment.map_or(true, |e| i.environment.as_deref() == Some(e)))
            .cloned()
            .collect();

        Ok((paginate(&matched, page), matched.len() as i64))
    }

    async fn create(&self, mut interface: ApiInterface) -> Result<ApiInterface, DatabaseError> {
        interface.id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.rows
            .write()
            .await
            .insert(interface.id, interface.clone());
        Ok(interface)
    }

    async fn update(&self, interface: &ApiInterface) -> Result<(), DatabaseError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&interface.id) {
            Some(row) => {
                *row = interface.clone();
                Ok(())
            }
            None => Err(DatabaseError::NotFound(format!(
                "interface {} not found",
                interface.id
            ))),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct MemoryExecutionRecordStore {
    rows: RwLock<BTreeMap<i64, ExecutionRecord>>,
    next_id: AtomicI64,
}

impl MemoryExecutionRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert with an explicit creation time
    pub async fn insert_at(&self, record: NewExecutionRecord, create_time: i64) -> ExecutionRecord {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let row = record.into_record(id, create_time);
        self.rows.write().await.insert(id, row.clone());
        row
    }
}

fn record_matches(record: &ExecutionRecord, filter: &RecordFilter) -> bool {
    if filter.interface_id.map_or(false, |id| record.interface_id != id) {
        return false;
    }
    if filter.executor_id.map_or(false, |id| record.executor_id != id) {
        return false;
    }
    if filter.success.map_or(false, |s| record.success != s) {
        return false;
    }
    if let Some(keyword) = non_blank(&filter.keyword) {
        let hit = record.executor_name.contains(keyword)
            || contains(record.error_message.as_deref(), keyword)
            || contains(record.remark.as_deref(), keyword);
        if !hit {
            return false;
        }
    }
    if let Some(name) = non_blank(&filter.executor_name) {
        if !record.executor_name.contains(name) {
            return false;
        }
    }
    if filter.start_time.map_or(false, |t| record.create_time < t) {
        return false;
    }
    if filter.end_time.map_or(false, |t| record.create_time > t) {
        return false;
    }
    let elapsed = record.execution_time;
    if let Some(min) = filter.min_execution_time {
        if elapsed.map_or(true, |e| e < min) {
            return false;
        }
    }
    if let Some(max) = filter.max_execution_time {
        if elapsed.map_or(true, |e| e > max) {
            return false;
        }
    }
    true
}

#[async_trait]
impl ExecutionRecordStore for MemoryExecutionRecordStore {
    async fn insert(&self, record: NewExecutionRecord) -> Result<ExecutionRecord, DatabaseError> {
        Ok(self.insert_at(record, now_millis()).await)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ExecutionRecord>, DatabaseError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_by_executor(
        &self,
        executor_id: i64,
        limit: i64,
    ) -> Result<Vec<ExecutionRecord>, DatabaseError> {
        let rows = self.rows.read().await;
        let mut matched: Vec<ExecutionRecord> = rows
            .values()
            .filter(|r| r.executor_id == executor_id)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.create_time.cmp(&a.create_time).then(b.id.cmp(&a.id)));
        matched.truncate(limit.max(0) as usize);
        Ok(matched)
    }

    async fn page(
        &self,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<(Vec<ExecutionRecord>, i64), DatabaseError> {
        let rows = self.rows.read().await;
        let matched: Vec<ExecutionRecord> = rows
            .values()
            .rev()
            .filter(|r| record_matches(r, filter))
            .cloned()
            .collect();

        Ok((paginate(&matched, page), matched.len() as i64))
    }

    async fn aggregate(&self, interface_id: i64) -> Result<ExecutionAggregate, DatabaseError> {
        let rows = self.rows.read().await;
        let records: Vec<&ExecutionRecord> = rows
            .values()
            .filter(|r| r.interface_id == interface_id)
            .collect();

        let times: Vec<i64> = records.iter().filter_map(|r| r.execution_time).collect();
        let avg_time = if times.is_empty() {
            None
        } else {
            Some(times.iter().sum::<i64>() as f64 / times.len() as f64)
        };

        Ok(ExecutionAggregate {
            total: records.len() as i64,
            succeeded: records.iter().filter(|r| r.success).count() as i64,
            avg_time,
            min_time: times.iter().copied().min(),
            max_time: times.iter().copied().max(),
            last_create_time: records.iter().map(|r| r.create_time).max(),
        })
    }

    async fn count_between(&self, start: i64, end: i64) -> Result<i64, DatabaseError> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|r| r.create_time >= start && r.create_time <= end)
            .count() as i64)
    }

    async fn delete_before(&self, before: i64) -> Result<u64, DatabaseError> {
        let mut rows = self.rows.write().await;
        let initial = rows.len();
        rows.retain(|_, r| r.create_time >= before);
        Ok((initial - rows.len()) as u64)
    }

    async fn most_used_interface_ids(
        &self,
        since: i64,
        limit: i64,
    ) -> Result<Vec<i64>, DatabaseError> {
        let rows = self.rows.read().await;
        let mut counts: HashMap<i64, i64> = HashMap::new();
        for record in rows.values().filter(|r| r.create_time >= since) {
            *counts.entry(record.interface_id).or_default() += 1;
        }

        let mut ranked: Vec<(i64, i64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        Ok(ranked
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|(id, _)| id)
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    rows: RwLock<BTreeMap<i64, User>>,
    next_id: AtomicI64,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn visible(user: &User) -> bool {
        user.status() != EntityStatus::Deleted
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, uid: i64) -> Result<Option<User>, DatabaseError> {
        let rows = self.rows.read().await;
        Ok(rows.get(&uid).filter(|u| Self::visible(u)).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .find(|u| u.username == username && Self::visible(u))
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut rows = self.rows.write().await;
        if rows
            .values()
            .any(|u| u.username == user.username && Self::visible(u))
        {
            return Err(DatabaseError::Conflict(format!(
                "username {} already exists",
                user.username
            )));
        }

        let now = now_millis();
        let row = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            username: user.username,
            password: user.password_hash,
            email: user.email,
            phone: user.phone,
            status: user.status.as_str().to_string(),
            last_login_time: None,
            create_time: now,
            update_time: now,
        };
        rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn touch_last_login(&self, uid: i64, at: i64) -> Result<(), DatabaseError> {
        if let Some(user) = self.rows.write().await.get_mut(&uid) {
            user.last_login_time = Some(at);
            user.update_time = at;
        }
        Ok(())
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        let rows = self.rows.read().await;
        Ok(rows.values().filter(|u| Self::visible(u)).count() as i64)
    }
}
