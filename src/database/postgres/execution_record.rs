use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::database::manager::DatabaseError;
use crate::database::models::{ExecutionAggregate, ExecutionRecord, NewExecutionRecord};
use crate::database::repository::{non_blank, ExecutionRecordStore, PageRequest, RecordFilter};
use crate::types::now_millis;

const COLUMNS: &str = "id, interface_id, executor_id, executor_name, request_params, \
                       request_headers, request_body, response_status, response_headers, \
                       response_body, execution_time, success, error_message, remark, \
                       client_ip, user_agent, create_time, update_time";

pub struct PgExecutionRecordStore {
    pool: PgPool,
}

impl PgExecutionRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a RecordFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(id) = filter.interface_id {
        builder.push(" AND interface_id = ").push_bind(id);
    }
    if let Some(keyword) = non_blank(&filter.keyword) {
        let pattern = format!("%{}%", keyword);
        builder
            .push(" AND (executor_name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR error_message LIKE ")
            .push_bind(pattern.clone())
            .push(" OR remark LIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(id) = filter.executor_id {
        builder.push(" AND executor_id = ").push_bind(id);
    }
    if let Some(name) = non_blank(&filter.executor_name) {
        builder
            .push(" AND executor_name LIKE ")
            .push_bind(format!("%{}%", name));
    }
    if let Some(success) = filter.success {
        builder.push(" AND success = ").push_bind(success);
    }
    if let Some(start) = filter.start_time {
        builder.push(" AND create_time >= ").push_bind(start);
    }
    if let Some(end) = filter.end_time {
        builder.push(" AND create_time <= ").push_bind(end);
    }
    if let Some(min) = filter.min_execution_time {
        builder.push(" AND execution_time >= ").push_bind(min);
    }
    if let Some(max) = filter.max_execution_time {
        builder.push(" AND execution_time <= ").push_bind(max);
    }
}

#[async_trait]
impl ExecutionRecordStore for PgExecutionRecordStore {
    async fn insert(&self, record: NewExecutionRecord) -> Result<ExecutionRecord, DatabaseError> {
        let now = now_millis();
        let sql = format!(
            "INSERT INTO api_interface_execution_record \
             (interface_id, executor_id, executor_name, request_params, request_headers, \
              request_body, response_status, response_headers, response_body, execution_time, \
              success, error_message, remark, client_ip, user_agent, create_time, update_time) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $16) \
             RETURNING {}",
            COLUMNS
        );
        let row = sqlx::query_as::<_, ExecutionRecord>(&sql)
            .bind(record.interface_id)
            .bind(record.executor_id)
            .bind(&record.executor_name)
            .bind(&record.request_params)
            .bind(&record.request_headers)
            .bind(&record.request_body)
            .bind(record.response_status)
            .bind(&record.response_headers)
            .bind(&record.response_body)
            .bind(record.execution_time)
            .bind(record.success)
            .bind(&record.error_message)
            .bind(&record.remark)
            .bind(&record.client_ip)
            .bind(&record.user_agent)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ExecutionRecord>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM api_interface_execution_record WHERE id = $1",
            COLUMNS
        );
        let row = sqlx::query_as::<_, ExecutionRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_executor(
        &self,
        executor_id: i64,
        limit: i64,
    ) -> Result<Vec<ExecutionRecord>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM api_interface_execution_record WHERE executor_id = $1 \
             ORDER BY create_time DESC, id DESC LIMIT $2",
            COLUMNS
        );
        let rows = sqlx::query_as::<_, ExecutionRecord>(&sql)
            .bind(executor_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn page(
        &self,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<(Vec<ExecutionRecord>, i64), DatabaseError> {
        let mut count =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM api_interface_execution_record");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM api_interface_execution_record",
            COLUMNS
        ));
        push_filters(&mut select, filter);
        select
            .push(" ORDER BY id DESC LIMIT ")
            .push_bind(page.size)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows = select
            .build_query_as::<ExecutionRecord>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn aggregate(&self, interface_id: i64) -> Result<ExecutionAggregate, DatabaseError> {
        let row = sqlx::query_as::<_, ExecutionAggregate>(
            "SELECT COUNT(*) AS total, \
                    COUNT(*) FILTER (WHERE success) AS succeeded, \
                    AVG(execution_time)::FLOAT8 AS avg_time, \
                    MIN(execution_time) AS min_time, \
                    MAX(execution_time) AS max_time, \
                    MAX(create_time) AS last_create_time \
             FROM api_interface_execution_record WHERE interface_id = $1",
        )
        .bind(interface_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn count_between(&self, start: i64, end: i64) -> Result<i64, DatabaseError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM api_interface_execution_record \
             WHERE create_time >= $1 AND create_time <= $2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn delete_before(&self, before: i64) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM api_interface_execution_record WHERE create_time < $1")
            .bind(before)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn most_used_interface_ids(
        &self,
        since: i64,
        limit: i64,
    ) -> Result<Vec<i64>, DatabaseError> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT interface_id FROM api_interface_execution_record \
             WHERE create_time >= $1 \
             GROUP BY interface_id \
             ORDER BY COUNT(*) DESC, interface_id ASC \
             LIMIT $2",
        )
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}
