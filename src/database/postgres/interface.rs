use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::database::manager::DatabaseError;
use crate::database::models::{ApiInterface, INTERFACE_ENABLED};
use crate::database::repository::{non_blank, InterfaceFilter, InterfaceStore, PageRequest};

const COLUMNS: &str = "id, name, method, url, description, post_type, params, status, \
                       environment, timeout, value_path, create_time, update_time";

pub struct PgInterfaceStore {
    pool: PgPool,
}

impl PgInterfaceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a InterfaceFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(name) = non_blank(&filter.name) {
        builder.push(" AND name LIKE ").push_bind(format!("%{}%", name));
    }
    if let Some(method) = non_blank(&filter.method) {
        builder.push(" AND UPPER(method) = ").push_bind(method.to_ascii_uppercase());
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(environment) = non_blank(&filter.environment) {
        builder.push(" AND environment = ").push_bind(environment);
    }
}

#[async_trait]
impl InterfaceStore for PgInterfaceStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<ApiInterface>, DatabaseError> {
        let sql = format!("SELECT {} FROM api_interface WHERE id = $1", COLUMNS);
        let row = sqlx::query_as::<_, ApiInterface>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_enabled_by_ids(&self, ids: &[i64]) -> Result<Vec<ApiInterface>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!(
            "SELECT {} FROM api_interface WHERE id = ANY($1) AND status = $2",
            COLUMNS
        );
        let rows = sqlx::query_as::<_, ApiInterface>(&sql)
            .bind(ids)
            .bind(INTERFACE_ENABLED)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn page(
        &self,
        filter: &InterfaceFilter,
        page: PageRequest,
    ) -> Result<(Vec<ApiInterface>, i64), DatabaseError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM api_interface");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM api_interface", COLUMNS));
        push_filters(&mut select, filter);
        select
            .push(" ORDER BY create_time DESC, id DESC LIMIT ")
            .push_bind(page.size)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows = select
            .build_query_as::<ApiInterface>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn create(&self, interface: ApiInterface) -> Result<ApiInterface, DatabaseError> {
        let sql = format!(
            "INSERT INTO api_interface \
             (name, method, url, description, post_type, params, status, environment, timeout, \
              value_path, create_time, update_time) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {}",
            COLUMNS
        );
        let row = sqlx::query_as::<_, ApiInterface>(&sql)
            .bind(&interface.name)
            .bind(&interface.method)
            .bind(&interface.url)
            .bind(&interface.description)
            .bind(&interface.post_type)
            .bind(&interface.params)
            .bind(interface.status)
            .bind(&interface.environment)
            .bind(interface.timeout)
            .bind(&interface.value_path)
            .bind(interface.create_time)
            .bind(interface.update_time)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, interface: &ApiInterface) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE api_interface SET name = $2, method = $3, url = $4, description = $5, \
             post_type = $6, params = $7, status = $8, environment = $9, timeout = $10, \
             value_path = $11, update_time = $12 WHERE id = $1",
        )
        .bind(interface.id)
        .bind(&interface.name)
        .bind(&interface.method)
        .bind(&interface.url)
        .bind(&interface.description)
        .bind(&interface.post_type)
        .bind(&interface.params)
        .bind(interface.status)
        .bind(&interface.environment)
        .bind(interface.timeout)
        .bind(&interface.value_path)
        .bind(interface.update_time)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!(
                "interface {} not found",
                interface.id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM api_interface WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
