use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, User};
use crate::database::repository::UserStore;
use crate::types::{now_millis, EntityStatus};

const COLUMNS: &str =
    "id, username, password, email, phone, status, last_login_time, create_time, update_time";

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, uid: i64) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM user_info WHERE id = $1 AND status <> $2", COLUMNS);
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(uid)
            .bind(EntityStatus::Deleted.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM user_info WHERE username = $1 AND status <> $2",
            COLUMNS
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(EntityStatus::Deleted.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create(&self, user: NewUser) -> Result<User, DatabaseError> {
        if self.find_by_username(&user.username).await?.is_some() {
            return Err(DatabaseError::Conflict(format!(
                "username {} already exists",
                user.username
            )));
        }

        let now = now_millis();
        let sql = format!(
            "INSERT INTO user_info (username, password, email, phone, status, create_time, update_time) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING {}",
            COLUMNS
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(user.status.as_str())
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn touch_last_login(&self, uid: i64, at: i64) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE user_info SET last_login_time = $2, update_time = $2 WHERE id = $1")
            .bind(uid)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_info WHERE status <> $1")
            .bind(EntityStatus::Deleted.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}
