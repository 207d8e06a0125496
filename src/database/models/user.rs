use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::EntityStatus;

/// Administrator account (`user_info` table)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: String,
    pub last_login_time: Option<i64>,
    pub create_time: i64,
    pub update_time: i64,
}

impl User {
    /// Unrecognized stored values are treated as inactive
    pub fn status(&self) -> EntityStatus {
        self.status.parse().unwrap_or(EntityStatus::Inactive)
    }

    pub fn is_active(&self) -> bool {
        self.status() == EntityStatus::Active
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: EntityStatus,
}
