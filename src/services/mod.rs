pub mod auth_service;
pub mod execution_record_service;
pub mod interface_service;

pub use auth_service::AuthService;
pub use execution_record_service::ExecutionRecordService;
pub use interface_service::InterfaceService;

use crate::auth::AuthError;
use crate::database::DatabaseError;

/// Errors shared by the application services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}
