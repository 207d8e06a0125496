pub mod auth;
pub mod client_info;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use client_info::ClientInfo;
pub use response::{ApiResponse, ApiResult, IntoApiResponse};
