// handlers/protected/mod.rs - Handlers behind jwt_auth_middleware
//
// Every handler here can rely on an `AuthUser` request extension.
pub mod auth;
pub mod execution_record;
pub mod interface;
