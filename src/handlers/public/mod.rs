// handlers/public/mod.rs - Endpoints reachable without a session token
pub mod auth;
