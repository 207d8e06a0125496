// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (session token required)
pub mod protected;
pub mod public;
