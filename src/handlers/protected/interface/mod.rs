// handlers/protected/interface/mod.rs - Interface catalog and execution
pub mod admin;
pub mod execute;

pub use admin::{
    interface_copy, interface_create, interface_delete, interface_get, interface_list,
    interface_most_used, interface_status, interface_update,
};
pub use execute::interface_execute;
