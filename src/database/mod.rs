pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

pub use manager::{Database, DatabaseError};
pub use repository::{
    ExecutionRecordStore, InterfaceFilter, InterfaceStore, PageRequest, RecordFilter, UserStore,
};
