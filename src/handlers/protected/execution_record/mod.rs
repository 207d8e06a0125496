// handlers/protected/execution_record/mod.rs - Execution history queries
pub mod record;

pub use record::{
    record_cleanup, record_count, record_get, record_list, records_by_executor, record_stats,
};
