pub mod execution_record;
pub mod interface;
pub mod user;

pub use execution_record::PgExecutionRecordStore;
pub use interface::PgInterfaceStore;
pub use user::PgUserStore;
