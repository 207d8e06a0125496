pub mod api_interface;
pub mod execution_record;
pub mod user;

pub use api_interface::{ApiInterface, ApiParam, SelectOption, INTERFACE_DISABLED, INTERFACE_ENABLED};
pub use execution_record::{ExecutionAggregate, ExecutionRecord, NewExecutionRecord};
pub use user::{NewUser, User};
