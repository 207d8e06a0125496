use std::sync::Arc;
use std::time::Duration;

use crate::cache::{MemoryTokenStore, TokenStore};
use crate::config::AppConfig;
use crate::database::memory::{MemoryExecutionRecordStore, MemoryInterfaceStore, MemoryUserStore};
use crate::database::postgres::{PgExecutionRecordStore, PgInterfaceStore, PgUserStore};
use crate::database::{Database, ExecutionRecordStore, InterfaceStore, UserStore};
use crate::executor::{ExecutionRecorder, Executor, HttpInvoker, InvokeError};
use crate::services::{AuthService, ExecutionRecordService, InterfaceService};

/// Store implementations behind the service layer
#[derive(Clone)]
pub struct Stores {
    pub interfaces: Arc<dyn InterfaceStore>,
    pub records: Arc<dyn ExecutionRecordStore>,
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<dyn TokenStore>,
}

impl Stores {
    pub fn memory() -> Self {
        Self {
            interfaces: Arc::new(MemoryInterfaceStore::new()),
            records: Arc::new(MemoryExecutionRecordStore::new()),
            users: Arc::new(MemoryUserStore::new()),
            tokens: Arc::new(MemoryTokenStore::new()),
        }
    }

    /// Tokens stay in-process; everything else is PostgreSQL
    pub fn postgres(database: &Database) -> Self {
        let pool = database.pool().clone();
        Self {
            interfaces: Arc::new(PgInterfaceStore::new(pool.clone())),
            records: Arc::new(PgExecutionRecordStore::new(pool.clone())),
            users: Arc::new(PgUserStore::new(pool)),
            tokens: Arc::new(MemoryTokenStore::new()),
        }
    }
}

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// `None` when running on in-memory stores
    pub database: Option<Database>,
    pub auth: AuthService,
    pub interfaces: InterfaceService,
    pub records: ExecutionRecordService,
    pub executor: Executor,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        stores: Stores,
        database: Option<Database>,
    ) -> Result<Self, InvokeError> {
        let invoker = HttpInvoker::new(Duration::from_secs(config.executor.default_timeout_secs))?;
        let recorder = ExecutionRecorder::new(stores.records.clone());

        Ok(Self {
            auth: AuthService::new(stores.users.clone(), stores.tokens.clone(), config.clone()),
            interfaces: InterfaceService::new(
                stores.interfaces.clone(),
                stores.records.clone(),
                config.clone(),
            ),
            records: ExecutionRecordService::new(
                stores.records.clone(),
                stores.interfaces.clone(),
                config.clone(),
            ),
            executor: Executor::new(stores.interfaces, stores.users, invoker, recorder),
            config,
            database,
        })
    }
}
