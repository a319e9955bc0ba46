use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use crate::auth::repo::{AccountStore, MemoryAccountStore, PgAccountStore};
use crate::config::{AppConfig, StoreBackend};
use crate::queries::Queries;
use crate::store::{Gateway, PgDocumentStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub gateway: Gateway,
    pub accounts: Arc<dyn AccountStore>,
    pub queries: Arc<Queries>,
    /// Present only for the Postgres backend (migrations, health).
    pub db: Option<PgPool>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        match config.store {
            StoreBackend::Postgres => {
                let url = config
                    .database_url
                    .clone()
                    .context("DATABASE_URL missing")?;
                let db = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .connect(&url)
                    .await
                    .context("connect to database")?;
                Ok(Self::with_postgres(db, config))
            }
            StoreBackend::Memory => Ok(Self::in_memory(config)),
        }
    }

    pub fn with_postgres(db: PgPool, config: AppConfig) -> Self {
        let gateway = Gateway::new(Arc::new(PgDocumentStore::new(db.clone())));
        let accounts = Arc::new(PgAccountStore::new(db.clone())) as Arc<dyn AccountStore>;
        Self::from_parts(config, gateway, accounts, Some(db))
    }

    pub fn in_memory(config: AppConfig) -> Self {
        let accounts = Arc::new(MemoryAccountStore::default()) as Arc<dyn AccountStore>;
        Self::from_parts(config, Gateway::in_memory(), accounts, None)
    }

    pub fn from_parts(
        config: AppConfig,
        gateway: Gateway,
        accounts: Arc<dyn AccountStore>,
        db: Option<PgPool>,
    ) -> Self {
        let queries = Arc::new(Queries::new(config.query.stale_after, config.query.retry));
        Self {
            config: Arc::new(config),
            gateway,
            accounts,
            queries,
            db,
        }
    }

    pub fn fake() -> Self {
        Self::in_memory(AppConfig::for_tests())
    }
}
