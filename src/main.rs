use std::sync::Arc;

use color_eyre::eyre::{Result, eyre};
use dotenv::dotenv;
use tracing::info;

use tutormatch_api::{
    ApiState,
    config::{ApiConfig, StoreBackend},
};
use tutormatch_db::{MatchStore, MemoryStore, PgStore, create_pool, schema::initialize_database};
use tutormatch_engine::{EngineConfig, MatchEngine, Notifier, TracingSink};

async fn open_store(config: &ApiConfig) -> Result<Arc<dyn MatchStore>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| eyre!("DATABASE_URL must be set for the postgres backend"))?;
            let pool = create_pool(database_url, config.database_max_connections).await?;
            initialize_database(&pool).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    let config = ApiConfig::from_env()?;
    tutormatch_api::init_tracing(config.log_level)?;
    let engine_config = EngineConfig::from_env()?;

    let store = open_store(&config).await?;
    info!(backend = %config.store_backend, "match store ready");

    // Notifications are delivered off the request path
    let (notifier, queue) = Notifier::channel();
    queue.spawn(Arc::new(TracingSink));

    let engine = Arc::new(MatchEngine::new(store, notifier, engine_config));
    tutormatch_api::start_server(config, Arc::new(ApiState { engine })).await?;

    Ok(())
}
