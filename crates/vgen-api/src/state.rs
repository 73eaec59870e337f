//! Application state.

use std::sync::Arc;

use vgen_db::{DownloadLedger, VideoCatalog};
use vgen_pipeline::{PollOrchestrator, PollPolicy};
use vgen_stability::StabilityClient;
use vgen_store::ArtifactStore;

use crate::config::ApiConfig;

/// Shared application state.
///
/// Everything here is constructed once at startup and passed down; the
/// catalog pool is the only shared mutable resource and it is bounded.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub catalog: VideoCatalog,
    pub downloads: DownloadLedger,
    pub store: ArtifactStore,
    pub stability: StabilityClient,
    pub orchestrator: Arc<PollOrchestrator<StabilityClient, VideoCatalog>>,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let pool = vgen_db::create_pool(&config.database_url, config.max_db_connections).await?;
        vgen_db::run_migrations(&pool).await?;

        let catalog = VideoCatalog::new(pool.clone());
        let downloads = DownloadLedger::new(pool);
        let store = ArtifactStore::new(config.video_dir.clone());
        let stability = StabilityClient::from_env()?;

        let orchestrator = Arc::new(PollOrchestrator::new(
            stability.clone(),
            store.clone(),
            catalog.clone(),
            PollPolicy::from_env(),
        ));

        Ok(Self {
            config,
            catalog,
            downloads,
            store,
            stability,
            orchestrator,
        })
    }
}
