//! Application state wiring the data-plane's repositories and outbound
//! clients together (§4.5).

use std::sync::Arc;

use modbridge_infra::http::oauth::UpstreamAuthClient;
use modbridge_infra::http::worker_control::WorkerControlClient;
use modbridge_infra::sqlite::{
    DatabasePool, SqliteBotRepository, SqliteBotEntityRelationRepository, SqliteEntityRepository,
    SqlitePresetRepository, SqliteProfanityConfigRepository,
};
use modbridge_types::config::RefreshThrottleTuning;

#[derive(Clone)]
pub struct AppState {
    pub bots: Arc<SqliteBotRepository>,
    pub entities: Arc<SqliteEntityRepository>,
    pub relations: Arc<SqliteBotEntityRelationRepository>,
    pub presets: Arc<SqlitePresetRepository>,
    pub profanity: Arc<SqliteProfanityConfigRepository>,
    pub auth_client: Arc<UpstreamAuthClient>,
    pub worker_control: Arc<WorkerControlClient>,
    pub refresh_throttle: RefreshThrottleTuning,
}

impl AppState {
    pub fn new(
        pool: DatabasePool,
        auth_client: UpstreamAuthClient,
        refresh_throttle: RefreshThrottleTuning,
    ) -> Self {
        Self {
            bots: Arc::new(SqliteBotRepository::new(pool.clone())),
            entities: Arc::new(SqliteEntityRepository::new(pool.clone())),
            relations: Arc::new(SqliteBotEntityRelationRepository::new(pool.clone())),
            presets: Arc::new(SqlitePresetRepository::new(pool.clone())),
            profanity: Arc::new(SqliteProfanityConfigRepository::new(pool.clone())),
            auth_client: Arc::new(auth_client),
            worker_control: Arc::new(WorkerControlClient::new()),
            refresh_throttle,
        }
    }
}
