use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::security_config::SecurityConfig;
use crate::config::AppConfig;
use crate::domain::SeedSource;
use crate::services::game_flow::GameFlowService;
use crate::ws::fanout::Fanout;
use crate::ws::registry::ConnectionRegistry;

/// Shared resources handed to every request and websocket actor.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub security: SecurityConfig,
    pub registry: Arc<ConnectionRegistry>,
    pub game_flow: Arc<GameFlowService>,
}

impl AppState {
    /// Wire the registry, fan-out and coordinator from `config`.
    pub fn from_config(
        db: DatabaseConnection,
        config: &AppConfig,
        seeds: Arc<dyn SeedSource>,
    ) -> Self {
        let registry = Arc::new(ConnectionRegistry::new(config.connection_ttl));
        let fanout = Arc::new(Fanout::new(registry.clone(), config.delivery));
        let game_flow = Arc::new(GameFlowService::new(
            db.clone(),
            config.rules,
            seeds,
            config.conflict_retries,
            fanout,
        ));
        Self {
            db,
            security: SecurityConfig::new(config.jwt_secret.as_bytes()),
            registry,
            game_flow,
        }
    }
}
