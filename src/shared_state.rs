use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::Config;
use crate::services::engine::EngineSettings;

/// Read-only state shared by every handler. The engine itself is stateless,
/// so nothing here is ever mutated after startup.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: Arc<EngineSettings>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let engine = Arc::new(config.engine_settings());
        Self { config: Arc::new(config), engine }
    }
}

impl FromRef<AppState> for Arc<EngineSettings> {
    fn from_ref(state: &AppState) -> Self {
        state.engine.clone()
    }
}

impl FromRef<AppState> for Arc<Config> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
