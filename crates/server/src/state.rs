use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use std::sync::Arc;
use vofp::{BackendConfig, OriginalityPipeline, VofpConfig};

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Decision pipeline (shared across requests)
    pub pipeline: Arc<OriginalityPipeline>,
}

impl ServerState {
    /// Build the production pipeline described by `config`.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let pipeline_cfg = match &config.pipeline_config {
            Some(path) => VofpConfig::from_file(path)
                .map_err(|e| ServerError::Config(format!("{path}: {e}")))?,
            None => VofpConfig::default(),
        };
        let backend = match &config.db_path {
            Some(path) => BackendConfig::redb(path.clone()),
            None => pipeline_cfg.index.backend_config(),
        };
        let pipeline = OriginalityPipeline::from_config_with_backend(&pipeline_cfg, &backend)?;
        Ok(Self::with_pipeline(config, pipeline))
    }

    /// Wrap an already assembled pipeline.
    pub fn with_pipeline(config: ServerConfig, pipeline: OriginalityPipeline) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
        }
    }
}
