/// Application context and dependency injection
use crate::{
    config::ServerConfig,
    error::FedinfoResult,
    nodeinfo::{snapshot, NodeInfoResolver, SoftwareCache},
};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub cache: SoftwareCache,
    pub resolver: Arc<NodeInfoResolver>,
}

impl AppContext {
    /// Create a new application context from configuration
    ///
    /// The cache is seeded from the configured snapshot when one exists. A
    /// snapshot that cannot be read is logged and startup continues with an
    /// empty cache.
    pub async fn new(config: ServerConfig) -> FedinfoResult<Self> {
        config.validate()?;

        let cache = SoftwareCache::new(config.cache.ttl);

        match &config.cache.file {
            Some(path) => {
                info!("populating cache from {:?}", path);
                if let Err(e) = snapshot::load(&cache, path).await {
                    warn!("failed to populate cache: {}", e);
                }
            }
            None => info!("CACHE_FILE not set, starting with an empty cache"),
        }

        let resolver = Arc::new(NodeInfoResolver::new(
            cache.clone(),
            config.resolver.clone(),
        )?);

        Ok(Self {
            config: Arc::new(config),
            cache,
            resolver,
        })
    }

    /// Write the cache out to the configured snapshot file
    pub async fn persist_cache(&self) {
        let Some(path) = &self.config.cache.file else {
            return;
        };

        if let Err(e) = snapshot::save(&self.cache, path).await {
            error!("failed to write out cache: {}", e);
        }
    }
}
