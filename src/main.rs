/// fedinfo - NodeInfo software lookup service
use fedinfo::{config::ServerConfig, context::AppContext, error::FedinfoResult, server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> FedinfoResult<()> {
    // Load configuration first so it can drive the log filter
    let config = ServerConfig::from_env()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(config.logging.env_filter())
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("fedinfo v{}", env!("CARGO_PKG_VERSION"));

    // Create application context, seeding the cache from its snapshot
    let ctx = AppContext::new(config).await?;

    // Serve until interrupted
    let result = server::serve(ctx.clone()).await;

    // The snapshot is written even when serving failed
    ctx.persist_cache().await;

    result
}
