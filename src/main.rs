use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recommender_proxy::{
    Config,
    handlers::{AppState, create_router},
    lookup::{RecommenderScript, TabixCli},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppState {
        lookup: Arc::new(TabixCli::new(&config.tabix_bin, config.byte_limit)?),
        recommender: Arc::new(RecommenderScript::new(
            &config.recommender_script,
            config.byte_limit,
        )?),
        work_dir: config.work_dir.clone(),
        cors: config.cors,
    };

    let app = create_router(state);

    let addr = config.bind_addr();
    tracing::info!("Starting recommender-proxy on {}", addr);
    tracing::info!("tabix: {:?}, recommender: {:?}", config.tabix_bin, config.recommender_script);
    tracing::info!("Working directory root: {:?}, byte limit: {}", config.work_dir, config.byte_limit);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
