use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use outfit_advisor::{
    build_app,
    config::{Config, mask},
    logging::init_logging,
    models::AppState,
    pipeline::Pipeline,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Keep guard alive so file logger flushes correctly
    let _log_guards = init_logging(&config);

    // Log all configuration (mask sensitive values)
    tracing::info!("=== Configuration ===");
    tracing::info!("Bind address: {}", config.bind);
    tracing::info!("Log file: {}", config.log_file.display());
    tracing::info!("CORS origins: {}", config.cors_origins().join(", "));
    tracing::info!("Max upload: {} bytes", config.max_upload_bytes);
    tracing::info!("Gemini API key: {}", mask(config.gemini_api_key.as_ref()));
    tracing::info!("Vision endpoint: {}", config.vision_endpoint);
    tracing::info!("Image API key: {}", mask(config.image_api_key().as_ref()));
    tracing::info!("Image endpoint: {}", config.image_endpoint);
    tracing::info!("Search API key: {}", mask(config.search_api_key.as_ref()));
    tracing::info!(
        "Search engine id: {}",
        mask(config.search_engine_id.as_ref())
    );
    tracing::info!("Search endpoint: {}", config.search_endpoint);
    tracing::info!(
        "Search site: {}",
        if config.search_site.is_empty() {
            "<any>"
        } else {
            config.search_site.as_str()
        }
    );
    tracing::info!(
        "Timeouts: vision {}s, image {}s, search {}s",
        config.vision_timeout_secs,
        config.image_timeout_secs,
        config.search_timeout_secs
    );
    tracing::info!("====================");

    let http = reqwest::Client::builder()
        .user_agent(concat!("outfit-advisor/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let state = AppState {
        pipeline: Arc::new(Pipeline::from_config(&config, &http)),
        config: config.clone(),
    };

    let app = build_app(state);

    let listener = TcpListener::bind(config.bind).await?;
    tracing::info!("listening on {}", config.bind);
    axum::serve(listener, app).await?;
    Ok(())
}
