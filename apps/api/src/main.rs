use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cvsift_api::config::Config;
use cvsift_api::ingest::PdfExtractBackend;
use cvsift_api::llm_client::LlmClient;
use cvsift_api::routes::build_router;
use cvsift_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("cvsift_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cvsift API v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::new(&config.llm)?;
    info!(
        "Assessment backend: model {} at {}",
        llm.model(),
        llm.endpoint()
    );

    let state = AppState::new(config.clone(), Arc::new(llm), Arc::new(PdfExtractBackend));

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the UI host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
