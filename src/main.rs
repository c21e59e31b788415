//! OpenSASE COD Analytics - KPI and projection service

use anyhow::Result;
use opensase_cod_analytics::{http::{router, AppState}, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = Config::from_env()?;
    let addr = config.bind_addr();
    tracing::info!(buffer = config.default_buffer_multiplier, max_body_bytes = config.max_body_bytes, "configuration loaded");

    let app = router(AppState::new(config));
    tracing::info!("🚀 OpenSASE COD Analytics listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
