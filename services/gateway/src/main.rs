mod auth;
mod error;
mod handlers;
mod models;
mod router;
mod settings;
mod state;

use router::create_router;
use settings::Settings;
use state::AppState;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting Book Market gateway");

    let settings = Settings::load()?;
    let owner = settings.owner_address()?;
    let state = AppState::new(owner, settings.marketplace.clone())?;

    let app = create_router(state);

    // Bind and serve
    let addr = settings.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
