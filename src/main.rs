use std::path::Path;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chainwire::config::Config;
use chainwire::routes::{self, AppState};

const CONFIG_PATH: &str = "chainwire.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chainwire=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration, falling back to the built-in source set
    let config = if Path::new(CONFIG_PATH).exists() {
        Config::load(CONFIG_PATH)?
    } else {
        info!("no {} found, using built-in defaults", CONFIG_PATH);
        Config::default()
    };
    info!("Configured {} feed sources", config.sources.len());

    let bind = config.bind.clone();
    let state = Arc::new(AppState::new(config));
    let app = routes::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Server starting on http://{}", bind);

    axum::serve(listener, app).await?;

    Ok(())
}
