//! relay-hub server entry point.
//!
//! Starts the coordinator and the Axum HTTP server with the WebSocket
//! endpoint and static front-end.

use tracing_subscriber::EnvFilter;

use relay_hub::api;
use relay_hub::app_state::AppState;
use relay_hub::config::RelayConfig;
use relay_hub::hub::Hub;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing; LOG_FORMAT=json switches to one JSON object per line
    let subscriber = tracing_subscriber::fmt().with_env_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    );
    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    // Load configuration
    let config = RelayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting relay-hub");

    // Start the coordinator
    let hub = Hub::spawn(config.hub_queue_capacity);

    // Build router
    let state = AppState::new(hub, &config);
    let app = api::build_app(state, &config.static_dir);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(
        addr = %config.listen_addr,
        static_dir = %config.static_dir.display(),
        "server listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
