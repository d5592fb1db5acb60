use std::net::SocketAddr;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use solar_yield::app;
use solar_yield::config::Config;
use solar_yield::shared_state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("solar_yield=info,tower_http=info")),
        )
        .init();

    // 1. Load configuration
    let config = match Config::load_or_default() {
        Ok(c) => c,
        Err(e) => {
            error!("failed to load configuration: {e}");
            return;
        }
    };

    // 2. Resolve listen address
    let addr: SocketAddr = match format!("{}:{}", config.server.bind_address, config.server.port).parse() {
        Ok(a) => a,
        Err(e) => {
            error!(bind_address = %config.server.bind_address, "invalid listen address: {e}");
            return;
        }
    };
    info!(
        reference_lat = config.engine.reference_latitude,
        reference_lng = config.engine.reference_longitude,
        soiling_rate = config.soiling.rate_pct_per_day,
        "configuration loaded"
    );

    // 3. Start HTTP server
    let app = app(AppState::new(config));
    info!("API server listening on http://{addr}");
    info!("Scalar UI: http://{addr}/scalar");

    if let Err(e) = axum_server::bind(addr).serve(app.into_make_service()).await {
        error!("server error: {e}");
    }
}
