use farmdash::{api, config::Config, Dashboard, DashboardSettings, HttpPoolManagerFactory, StaticWallet};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;

    let factory = Arc::new(HttpPoolManagerFactory::new(
        config.aggregator_api_url.clone(),
        config.aggregator_max_retry,
    ));
    let dashboard = Dashboard::new(factory, DashboardSettings::from(&config));
    let wallet = if config.wallet_read_only {
        StaticWallet::read_only(config.wallet_network.clone(), Some(config.wallet_address.clone()))
    } else {
        StaticWallet::new(config.wallet_network.clone(), Some(config.wallet_address.clone()))
    };

    let app = api::create_router(api::AppState::new(dashboard, wallet));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Dashboard API listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
