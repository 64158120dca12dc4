use std::net::SocketAddr;
use std::sync::Arc;
use tokedex::datasource::{HttpPriceFeed, HttpSwapRelay, PriceFeed, SwapExecutor};
use tokedex::orchestration::{spawn_price_ticker, GameService};
use tokedex::{api, config::Config, db::init_db, Repository};
use tokio::sync::Mutex;

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

    // Initialize database and dependencies
    let pool = match init_db(&config.database_path).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let repo = Repository::new(pool);
    let feed: Arc<dyn PriceFeed> = Arc::new(HttpPriceFeed::new(config.price_feed_url.clone()));
    let swaps: Arc<dyn SwapExecutor> =
        Arc::new(HttpSwapRelay::new(config.swap_relay_url.clone()));

    let mut service = GameService::new(config.clone(), feed, swaps, repo);
    if let Err(e) = service.load_from_store().await {
        eprintln!("Failed to rebuild ledger from store: {}", e);
        std::process::exit(1);
    }
    let game = Arc::new(Mutex::new(service));

    spawn_price_ticker(game.clone(), config.tick_interval_secs);

    // Create router
    let app = api::create_router(api::AppState::new(game, config));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
