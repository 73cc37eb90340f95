use axum::{routing::get, Router};
use callbridge::{
    config::AppConfig,
    event::EventBus,
    online::{self, GameService, InMemoryGameRepository, LifecycleController},
    scoring::{
        self, FileLocalStore, InMemoryHistoryRepository, InMemoryLocalStore, LocalStore,
        ScoringService,
    },
    shared::AppState,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "callbridge=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(AppConfig::from_env()).await {
        error!(error = %e, "Server exited with an error");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(?config, "Starting Call Bridge server");

    let local_store: Arc<dyn LocalStore> = match &config.scoresheet_dir {
        Some(dir) => Arc::new(FileLocalStore::open(dir).await?),
        None => Arc::new(InMemoryLocalStore::new()),
    };
    let scoring_service = Arc::new(ScoringService::new(
        local_store,
        Arc::new(InMemoryHistoryRepository::new()),
    ));

    let games = GameService::new(
        Arc::new(InMemoryGameRepository::new()),
        EventBus::new(config.event_channel_capacity),
        config.txn_max_attempts,
    );
    let lifecycle = Arc::new(LifecycleController::new(games.clone(), config.trick_pause));

    let config = Arc::new(config);
    let app_state = AppState::new(games, lifecycle.clone(), scoring_service, config.clone());

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/games", online::handlers::router())
        .nest("/scoring", scoring::handlers::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown signal received");
        })
        .await?;

    lifecycle.shutdown().await;
    info!("Server stopped");
    Ok(())
}
