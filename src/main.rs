use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gradewarrior::api::router;
use gradewarrior::config::AppConfig;
use gradewarrior::gateway::{GradeGateway, GraphqlGateway, InMemoryGateway};
use gradewarrior::services::CourseSynchronizer;
use gradewarrior::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "gradewarrior=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let gateway: Arc<dyn GradeGateway> = match &config.graphql {
        Some(graphql) => {
            info!("using GraphQL endpoint {}", graphql.endpoint);
            Arc::new(GraphqlGateway::new(graphql.clone())?)
        }
        None => {
            warn!("GRAPHQL_ENDPOINT is not set, keeping courses in memory");
            Arc::new(InMemoryGateway::new())
        }
    };

    let sync = CourseSynchronizer::new(gateway, config.debounce);
    match sync.refresh().await {
        Ok(count) => info!("loaded {} courses", count),
        Err(e) => warn!("initial course load failed: {}", e),
    }

    let app = router(AppState { sync: sync.clone() });

    info!("listening on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let report = sync.handle_sync_now().await;
    if report.still_pending > 0 {
        warn!("{} changes could not be synced before exit", report.still_pending);
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutting down, flushing pending changes");
}
