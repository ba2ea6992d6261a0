use std::net::SocketAddr;

use anyhow::Result;
use tracing::{info, warn};

use moi_sushi_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load()?;

    middleware::init_logging(&config.logging);
    middleware::init_metrics()?;

    info!(
        environment = %config.server.environment,
        "Starting Moi Sushi API v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Connections are opened lazily; readiness reports 503 until the database answers.
    let pool = persistence::db::create_pool(&config.database.pool_config())?;

    info!("Running database migrations...");
    match sqlx::migrate!("../persistence/src/migrations").run(&pool).await {
        Ok(()) => info!("Migrations completed"),
        Err(e) => warn!(error = %e, "Migrations not applied; database unreachable or out of date"),
    }

    let app = app::create_app(config.clone(), pool);

    let addr = config.socket_addr()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
