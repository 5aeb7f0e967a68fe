use anyhow::Context;
use dotenvy::dotenv;
use hostelbyte::logging::{init_tracing, shutdown_tracer};
use hostelbyte::metrics::{init_metrics, metrics_app};
use hostelbyte::router::init_router;
use hostelbyte::state::init_app_state;
use hostelbyte_config::ServerConfig;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing().context("Failed to initialize logging")?;

    let metrics_handle = init_metrics();
    let state = init_app_state().await?;

    sqlx::migrate!("./migrations")
        .run(state.store.pool())
        .await
        .context("Failed to run database migrations")?;

    let mut app = init_router(state);
    if let Some(handle) = metrics_handle {
        app = app.merge(metrics_app(handle));
    }

    let server_config = ServerConfig::from_env();
    let address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!(%address, "Server running");
    info!("Swagger UI available at /swagger-ui, Scalar at /scalar");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    shutdown_tracer();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
