//! Forum server: loads settings from the environment (and `.env`), builds the
//! store, and serves topics and posts under `/api`.
//!
//! Run from repo root: `cargo run -p forum-server`
//! Without a database: `STORE_BACKEND=memory cargo run -p forum-server`

use forum_api::{app, ensure_database_exists, AppState, Settings, StoreBackend};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("forum_api=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;

    let state = match settings.backend {
        StoreBackend::Postgres => {
            ensure_database_exists(&settings.database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .connect(&settings.database_url)
                .await?;
            AppState::postgres(pool, &settings)
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-process store; data is lost on exit");
            AppState::memory(&settings)
        }
    };

    if settings.init_tables || settings.backend == StoreBackend::Memory {
        state.initialize_tables().await?;
    }

    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        backend = ?settings.backend,
        id_policy = ?settings.id_policy,
        "forum server listening"
    );
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
