use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::info;

use cadencea_core::config::Settings;
use cadencea_core::mailer::Mailer;

mod error;
mod middleware;
mod routes;
mod state;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let settings = Settings::from_env()?;

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&settings.database_url)
        .await?;

    sqlx::migrate!("../../migrations").run(&db).await?;

    let mailer = Arc::new(Mailer::new(&settings)?);

    let state = AppState {
        db,
        mailer,
        settings: Arc::new(settings.clone()),
    };

    let app = Router::new()
        .merge(routes::health_router(state.clone()))
        .merge(routes::v1_router(state.clone()))
        .layer(axum::middleware::from_fn(middleware::request_id::request_id));

    let addr: SocketAddr = settings.api_bind.parse()?;
    info!(%addr, env = %settings.app_env, "starting api");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
