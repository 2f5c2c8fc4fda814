use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::Result;
use axum::http::StatusCode;
use axum::{response::IntoResponse, routing::get, Router};
use futures::FutureExt;
use movies_app::clock::{Clock, FixedClock, SystemClock};
use movies_app::state::{AppConfig, AppState};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

pub async fn run(args: ServerConfig) -> Result<()> {
    let state = build_state(&args).await?;
    run_with_state(args, state).await
}

pub async fn run_with_state(args: ServerConfig, state: AppState) -> Result<()> {
    let shutdown = tokio::signal::ctrl_c().map(|_| ());
    run_graceful_with_state(args, state, shutdown).await
}

pub async fn run_graceful_with_state<S>(
    args: ServerConfig,
    state: AppState,
    shutdown_signal: S,
) -> Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    let mut app = main_router(state);

    if args.cors {
        app = app.layer(tower_http::cors::CorsLayer::very_permissive());
    }

    let ip: std::net::IpAddr = args.listen_address.parse()?;
    let addr = std::net::SocketAddr::from((ip, args.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}

pub fn main_router(state: AppState) -> Router<()> {
    Router::new()
        .nest("/api", movies_app::rest_api::api_router())
        .with_state(state)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let data_dir = config.data_dir();
    if !data_dir.is_dir() {
        tokio::fs::create_dir_all(&data_dir).await?;
        info!("Created data directory {}", data_dir.display());
    }

    let pool = movies_dal::new_pool(&config.database_url()).await?;
    movies_dal::migrate(&pool).await?;

    let clock: Arc<dyn Clock> = match config.today {
        Some(date) => {
            info!("Validating release dates against fixed date {date}");
            Arc::new(FixedClock(date))
        }
        None => Arc::new(SystemClock),
    };
    debug!("Application state ready");
    let app_config: AppConfig = config.into();
    Ok(AppState::with_clock(app_config, pool, clock))
}
