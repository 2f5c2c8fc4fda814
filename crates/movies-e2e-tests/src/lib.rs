pub mod rest;

use std::time::Duration;

use anyhow::{Result, anyhow};
use movies_app::state::AppState;
use movies_server::{
    config::{Parser, ServerConfig},
    run::{build_state, run_with_state},
};
use rand::Rng as _;
use reqwest::Url;
use tempfile::TempDir;
use time::{Date, macros::date};
use tracing::{debug, error};

/// Evaluation date the test server is pinned to
pub const TEST_TODAY: Date = date!(2024 - 06 - 15);

fn random_port() -> Result<u16> {
    let mut rng = rand::rng();

    let mut retries = 3;
    while retries > 0 {
        let port: u16 = rng.random_range(3030..4030);
        let addr: std::net::SocketAddr = format!("127.0.0.1:{}", port).parse()?;
        match std::net::TcpStream::connect_timeout(&addr, Duration::from_millis(100)) {
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => return Ok(port),
            Err(_) => retries -= 1,
            Ok(_) => retries -= 1,
        }
    }

    Err(anyhow!("Could not find a free port"))
}

pub struct ConfigGuard {
    #[allow(dead_code)]
    data_dir: TempDir,
}

pub fn test_config(test_name: &str) -> Result<(ServerConfig, ConfigGuard)> {
    let tmp_data_dir = TempDir::with_prefix(format!("{}_", test_name))?;
    let data_dir = tmp_data_dir.path().to_string_lossy().to_string();
    let port = random_port()?.to_string();
    let base_url = format!("http://localhost:{}", port);
    let today = TEST_TODAY.to_string();
    let args = &[
        "movies-e2e-tests",
        "--data-dir",
        &data_dir,
        "--port",
        &port,
        "--base-url",
        &base_url,
        "--today",
        &today,
    ];
    let config = ServerConfig::try_parse_from(args)?;
    Ok((
        config,
        ConfigGuard {
            data_dir: tmp_data_dir,
        },
    ))
}

pub async fn prepare_env(test_name: &str) -> Result<(ServerConfig, ConfigGuard)> {
    let (args, config_guard) = test_config(test_name)?;
    debug!("Test {test_name} uses data dir {}", args.data_dir().display());
    Ok((args, config_guard))
}

async fn wait_for_server(base_url: &Url) -> Result<()> {
    let client = reqwest::Client::new();
    let health_url = base_url.join("health")?;
    for _ in 0..50 {
        match client.get(health_url.clone()).send().await {
            Ok(response) if response.status().is_success() => return Ok(()),
            _ => tokio::time::sleep(Duration::from_millis(50)).await,
        }
    }
    Err(anyhow!("Server at {base_url} did not start"))
}

/// Starts server in background task and returns its state once it responds
pub async fn spawn_server(args: ServerConfig) -> Result<AppState> {
    let base_url = args.base_url.clone();
    let state = build_state(&args).await?;
    let server_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = run_with_state(args, server_state).await {
            error!("Server error: {e}");
        }
    });
    wait_for_server(&base_url).await?;
    Ok(state)
}

pub async fn launch_env(args: ServerConfig) -> Result<(reqwest::Client, AppState)> {
    let state = spawn_server(args).await?;
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    Ok((client, state))
}

pub fn extend_url(url: &Url, segment: impl ToString) -> Url {
    let mut url = url.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(&segment.to_string());
    }
    url
}
