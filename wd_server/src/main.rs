//! Wager duel server.
//!
//! Runs a single two-player match behind a duel actor and serves it over
//! HTTP and WebSocket, together with the static client.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Error;
use pico_args::Arguments;
use tracing::{error, info};
use wager_duel::duel::DuelActor;
use wd_server::{
    api::{self, AppState},
    config::ServerConfig,
    logging, metrics,
};

const HELP: &str = "\
Run a two-player wager duel server

USAGE:
  wd_server [OPTIONS]

OPTIONS:
  --bind        IP:PORT    Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:3000]
  --static-dir  PATH       Directory of client files   [default: env STATIC_DIR or public]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND                  Server bind address (e.g., 0.0.0.0:8080)
  STATIC_DIR                   Directory of client files
  METRICS_BIND                 Prometheus exporter address (disabled when unset)
  ROUND_SPEED                  normal (60s), turbo (30s) or hyper (10s)
  MATCH_STARTING_BALANCE       Units each player starts with
  MATCH_MIN_WAGER              Smallest accepted wager
  MATCH_BANKRUPTCY_THRESHOLD   A balance below this ends the match
  MATCH_DISPARITY_MULTIPLIER   Wager ratio above which the lower wager wins
  MATCH_DOUBLE_TIMEOUT_LIMIT   Consecutive double timeouts that end the match
  RECONNECT_GRACE_SECS         Seconds a dropped seat is held (0 disables)
  RUST_LOG                     Log filter
";

struct Args {
    bind: Option<SocketAddr>,
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        static_dir: pargs.opt_value_from_str("--static-dir")?,
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.static_dir)?;
    config.validate()?;

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(|e| anyhow::anyhow!(e))?;
        info!("Metrics exporter listening on {}", metrics_bind);
    }

    info!(
        "Match '{}': {} speed, {} units each, minimum wager {}",
        config.duel.name, config.duel.speed, config.duel.starting_balance, config.duel.min_wager
    );

    let (actor, duel) = DuelActor::new(config.duel.clone());
    let actor_task = tokio::spawn(actor.run());

    let app = api::create_router(AppState {
        duel: duel.clone(),
        static_dir: config.static_dir.clone(),
    });

    info!("Starting HTTP/WebSocket server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");
    if let Err(e) = duel.close().await {
        error!("Failed to close duel: {}", e);
    }
    let _ = actor_task.await;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
}
