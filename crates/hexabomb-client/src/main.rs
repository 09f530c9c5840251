//! Hexabomb player bot for netorcai servers.

use hexabomb_core::{RandomStrategy, Session};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod connection;
mod protocol;

use config::ClientConfig;
use connection::Connection;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env()?;

    if let Err(e) = play(&config).await {
        error!("Failure: {}", e);
        return Err(e);
    }
    Ok(())
}

async fn play(config: &ClientConfig) -> anyhow::Result<()> {
    info!("Connecting to {}...", config.server);
    let mut conn = Connection::connect(config.server.as_str()).await?;
    conn.login(&config.nickname, "player").await?;

    let strategy = match config.seed {
        Some(seed) => RandomStrategy::with_seed(seed),
        None => RandomStrategy::new(),
    };
    let mut session = Session::new(strategy);

    info!("Waiting for GAME_STARTS...");
    let summary = session.run(&mut conn).await?;
    info!(
        turns_played = summary.turns_played,
        winner = ?summary.winner,
        "done"
    );
    Ok(())
}
