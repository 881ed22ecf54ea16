//! Arena ranking service entry point.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use arena_core::RankingServiceConfig;
use arena_ranking::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = load_config()?;
    init_logging(&config.http.log_level);
    config.validate()?;

    tracing::info!("initializing ranking service");
    let pool = arena_db::init(&config.database).await?;

    let addr = config.http.listen_addr.clone();
    let state = Arc::new(AppState::new(pool, config));
    arena_ranking::start_server(state, &addr).await?;

    tracing::info!("ranking service shutdown complete");
    Ok(())
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{default_level},sqlx=warn")));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

fn load_config() -> anyhow::Result<RankingServiceConfig> {
    let config_path = env::var("ARENA_RANKING_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("ranking.toml"));

    let mut config = if config_path.exists() {
        RankingServiceConfig::from_file(&config_path)?
    } else {
        RankingServiceConfig::default()
    };
    config.apply_env();
    Ok(config)
}
