mod api;
mod clock;
mod config;
mod db;
mod engine;
mod error;
mod fixtures;
mod points;
mod scorer;
mod standings;
mod state;
mod types;

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::api::health::HealthState;
use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::db::Store;
use crate::engine::LeagueEngine;
use crate::error::Result;
use crate::scorer::catalog::{default_definitions, load_definitions};
use crate::scorer::{PrizeCatalog, StrategyRegistry};
use crate::state::StandingsCache;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Database setup ---
    let store = Store::connect(&cfg.db_path).await?;

    // --- Prize catalog: duplicate codes or unknown strategies abort startup ---
    let registry = StrategyRegistry::with_defaults();
    let definitions = match &cfg.prizes_file {
        Some(path) => {
            info!("Loading prize definitions from {path}");
            load_definitions(path)?
        }
        None => default_definitions(),
    };
    let catalog = Arc::new(PrizeCatalog::from_definitions(&registry, &definitions)?);

    // --- Engine ---
    let clock = cfg.clock_mode.build(cfg.clock_start)?;
    info!("Clock mode {} (now = {})", cfg.clock_mode, clock.now());
    let cache = StandingsCache::new();
    let engine = Arc::new(LeagueEngine::new(
        store,
        catalog,
        Arc::clone(&cache),
        clock,
        cfg.min_fixtures_to_display,
        cfg.max_standings_to_display,
    ));

    // --- Standings sweep ---
    let health = Arc::new(HealthState::new());
    cache.clear();
    let leagues = engine.standings.recalculate_all_standings().await?;
    health.set_standings_ready(true);
    info!("Startup sweep cached standings for {leagues} leagues");

    // HTTP API server
    let api_state = ApiState { engine, cache, health };
    let app = router(api_state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
