//! MargaNav - obstacle-visit motion planner.
//!
//! Reads a planning request (obstacle set, mode, strategy) from a JSON
//! file, plans the full visit, and prints the simulator trace or live
//! command stream as JSON on stdout.

use std::path::Path;

use marga_nav::config::MargaConfig;
use marga_nav::error::{MargaError, Result};
use marga_nav::request::{self, PlanRequest};

use tracing::info;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("marga_nav=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    let mut config = if args.len() > 1 && !args[1].starts_with("--") {
        // Load config from file
        let config_path = Path::new(&args[1]);
        info!("Loading configuration from {:?}", config_path);
        MargaConfig::load(config_path)?
    } else if Path::new("marga.toml").exists() {
        info!("Loading configuration from marga.toml");
        MargaConfig::load(Path::new("marga.toml"))?
    } else {
        info!("Using default configuration");
        MargaConfig::default()
    };

    if args.iter().any(|a| a == "--outdoor") {
        info!("Using outdoor calibration profile");
        config.environment = marga_nav::config::Environment::Outdoor;
    }

    let request_path = args
        .iter()
        .position(|a| a == "--request")
        .and_then(|i| args.get(i + 1))
        .ok_or_else(|| MargaError::Input("missing --request <file.json>".into()))?;

    info!("MargaNav v{}", env!("CARGO_PKG_VERSION"));
    info!("Reading request from {}", request_path);

    let content = std::fs::read_to_string(request_path)?;
    let request: PlanRequest = serde_json::from_str(&content)?;
    info!(
        obstacles = request.obstacles.len(),
        mode = ?request.mode,
        algorithm = ?request.algorithm,
        "planning"
    );

    let started = std::time::Instant::now();
    let response = request::run(&request, &config)?;
    info!(elapsed_ms = started.elapsed().as_millis() as u64, "plan complete");

    println!(
        "{}",
        serde_json::to_string_pretty(&response)
            .map_err(|e| MargaError::Config(e.to_string()))?
    );
    Ok(())
}
