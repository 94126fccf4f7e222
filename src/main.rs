//! Lamad Paths Daemon
//!
//! Serves learning paths, enrollments and progress over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! # Start with defaults
//! lamad-paths
//!
//! # Start with custom config
//! lamad-paths --config /path/to/config.toml
//!
//! # Custom port and storage directory
//! lamad-paths --http-port 8093 --storage-dir /data/paths
//!
//! # Throwaway instance seeded from a JSON file
//! lamad-paths --in-memory --seed seed.json
//! ```

use anyhow::Context;
use clap::Parser;
use lamad_paths::seed::load_seed_file;
use lamad_paths::{Config, HttpServer, PathDb, Services};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lamad-paths")]
#[command(about = "Learning path enrollment and progress service")]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Storage directory
    #[arg(long, env = "LAMAD_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,

    /// HTTP API port
    #[arg(long, env = "LAMAD_HTTP_PORT")]
    http_port: Option<u16>,

    /// JSON seed file loaded before serving
    #[arg(long, env = "LAMAD_SEED_FILE")]
    seed: Option<PathBuf>,

    /// Use an in-memory database (nothing is written to disk)
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("lamad_paths=info".parse()?))
        .init();

    let args = Args::parse();

    // Load config
    let mut config = if let Some(config_path) = &args.config {
        Config::load(config_path)
            .with_context(|| format!("loading config from {}", config_path.display()))?
    } else {
        Config::default()
    };

    // Apply CLI overrides
    if let Some(dir) = args.storage_dir {
        config.storage_dir = dir;
    }
    if let Some(port) = args.http_port {
        config.http_port = port;
    }
    if let Some(seed) = args.seed {
        config.seed_file = Some(seed);
    }

    info!(
        storage_dir = %config.storage_dir.display(),
        http_port = config.http_port,
        in_memory = args.in_memory,
        "Starting lamad-paths"
    );

    let db = if args.in_memory {
        PathDb::open_in_memory()?
    } else {
        // Ensure storage directory exists
        tokio::fs::create_dir_all(&config.storage_dir).await?;

        // Save default config if it doesn't exist
        let config_path = config.config_path();
        if !config_path.exists() {
            config.save(&config_path)?;
            info!(path = %config_path.display(), "Created default config");
        }

        PathDb::open(&config.database_path())?
    };
    let db = Arc::new(db);

    if let Some(seed_file) = &config.seed_file {
        let result = load_seed_file(&db, seed_file)
            .with_context(|| format!("loading seed file {}", seed_file.display()))?;
        for err in &result.errors {
            error!("  seed: {}", err);
        }
    }

    let services = Arc::new(Services::new(db.clone(), config.recommendation_limit));

    let http_addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let http_server = Arc::new(HttpServer::new(services, http_addr));

    info!("HTTP API available at http://{}", http_addr);
    info!("Endpoints:");
    info!("  GET  /health                      - Health check");
    info!("  POST /paths                       - Create a path");
    info!("  POST /paths/enroll                - Enroll a user");
    info!("  GET  /paths/enrolled?user_id=     - Enrolled paths");
    info!("  GET  /paths/recommended?user_id=  - Recommended paths");
    info!("  GET  /paths/{{id}}?user_id=         - Path detail");
    info!("  POST /paths/{{id}}/progress?user_id= - Record progress");
    info!("Press Ctrl+C to stop.");

    // Handle shutdown signal
    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutting down...");
    };

    tokio::select! {
        result = http_server.run() => {
            if let Err(e) = result {
                error!(error = %e, "HTTP server error");
            }
        }
        _ = shutdown => {}
    }

    // Print stats before exit
    if let Ok(stats) = db.stats() {
        info!(
            users = stats.user_count,
            paths = stats.path_count,
            enrollments = stats.enrollment_count,
            "Final database stats"
        );
    }

    Ok(())
}
