//! durakv Demo Binary
//!
//! The fixed external caller: opens a store from a log path, issues a small
//! sequence of operations, and prints the results. Run it twice against the
//! same log to watch recovery reproduce the final state.

use std::path::Path;

use clap::Parser;
use durakv::{DuraError, Store};
use tracing_subscriber::{fmt, EnvFilter};

/// durakv demo
#[derive(Parser, Debug)]
#[command(name = "durakv-demo")]
#[command(about = "Durable key-value store demo")]
#[command(version)]
struct Args {
    /// Path of the write-ahead log file
    #[arg(short, long, default_value = "./durakv.log")]
    log_path: String,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,durakv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let args = Args::parse();

    tracing::info!("durakv v{}", durakv::VERSION);
    tracing::info!("Log path: {}", args.log_path);

    if let Err(e) = run(Path::new(&args.log_path)) {
        tracing::error!("demo failed: {}", e);
        std::process::exit(1);
    }
}

fn run(log_path: &Path) -> durakv::Result<()> {
    let store = Store::open_path(log_path)?;

    store.put("name", "Drew")?;
    store.put("role", "Engineer")?;
    store.delete("role")?;

    println!("name = {}", store.get("name")?);

    match store.get("role") {
        Ok(value) => println!("role = {}", value),
        Err(DuraError::KeyNotFound) => println!("role: key not found"),
        Err(e) => return Err(e),
    }

    store.close()
}
