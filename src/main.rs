//! Mem Cache driver
//!
//! Runs JSON-lines cache commands from stdin against one cache instance and
//! writes a JSON reply per command to stdout.

use std::io;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mem_cache::driver::run_session;
use mem_cache::{CacheConfig, MemCache};

/// Main entry point for the cache driver.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging (stderr, stdout carries replies)
/// 2. Load configuration from environment variables
/// 3. Create the cache
/// 4. Execute commands until stdin closes
fn main() -> Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mem_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: limit={:?}, time_out={}ms, cache_log={}",
        config.limit, config.time_out, config.cache_log
    );

    let mut cache = MemCache::new(config);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let summary = run_session(&mut cache, stdin.lock(), stdout.lock())?;

    info!(
        "Session finished: {} commands, {} failures, {} entries cached",
        summary.commands,
        summary.failures,
        cache.len()
    );
    Ok(())
}
