//! LemonDB command line front end: argument parsing, input selection,
//! tracing setup, and final output flushing around `lemondb_core::driver`.
//!
//! Grounded on `examples/original_source/src/main.cpp`'s top-level shape
//! (validate args, open input, run to completion, flush output, exit) and on
//! `examples/clockworklabs-SpacetimeDB/crates/cli/src/main.rs`'s use of
//! `tracing-subscriber` for startup diagnostics.

mod cli;

use std::io::{Read, Write};
use std::sync::Arc;

use clap::Parser;
use lemondb_core::exec::collector::render_entry;
use lemondb_core::{driver, EngineContext, QueryManager};

use cli::{Args, EngineConfig};

#[tokio::main]
async fn main() {
    let config = match EngineConfig::from_args(Args::parse()) {
        Ok(config) => config,
        Err(err) => fatal(&err),
    };

    init_tracing(config.verbose);

    let input = match read_input(&config) {
        Ok(text) => text,
        Err(err) => fatal(&err),
    };

    tracing::info!(threads = config.threads, "starting worker pool");
    let ctx = match EngineContext::new(config.threads) {
        Ok(ctx) => Arc::new(ctx),
        Err(err) => fatal(&err),
    };

    let manager = QueryManager::new(ctx.clone());
    driver::run(&ctx, &manager, &input).await;

    flush_output(&manager);
}

fn read_input(config: &EngineConfig) -> anyhow::Result<String> {
    match &config.listen {
        Some(path) => {
            tracing::info!(?path, "reading queries from listen file");
            Ok(std::fs::read_to_string(path)?)
        }
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Writes every collected result to stdout in ascending id order, then every
/// failure message to stderr, matching spec.md §6.4/§7's "stdout flushed
/// before stderr failures" ordering.
fn flush_output(manager: &QueryManager) {
    let drained = manager.collector().drain_all();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut failures = Vec::new();
    for (id, entry) in &drained {
        let (body, failure) = render_entry(*id, entry);
        let _ = out.write_all(body.as_bytes());
        if let Some(message) = failure {
            failures.push(message);
        }
    }
    let _ = out.flush();
    drop(out);

    let mut err_out = std::io::stderr();
    for message in failures {
        let _ = err_out.write_all(message.as_bytes());
    }
    let _ = err_out.flush();
}

fn fatal(err: &(impl std::fmt::Display + ?Sized)) -> ! {
    eprintln!("lemondb: error: {err}");
    std::process::exit(-1);
}
