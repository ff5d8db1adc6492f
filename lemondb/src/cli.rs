//! Argument parsing and validation: `Args` (raw, as typed by `clap`) →
//! `EngineConfig` (validated, ready to drive `main`).
//!
//! Grounded on `examples/original_source/src/main.cpp`'s `parseArgs`/
//! `validateAndPrintThreads` (negative thread count is fatal, zero means
//! auto-detect, a missing `--listen` is only fatal in a release build), using
//! `clap`'s derive macros in place of `getopt_long`.

use std::path::PathBuf;

use clap::Parser;
use lemondb_core::error::EnvError;

#[derive(Debug, Parser)]
#[command(name = "lemondb", about = "In-memory concurrent key-value column store")]
pub struct Args {
    /// Read queries from this file instead of standard input.
    #[arg(short = 'l', long = "listen")]
    pub listen: Option<PathBuf>,

    /// Worker pool size. 0 auto-detects hardware parallelism; negative is fatal.
    #[arg(short = 't', long = "threads", default_value_t = 0)]
    pub threads: i64,

    /// Raise tracing verbosity: -v for info, -vv for debug.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Arguments after validation, with `threads` narrowed to the non-negative
/// range `WorkerPool::new` expects.
#[derive(Debug)]
pub struct EngineConfig {
    pub listen: Option<PathBuf>,
    pub threads: usize,
    pub verbose: u8,
}

impl EngineConfig {
    pub fn from_args(args: Args) -> Result<Self, EnvError> {
        if args.threads < 0 {
            return Err(EnvError::NegativeThreadCount(args.threads));
        }
        if args.listen.is_none() && !cfg!(debug_assertions) {
            return Err(EnvError::MissingListenInRelease);
        }
        if let Some(path) = &args.listen {
            if !path.is_file() {
                return Err(EnvError::ListenFileNotFound(path.clone()));
            }
        }
        Ok(Self { listen: args.listen, threads: args.threads as usize, verbose: args.verbose })
    }
}
