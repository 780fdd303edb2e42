//! PrQL credential store.
//!
//! Issues opaque access tokens that map to database credentials, stores them
//! in line-oriented pool files, and resolves them in the daemon through an
//! atomically refreshed in-memory index.
//!
//! ## Modules
//! - `cli`: Command-line handlers for `prql`
//! - `core`: Record codec, pools, token index, token lifecycle
//! - `daemon`: Reload loop for `prqld`
//! - `models`: Token, host, and config data structures
//! - `util`: Obfuscation, prompt, signalling, filesystem helpers

pub mod cli;
pub mod constants;
pub mod core;
pub mod daemon;
pub mod models;
pub mod util;

use tracing_subscriber::EnvFilter;

/// Install the stderr tracing subscriber. `PRQL_LOG` overrides `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_env(constants::LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
