use anyhow::Result;
use clap::Parser;
use prql_vault::core::{config, paths::PrqlPaths, token_index::TokenIndex};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "prqld", version, about = "Token index daemon for PrQL")]
struct Args {
    #[arg(long, value_name = "PATH", env = "PRQL_ROOT")]
    root: Option<PathBuf>,

    /// Pid file to write (overrides prql.toml)
    #[arg(long, value_name = "PATH")]
    pid_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let paths = PrqlPaths::resolve(args.root);
    let config = config::load(&paths.config)?;

    prql_vault::init_tracing(config.daemon.log_level.as_deref().unwrap_or("info"));

    let pid_file = args
        .pid_file
        .unwrap_or_else(|| config::pid_file(&paths, &config));
    let index = TokenIndex::new(&paths.tokens);
    prql_vault::daemon::serve(&index, &pid_file)
}
