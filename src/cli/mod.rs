//! CLI routing and command dispatch.

use crate::constants;
use crate::core::{config, file_lock::FileLock, paths::PrqlPaths};
use crate::models::config::PrqlConfig;
use crate::util::obfuscate::XorObfuscator;
use crate::util::signal::PidFileNotifier;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod hosts;
pub mod init;
pub mod tokens;

/// Shared context passed to all command handlers.
pub struct CliContext {
    pub paths: PrqlPaths,
    pub config: PrqlConfig,
    pub non_interactive: bool,
}

impl CliContext {
    /// Serialize mutating commands across processes.
    pub fn writer_lock(&self) -> Result<FileLock> {
        crate::util::fs::ensure_dir(&self.paths.root, constants::ROOT_DIR_MODE)?;
        FileLock::exclusive(&self.paths.lock)
    }

    pub fn obfuscator(&self) -> Result<XorObfuscator> {
        XorObfuscator::new(&self.config.security.obfuscation_key)
    }

    pub fn notifier(&self) -> PidFileNotifier {
        PidFileNotifier::new(config::pid_file(&self.paths, &self.config))
    }
}

#[derive(Parser, Debug)]
#[command(name = "prql", version, about = "Manage PrQL tokens and database hosts")]
pub struct Cli {
    #[arg(long, global = true, value_name = "PATH", env = "PRQL_ROOT")]
    pub root: Option<PathBuf>,

    /// Run in non-interactive mode (no prompts, suitable for automation)
    #[arg(long, global = true, env = "PRQL_NON_INTERACTIVE")]
    pub non_interactive: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let paths = PrqlPaths::resolve(self.root);

        // Best-effort: an unreadable config should not block read-only commands.
        let config = match config::load(&paths.config) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "using default configuration");
                PrqlConfig::default()
            }
        };

        let ctx = CliContext {
            paths,
            config,
            non_interactive: self.non_interactive,
        };

        match self.command {
            Commands::Init(args) => init::run(&ctx, args),
            Commands::Tokens { command } => tokens::run(&ctx, command),
            Commands::Hosts { command } => hosts::run(&ctx, command),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the state directory and a default prql.toml
    Init(init::InitArgs),
    /// Generate, delete, or view all PrQL tokens
    Tokens {
        #[command(subcommand)]
        command: tokens::TokensCommand,
    },
    /// Register, delete, or view database hosts
    Hosts {
        #[command(subcommand)]
        command: hosts::HostsCommand,
    },
}
