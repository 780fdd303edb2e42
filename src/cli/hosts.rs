//! `prql hosts`. Host changes do not signal the daemon, which only indexes tokens.

use crate::cli::CliContext;
use crate::constants;
use crate::core::pools::{HostPool, TokenKind, TokenPool};
use crate::models::host::HostEntry;
use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};

#[derive(Subcommand, Debug)]
pub enum HostsCommand {
    /// List registered database hosts
    List(HostListArgs),
    /// Register a database host
    New(HostNewArgs),
    /// Remove database hosts by name
    Remove(HostRemoveArgs),
}

#[derive(Args, Debug)]
pub struct HostListArgs {
    /// Output format: table|json
    #[arg(long, default_value = "table")]
    pub format: String,
}

#[derive(Args, Debug)]
pub struct HostNewArgs {
    /// Name tokens use to refer to this host
    #[arg(short, long)]
    pub name: String,

    /// Hostname or IPv4 address of the database server
    #[arg(short, long)]
    pub address: String,

    /// Database server port
    #[arg(short, long, default_value_t = constants::DEFAULT_DB_PORT)]
    pub port: u16,
}

#[derive(Args, Debug)]
pub struct HostRemoveArgs {
    /// Host names to remove
    #[arg(required = true, value_name = "NAME")]
    pub names: Vec<String>,
}

pub fn run(ctx: &CliContext, cmd: HostsCommand) -> Result<()> {
    match cmd {
        HostsCommand::List(args) => run_list(ctx, args),
        HostsCommand::New(args) => run_new(ctx, args),
        HostsCommand::Remove(args) => run_remove(ctx, args),
    }
}

fn run_list(ctx: &CliContext, args: HostListArgs) -> Result<()> {
    if args.format != "table" && args.format != "json" {
        bail!("invalid format: {} (use table|json)", args.format);
    }
    let pool = HostPool::open(&ctx.paths.hosts)?;
    let hosts: Vec<HostEntry> = pool.records().iter().map(HostEntry::from_record).collect();

    if args.format == "json" {
        let json = serde_json::to_string_pretty(&hosts).context("serialize host list")?;
        println!("{}", json);
        return Ok(());
    }

    if hosts.is_empty() {
        println!("No hosts found");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Host Name").add_attribute(Attribute::Bold),
        Cell::new("Address").add_attribute(Attribute::Bold),
        Cell::new("Port").add_attribute(Attribute::Bold),
    ]);
    for host in hosts {
        table.add_row(vec![host.name, host.address, host.port.to_string()]);
    }
    println!("{}", table);
    Ok(())
}

fn run_new(ctx: &CliContext, args: HostNewArgs) -> Result<()> {
    if args.name.trim().is_empty() {
        bail!("missing host name [--name]");
    }
    if args.address.trim().is_empty() {
        bail!("missing address [--address]");
    }

    let host = HostEntry::new(args.name.trim(), args.address.trim(), args.port);
    host.validate()?;

    let _lock = ctx.writer_lock()?;
    let mut pool = HostPool::open(&ctx.paths.hosts)?;
    pool.append_record(host.to_record())
        .with_context(|| format!("could not register host '{}'", host.name))?;
    pool.save().context("could not write hosts file")?;

    println!("Registered host {} ({}:{})", host.name, host.address, host.port);
    Ok(())
}

fn run_remove(ctx: &CliContext, args: HostRemoveArgs) -> Result<()> {
    let _lock = ctx.writer_lock()?;
    let mut pool = HostPool::open(&ctx.paths.hosts)?;
    let removed = pool.remove(args.names.as_slice())?;

    // Tokens keep their host name; they stop resolving until the host is re-registered.
    if let Ok(tokens) = TokenPool::open(&ctx.paths.tokens) {
        for name in &args.names {
            let users = tokens
                .records()
                .iter()
                .filter(|r| r.field(TokenKind::HOST_NAME) == Some(name.as_str()))
                .count();
            if users > 0 {
                tracing::warn!(host = %name, tokens = users, "removed host is still referenced by tokens");
            }
        }
    }

    if let Err(e) = pool.save() {
        tracing::error!(error = %e, "could not write changes to hosts file");
        eprintln!("warning: could not write changes to {}", ctx.paths.hosts.display());
    }

    println!("Removed {} host(s)", removed);
    Ok(())
}
