use crate::cli::CliContext;
use crate::core::lifecycle::TokenManager;
use crate::core::pools::{HostPool, TokenPool};
use crate::models::token::{NewToken, TokenEntry};
use crate::util::prompt::{SecretPrompt, StdinPrompt, TerminalPrompt};
use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};

#[derive(Subcommand, Debug)]
pub enum TokensCommand {
    /// List all available tokens
    List(ListArgs),
    /// Generate a new PrQL token for the given credentials
    New(NewArgs),
    /// Remove tokens. This action is permanent.
    Remove(RemoveArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only display tokens
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format: table|json
    #[arg(long, default_value = "table")]
    pub format: String,
}

#[derive(Args, Debug)]
pub struct NewArgs {
    /// Tag to describe the role of the token
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Database user associated with the new token
    #[arg(short, long)]
    pub user: Option<String>,

    /// Database host name, as registered with `prql hosts new`
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Database associated with the new token
    #[arg(short, long)]
    pub database: Option<String>,

    /// Comma-delimited list of origins allowed to use the token
    #[arg(short, long)]
    pub origins: Option<String>,

    /// Keep the connection alive regardless of token usage frequency
    #[arg(short, long)]
    pub living: bool,

    /// Read the password from stdin instead of an interactive prompt
    #[arg(long)]
    pub from_stdin: bool,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Token IDs to remove
    #[arg(required = true, value_name = "TOKEN")]
    pub tokens: Vec<String>,
}

pub fn run(ctx: &CliContext, cmd: TokensCommand) -> Result<()> {
    match cmd {
        TokensCommand::List(args) => run_list(ctx, args),
        TokensCommand::New(args) => run_new(ctx, args),
        TokensCommand::Remove(args) => run_remove(ctx, args),
    }
}

fn run_list(ctx: &CliContext, args: ListArgs) -> Result<()> {
    if args.format != "table" && args.format != "json" {
        bail!("invalid format: {} (use table|json)", args.format);
    }
    let mut pool = TokenPool::open(&ctx.paths.tokens)?;
    let obfuscator = ctx.obfuscator()?;
    let notifier = ctx.notifier();
    let manager = TokenManager::new(&mut pool, &obfuscator, &TerminalPrompt, &notifier);

    if args.quiet {
        println!("{}", manager.token_ids().join(" "));
        return Ok(());
    }

    let entries: Vec<TokenEntry> = manager.list().iter().map(TokenEntry::from_record).collect();

    if args.format == "json" {
        let json = serde_json::to_string_pretty(&entries).context("serialize token list")?;
        println!("{}", json);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No tokens found");
        return Ok(());
    }

    println!("{}", render_table(&entries));
    Ok(())
}

/// Token table without the password column.
pub fn render_table(entries: &[TokenEntry]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Token").add_attribute(Attribute::Bold),
        Cell::new("Tag").add_attribute(Attribute::Bold),
        Cell::new("Username").add_attribute(Attribute::Bold),
        Cell::new("Host Name").add_attribute(Attribute::Bold),
        Cell::new("Database").add_attribute(Attribute::Bold),
        Cell::new("Origins").add_attribute(Attribute::Bold),
        Cell::new("Living").add_attribute(Attribute::Bold),
    ]);

    for entry in entries {
        let tag = if entry.tag.is_empty() {
            "-".to_string()
        } else {
            entry.tag.clone()
        };
        let origins = if entry.origins.is_empty() {
            "*".to_string()
        } else {
            entry.origins.join(",")
        };
        table.add_row(vec![
            entry.token.clone(),
            tag,
            entry.user.clone(),
            entry.host_name.clone(),
            entry.dbname.clone(),
            origins,
            entry.living.to_string(),
        ]);
    }
    table
}

fn run_new(ctx: &CliContext, args: NewArgs) -> Result<()> {
    if ctx.non_interactive && !args.from_stdin {
        bail!("--non-interactive requires --from-stdin for tokens new");
    }

    let input = NewToken {
        tag: args.tag,
        user: args.user,
        host: args.host,
        database: args.database,
        origins: args.origins,
        living: args.living,
    };
    let host = input.validate()?.host;

    let _lock = ctx.writer_lock()?;
    let mut pool = TokenPool::open(&ctx.paths.tokens)?;
    warn_if_unknown_host(ctx, &host);

    let obfuscator = ctx.obfuscator()?;
    let notifier = ctx.notifier();
    let prompt: &dyn SecretPrompt = if args.from_stdin {
        &StdinPrompt
    } else {
        &TerminalPrompt
    };

    let mut manager = TokenManager::new(&mut pool, &obfuscator, prompt, &notifier);
    let token = manager
        .create(input)
        .context("could not generate new token")?;

    println!("Generated Token {}", token);
    Ok(())
}

fn run_remove(ctx: &CliContext, args: RemoveArgs) -> Result<()> {
    let _lock = ctx.writer_lock()?;
    let mut pool = TokenPool::open(&ctx.paths.tokens)?;

    let obfuscator = ctx.obfuscator()?;
    let notifier = ctx.notifier();
    let mut manager = TokenManager::new(&mut pool, &obfuscator, &TerminalPrompt, &notifier);
    let outcome = manager.remove(args.tokens.as_slice())?;

    if !outcome.persisted {
        eprintln!("warning: could not write changes to {}", ctx.paths.tokens.display());
    }
    println!("Removed {} token(s)", outcome.removed);
    Ok(())
}

fn warn_if_unknown_host(ctx: &CliContext, host: &str) {
    match HostPool::open(&ctx.paths.hosts) {
        Ok(hosts) if !hosts.contains(host) => {
            tracing::warn!(host, "host is not registered; add it with `prql hosts new`");
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "could not read host pool"),
    }
}
