use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    prql_vault::init_tracing("warn");
    let cli = prql_vault::cli::Cli::parse();
    cli.run()
}
