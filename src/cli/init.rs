use crate::cli::CliContext;
use crate::constants;
use crate::core::config;
use crate::models::config::PrqlConfig;
use crate::util::fs as prql_fs;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing prql.toml with defaults
    #[arg(long)]
    pub force: bool,
}

pub fn run(ctx: &CliContext, args: InitArgs) -> Result<()> {
    let paths = &ctx.paths;
    prql_fs::ensure_dir(&paths.root, constants::ROOT_DIR_MODE)?;

    if args.force || !paths.config.exists() {
        config::save(&paths.config, &PrqlConfig::default())?;
        println!("Wrote {}", paths.config.display());
    }

    if !config::has_custom_key(&ctx.config) {
        println!("note: using the built-in obfuscation key; set [security] obfuscation_key in prql.toml");
    }

    println!("state directory initialized at {}", paths.root.display());
    Ok(())
}
