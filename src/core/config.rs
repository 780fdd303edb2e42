use crate::constants;
use crate::core::paths::PrqlPaths;
use crate::core::pool::write_atomic;
use crate::models::config::PrqlConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Load `prql.toml`. A missing file yields the defaults.
pub fn load(path: &Path) -> Result<PrqlConfig> {
    if !path.exists() {
        return Ok(PrqlConfig::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let config: PrqlConfig = toml::from_str(&content)
        .with_context(|| format!("parse config {}", path.display()))?;
    if config.security.obfuscation_key.is_empty() {
        anyhow::bail!("config {}: security.obfuscation_key cannot be empty", path.display());
    }
    Ok(config)
}

pub fn save(path: &Path, config: &PrqlConfig) -> Result<()> {
    let content = toml::to_string_pretty(config).context("serialize config")?;
    write_atomic(path, content.as_bytes())
        .with_context(|| format!("write config {}", path.display()))
}

/// Pid file from the config, falling back to `<root>/prqld.pid`.
pub fn pid_file(paths: &PrqlPaths, config: &PrqlConfig) -> PathBuf {
    match config.daemon.pid_file.as_deref() {
        Some(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => paths.pid_file.clone(),
    }
}

/// Whether the config overrides the built-in obfuscation key.
pub fn has_custom_key(config: &PrqlConfig) -> bool {
    config.security.obfuscation_key != constants::DEFAULT_OBFUSCATION_KEY
}
