//! Secret entry for new tokens.

use crate::constants;
use anyhow::{bail, Context, Result};
use dialoguer::Password;
use std::io::Read;
use zeroize::Zeroizing;

pub trait SecretPrompt {
    /// Read the database password for `user`.
    fn read_secret(&self, user: &str) -> Result<Zeroizing<String>>;
}

/// Non-echoing terminal prompt.
pub struct TerminalPrompt;

impl SecretPrompt for TerminalPrompt {
    fn read_secret(&self, user: &str) -> Result<Zeroizing<String>> {
        let secret = Zeroizing::new(
            Password::new()
                .with_prompt(format!("Password for {}", user))
                .allow_empty_password(false)
                .interact()
                .context("read password from prompt")?,
        );
        check_size(&secret)?;
        Ok(secret)
    }
}

/// Reads the secret from stdin, for automation.
pub struct StdinPrompt;

impl SecretPrompt for StdinPrompt {
    fn read_secret(&self, _user: &str) -> Result<Zeroizing<String>> {
        let mut buf = Zeroizing::new(String::new());
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read password from stdin")?;
        let secret = Zeroizing::new(buf.trim_end_matches(['\r', '\n']).to_string());
        check_size(&secret)?;
        Ok(secret)
    }
}

fn check_size(secret: &str) -> Result<()> {
    if secret.len() > constants::MAX_SECRET_SIZE {
        bail!(
            "password exceeds maximum size ({} bytes, max {} bytes)",
            secret.len(),
            constants::MAX_SECRET_SIZE
        );
    }
    Ok(())
}
