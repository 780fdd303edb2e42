//! Token issuance and revocation on top of the token pool.

use crate::constants;
use crate::core::codec::Record;
use crate::core::error::{PoolError, PoolResult};
use crate::core::pools::TokenPool;
use crate::models::token::{NewToken, TokenFields};
use crate::util::obfuscate::Obfuscator;
use crate::util::prompt::SecretPrompt;
use crate::util::signal::DaemonNotifier;
use chrono::Utc;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

/// Pool name passed to the daemon on refresh.
const TOKENS_POOL: &str = "tokens";

/// Result of a removal. Removal itself cannot fail; persisting it can.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub removed: usize,
    pub persisted: bool,
}

pub struct TokenManager<'a> {
    pool: &'a mut TokenPool,
    obfuscator: &'a dyn Obfuscator,
    prompt: &'a dyn SecretPrompt,
    notifier: &'a dyn DaemonNotifier,
}

impl<'a> TokenManager<'a> {
    pub fn new(
        pool: &'a mut TokenPool,
        obfuscator: &'a dyn Obfuscator,
        prompt: &'a dyn SecretPrompt,
        notifier: &'a dyn DaemonNotifier,
    ) -> Self {
        Self {
            pool,
            obfuscator,
            prompt,
            notifier,
        }
    }

    /// Issue a token and persist it. Returns the new token ID.
    ///
    /// If the pool cannot be saved the token is dropped from memory again and
    /// the persistence error is returned; the daemon is not signalled.
    pub fn create(&mut self, input: NewToken) -> PoolResult<String> {
        let TokenFields {
            tag,
            user,
            host,
            database,
            origins,
            living,
        } = input.validate()?;

        let token = self.generate_token_id(&user, &host, &database)?;

        let secret = self
            .prompt
            .read_secret(&user)
            .map_err(|e| PoolError::Prompt(format!("{:#}", e)))?;
        if secret.is_empty() {
            return Err(PoolError::Prompt("password is empty".into()));
        }
        let password = self.obfuscator.encrypt(&secret);

        self.pool.append_record(Record::new(vec![
            token.clone(),
            tag.clone(),
            user.clone(),
            password,
            host.clone(),
            database.clone(),
            origins,
            living.to_string(),
        ]))?;

        if let Err(e) = self.pool.save() {
            if let Err(rollback) = self.pool.remove(&[token.as_str()]) {
                tracing::error!(error = %rollback, "rollback of unsaved token failed");
            }
            return Err(e);
        }

        tracing::info!(tag = %tag, user = %user, host = %host, database = %database, "token issued");
        self.notify();
        Ok(token)
    }

    /// Remove tokens by ID. Unknown IDs are ignored.
    ///
    /// A failed save is logged and reported through [`RemoveOutcome::persisted`];
    /// the in-memory removal stands.
    pub fn remove<S: AsRef<str>>(&mut self, ids: &[S]) -> PoolResult<RemoveOutcome> {
        let removed = self.pool.remove(ids)?;
        let persisted = match self.pool.save() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "could not write changes to tokens file");
                false
            }
        };
        tracing::info!(requested = ids.len(), removed, persisted, "tokens removed");
        self.notify();
        Ok(RemoveOutcome { removed, persisted })
    }

    pub fn list(&self) -> &[Record] {
        self.pool.records()
    }

    /// Token IDs in file order.
    pub fn token_ids(&self) -> Vec<String> {
        self.pool.records().iter().map(|r| r.key().to_string()).collect()
    }

    fn generate_token_id(&self, user: &str, host: &str, database: &str) -> PoolResult<String> {
        let seconds = Utc::now().timestamp();
        for attempt in 0..constants::TOKEN_GENERATION_ATTEMPTS {
            let mut nonce = [0u8; constants::TOKEN_NONCE_LEN];
            OsRng.fill_bytes(&mut nonce);
            let token = derive_token_id(user, host, database, seconds, &nonce);
            if !self.pool.contains(&token) {
                return Ok(token);
            }
            tracing::warn!(attempt, "token id collision, regenerating");
        }
        Err(PoolError::Validation(format!(
            "could not derive a unique token id after {} attempts",
            constants::TOKEN_GENERATION_ATTEMPTS
        )))
    }

    fn notify(&self) {
        if let Err(e) = self.notifier.refresh(TOKENS_POOL) {
            tracing::warn!(error = %e, "could not signal daemon to refresh tokens");
        }
    }
}

/// Hash the seed material into a 32-character lowercase hex token ID.
pub fn derive_token_id(user: &str, host: &str, database: &str, seconds: i64, nonce: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user.as_bytes());
    hasher.update(host.as_bytes());
    hasher.update(database.as_bytes());
    hasher.update(seconds.to_string().as_bytes());
    hasher.update(nonce);
    let mut id = hex::encode(hasher.finalize());
    id.truncate(constants::TOKEN_ID_LEN);
    id
}
