//! `prql.toml` configuration model.

use crate::constants;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrqlConfig {
    #[serde(default)]
    pub daemon: DaemonSection,
    #[serde(default)]
    pub security: SecuritySection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonSection {
    /// Pid file the CLI signals after mutating a pool. Defaults to `<root>/prqld.pid`.
    #[serde(default)]
    pub pid_file: Option<String>,

    /// Tracing filter used by the daemon when `PRQL_LOG` is unset.
    #[serde(default)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecuritySection {
    /// Key for the reversible password obfuscation.
    #[serde(default = "default_obfuscation_key")]
    pub obfuscation_key: String,
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            obfuscation_key: default_obfuscation_key(),
        }
    }
}

fn default_obfuscation_key() -> String {
    constants::DEFAULT_OBFUSCATION_KEY.to_string()
}
