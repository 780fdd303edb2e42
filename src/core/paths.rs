//! State directory layout shared by the CLI and the daemon.

use crate::constants;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct PrqlPaths {
    pub root: PathBuf,
    pub tokens: PathBuf,
    pub hosts: PathBuf,
    pub config: PathBuf,
    pub lock: PathBuf,
    pub pid_file: PathBuf,
}

impl PrqlPaths {
    /// Resolve the root from the CLI arg, then `PRQL_ROOT`, then the system default.
    pub fn resolve(root_arg: Option<PathBuf>) -> Self {
        if let Some(root) = root_arg {
            return Self::from_root(root);
        }
        match env::var(constants::ROOT_ENV) {
            Ok(root) if !root.is_empty() => Self::from_root(PathBuf::from(root)),
            _ => Self::from_root(PathBuf::from(constants::DEFAULT_ROOT)),
        }
    }

    pub fn from_root(root: PathBuf) -> Self {
        let tokens = root.join("tokens");
        let hosts = root.join("hosts");
        let config = root.join("prql.toml");
        let lock = root.join("prql.lock");
        let pid_file = root.join("prqld.pid");
        Self {
            root,
            tokens,
            hosts,
            config,
            lock,
            pid_file,
        }
    }
}

impl std::fmt::Display for PrqlPaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "prql@{}", self.root.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_root() {
        let paths = PrqlPaths::from_root(PathBuf::from("/test"));
        assert_eq!(paths.root, PathBuf::from("/test"));
        assert_eq!(paths.tokens, PathBuf::from("/test/tokens"));
        assert_eq!(paths.hosts, PathBuf::from("/test/hosts"));
        assert_eq!(paths.config, PathBuf::from("/test/prql.toml"));
        assert_eq!(paths.lock, PathBuf::from("/test/prql.lock"));
        assert_eq!(paths.pid_file, PathBuf::from("/test/prqld.pid"));
    }

    #[test]
    fn test_explicit_root_wins() {
        let paths = PrqlPaths::resolve(Some(PathBuf::from("/explicit")));
        assert_eq!(paths.root, PathBuf::from("/explicit"));
        assert_eq!(paths.to_string(), "prql@/explicit");
    }
}
