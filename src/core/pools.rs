//! Pool specializations for each credential kind.

use crate::core::codec::Record;
use crate::core::error::{PoolError, PoolResult};
use crate::core::pool::{Pool, RecordKind};
use std::collections::HashSet;

/// Token records: `token:tag:username:password:hostName:dbname:origins:living`.
#[derive(Debug)]
pub struct TokenKind;

/// Host records: `name:address:port`.
#[derive(Debug)]
pub struct HostKind;

pub type TokenPool = Pool<TokenKind>;
pub type HostPool = Pool<HostKind>;

impl TokenKind {
    pub const TOKEN: usize = 0;
    pub const TAG: usize = 1;
    pub const USERNAME: usize = 2;
    pub const PASSWORD: usize = 3;
    pub const HOST_NAME: usize = 4;
    pub const DATABASE: usize = 5;
    pub const ORIGINS: usize = 6;
    pub const LIVING: usize = 7;
}

impl RecordKind for TokenKind {
    const NAME: &'static str = "token";
    const WIDTH: usize = 8;

    fn rebuild(records: &[Record]) -> PoolResult<()> {
        ensure_unique_keys(Self::NAME, records)
    }
}

impl HostKind {
    pub const ADDRESS: usize = 1;
    pub const PORT: usize = 2;
}

impl RecordKind for HostKind {
    const NAME: &'static str = "host";
    const WIDTH: usize = 3;

    fn rebuild(records: &[Record]) -> PoolResult<()> {
        ensure_unique_keys(Self::NAME, records)?;
        records.iter().try_for_each(Self::check)
    }

    fn check(record: &Record) -> PoolResult<()> {
        let port = record.field(Self::PORT).unwrap_or("");
        if port.parse::<u16>().is_err() {
            return Err(PoolError::Validation(format!(
                "host '{}' has invalid port '{}'",
                record.key(),
                port
            )));
        }
        Ok(())
    }
}

fn ensure_unique_keys(kind: &'static str, records: &[Record]) -> PoolResult<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for r in records {
        if !seen.insert(r.key()) {
            tracing::error!(kind, key = r.key(), "duplicate key in pool");
            return Err(PoolError::DuplicateKey {
                kind,
                key: r.key().to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn token(id: &str) -> Record {
        Record::from([id, "", "alice", "obf", "db1", "app", "", "false"])
    }

    #[test]
    fn test_token_pool_rejects_duplicate_id() {
        let dir = TempDir::new().unwrap();
        let mut pool = TokenPool::new(dir.path().join("tokens"));
        pool.append_record(token("t1")).unwrap();
        pool.append_record(token("t2")).unwrap();
        let err = pool.append_record(token("t1")).unwrap_err();
        assert!(matches!(err, PoolError::DuplicateKey { kind: "token", .. }));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_token_pool_requires_eight_fields() {
        let dir = TempDir::new().unwrap();
        let mut pool = TokenPool::new(dir.path().join("tokens"));
        let err = pool
            .append_record(["t1", "alice", "obf", "db1", "app", "", "false"])
            .unwrap_err();
        assert!(matches!(err, PoolError::SchemaWidth { expected: 8, found: 7, .. }));
    }

    #[test]
    fn test_host_pool_rejects_duplicate_name() {
        let dir = TempDir::new().unwrap();
        let mut pool = HostPool::new(dir.path().join("hosts"));
        pool.append_record(["db1", "10.0.0.1", "5432"]).unwrap();
        let err = pool
            .append_record(["db1", "10.0.0.2", "5432"])
            .unwrap_err();
        assert!(matches!(err, PoolError::DuplicateKey { kind: "host", .. }));
    }

    #[test]
    fn test_host_pool_rejects_bad_port() {
        let dir = TempDir::new().unwrap();
        let mut pool = HostPool::new(dir.path().join("hosts"));
        let err = pool
            .append_record(["db1", "10.0.0.1", "70000"])
            .unwrap_err();
        assert!(matches!(err, PoolError::Validation(_)));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_host_pool_load_skips_bad_port() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hosts");
        fs::write(
            &path,
            "db1:10.0.0.1:5432\ndb2:10.0.0.2:notaport\ndb3:10.0.0.3:6432\n",
        )
        .unwrap();
        let pool = HostPool::open(&path).unwrap();
        let names: Vec<&str> = pool.records().iter().map(|r| r.key()).collect();
        assert_eq!(names, vec!["db1", "db3"]);
    }

    #[test]
    fn test_token_pool_load_tolerates_duplicate_id() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens");
        let lines: Vec<String> = ["t1", "t2", "t1"]
            .iter()
            .map(|id| crate::core::codec::encode(&token(id)))
            .collect();
        fs::write(&path, format!("{}\n", lines.join("\n"))).unwrap();
        let pool = TokenPool::open(&path).unwrap();
        let ids: Vec<&str> = pool.records().iter().map(|r| r.key()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[test]
    fn test_host_pool_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hosts");
        let mut pool = HostPool::new(&path);
        pool.append_record(["db1", "10.0.0.1", "5432"]).unwrap();
        pool.append_record(["db2", "db2.internal", "6432"]).unwrap();
        pool.save().unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "db1:10.0.0.1:5432\ndb2:db2.internal:6432\n"
        );
        let reloaded = HostPool::open(&path).unwrap();
        assert_eq!(reloaded.records(), pool.records());
    }
}
