//! Daemon-side token index.
//!
//! The index is an immutable `HashMap` behind an `Arc`. A refresh builds a
//! complete new map from the token file and swaps the `Arc` under one write
//! lock, so a concurrent [`TokenIndex::lookup`] sees either the old map or
//! the new one.

use crate::core::codec;
use crate::core::error::PoolResult;
use crate::core::pool::RecordKind;
use crate::core::pools::TokenKind;
use crate::models::token::TokenEntry;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

type IndexMap = HashMap<String, TokenEntry>;

/// Outcome of one populate pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulateReport {
    /// Entries in the index after the swap.
    pub indexed: usize,
    /// 1-based line numbers skipped for having the wrong field count.
    pub malformed_lines: Vec<usize>,
    /// Token IDs seen more than once in the file; the first occurrence is kept.
    pub duplicates: Vec<String>,
}

#[derive(Debug)]
pub struct TokenIndex {
    path: PathBuf,
    entries: RwLock<Arc<IndexMap>>,
}

impl TokenIndex {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    /// Load the token file into the index.
    ///
    /// With `refresh` the new index starts empty, so removed tokens disappear.
    /// Without it, file entries are merged over the current index. If the file
    /// cannot be read the current index keeps serving.
    pub fn populate(&self, refresh: bool) -> PoolResult<PopulateReport> {
        let parsed = codec::parse_entry_file(&self.path, TokenKind::WIDTH)?;

        let mut next: IndexMap = if refresh {
            HashMap::with_capacity(parsed.records.len())
        } else {
            IndexMap::clone(&self.snapshot())
        };

        let mut report = PopulateReport {
            malformed_lines: parsed.rejected.iter().map(|r| r.line).collect(),
            ..Default::default()
        };
        let mut seen = std::collections::HashSet::with_capacity(parsed.records.len());
        for record in &parsed.records {
            if !seen.insert(record.key()) {
                tracing::error!(token = record.key(), "duplicate token entry skipped");
                report.duplicates.push(record.key().to_string());
                continue;
            }
            next.insert(record.key().to_string(), TokenEntry::from_record(record));
        }
        report.indexed = next.len();

        *self.entries.write() = Arc::new(next);

        tracing::info!(
            path = %self.path.display(),
            refresh,
            indexed = report.indexed,
            malformed = report.malformed_lines.len(),
            duplicates = report.duplicates.len(),
            "token index populated"
        );
        Ok(report)
    }

    /// Exact-match lookup.
    pub fn lookup(&self, token: &str) -> Option<TokenEntry> {
        self.entries.read().get(token).cloned()
    }

    /// The current index. Later refreshes do not affect the returned map.
    pub fn snapshot(&self) -> Arc<HashMap<String, TokenEntry>> {
        Arc::clone(&*self.entries.read())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn line(id: &str, user: &str) -> String {
        format!("{}:tag:{}:obf:db1:app::false", id, user)
    }

    fn write_tokens(path: &Path, lines: &[String]) {
        fs::write(path, format!("{}\n", lines.join("\n"))).unwrap();
    }

    #[test]
    fn test_populate_and_lookup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens");
        write_tokens(&path, &[line("t1", "alice"), line("t2", "bob")]);
        let index = TokenIndex::new(&path);
        let report = index.populate(false).unwrap();
        assert_eq!(report.indexed, 2);
        assert_eq!(index.lookup("t2").unwrap().user, "bob");
        assert!(index.lookup("T2").is_none());
        assert!(index.lookup("t").is_none());
    }

    #[test]
    fn test_malformed_line_is_skipped_with_line_number() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens");
        write_tokens(&path, &[line("t1", "alice"), "t2:bob:obf:db1".to_string()]);
        let index = TokenIndex::new(&path);
        let report = index.populate(false).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(report.malformed_lines, vec![2]);
        assert!(index.lookup("t1").is_some());
    }

    #[test]
    fn test_refresh_drops_removed_tokens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens");
        write_tokens(&path, &[line("t1", "alice"), line("t2", "bob")]);
        let index = TokenIndex::new(&path);
        index.populate(false).unwrap();

        write_tokens(&path, &[line("t2", "bob")]);
        index.populate(true).unwrap();
        assert!(index.lookup("t1").is_none());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_populate_without_refresh_merges() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens");
        write_tokens(&path, &[line("t1", "alice")]);
        let index = TokenIndex::new(&path);
        index.populate(false).unwrap();

        write_tokens(&path, &[line("t2", "bob")]);
        let report = index.populate(false).unwrap();
        assert_eq!(report.indexed, 2);
        assert!(index.lookup("t1").is_some());
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens");
        write_tokens(&path, &[line("t1", "alice"), line("t1", "mallory")]);
        let index = TokenIndex::new(&path);
        let report = index.populate(true).unwrap();
        assert_eq!(report.duplicates, vec!["t1".to_string()]);
        assert_eq!(index.lookup("t1").unwrap().user, "alice");
    }

    #[test]
    fn test_missing_file_yields_empty_index() {
        let dir = TempDir::new().unwrap();
        let index = TokenIndex::new(dir.path().join("tokens"));
        assert_eq!(index.populate(true).unwrap().indexed, 0);
        assert!(index.is_empty());
    }

    #[test]
    fn test_unreadable_file_keeps_previous_index() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens");
        write_tokens(&path, &[line("t1", "alice")]);
        let index = TokenIndex::new(&path);
        index.populate(false).unwrap();

        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        assert!(index.populate(true).is_err());
        assert!(index.lookup("t1").is_some());
    }

    #[test]
    fn test_snapshot_is_stable_across_refresh() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens");
        write_tokens(&path, &[line("t1", "alice")]);
        let index = TokenIndex::new(&path);
        index.populate(false).unwrap();
        let before = index.snapshot();

        write_tokens(&path, &[line("t2", "bob")]);
        index.populate(true).unwrap();
        assert!(before.contains_key("t1"));
        assert!(!index.snapshot().contains_key("t1"));
    }

    #[test]
    fn test_concurrent_lookups_see_whole_index() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens");
        let old: Vec<String> = (0..200).map(|i| line(&format!("old{}", i), "alice")).collect();
        let new: Vec<String> = (0..200).map(|i| line(&format!("new{}", i), "bob")).collect();
        write_tokens(&path, &old);

        let index = Arc::new(TokenIndex::new(&path));
        index.populate(false).unwrap();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let snap = index.snapshot();
                        let olds = (0..200).filter(|i| snap.contains_key(&format!("old{}", i))).count();
                        let news = (0..200).filter(|i| snap.contains_key(&format!("new{}", i))).count();
                        assert!(
                            (olds == 200 && news == 0) || (olds == 0 && news == 200),
                            "mixed index: {} old, {} new",
                            olds,
                            news
                        );
                    }
                })
            })
            .collect();

        for i in 0..20 {
            let lines = if i % 2 == 0 { &new } else { &old };
            write_tokens(&path, lines);
            index.populate(true).unwrap();
        }

        for r in readers {
            r.join().unwrap();
        }
    }
}
