//! Generic file-backed record store.
//!
//! A [`Pool`] keeps every record of one kind in memory, in file order. Mutations
//! (`append_record`, `remove`) only touch memory and then run the kind's
//! [`RecordKind::rebuild`] hook; `save` writes the whole pool back in one
//! atomic replace. Callers can batch several mutations behind one save.
//!
//! Loading is lenient: a line that fails [`RecordKind::check`] or repeats an
//! earlier key is logged and skipped, so the rest of the file stays usable and
//! the next save drops the bad lines.

use crate::constants;
use crate::core::codec::{self, Record};
use crate::core::error::{PoolError, PoolResult};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// A credential kind stored in its own pool file.
pub trait RecordKind {
    /// Human-readable kind name used in errors and logs.
    const NAME: &'static str;
    /// Exact number of fields every record of this kind carries.
    const WIDTH: usize;

    /// Post-mutation invariant check, run after every load, append and remove.
    fn rebuild(records: &[Record]) -> PoolResult<()>;

    /// Per-record check beyond width and delimiters.
    fn check(_record: &Record) -> PoolResult<()> {
        Ok(())
    }
}

#[derive(Debug)]
pub struct Pool<K: RecordKind> {
    path: PathBuf,
    records: Vec<Record>,
    _kind: PhantomData<K>,
}

impl<K: RecordKind> Pool<K> {
    /// Empty pool bound to `path`. Nothing is read until [`Pool::load`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
            _kind: PhantomData,
        }
    }

    /// Bind to `path` and load its current contents.
    pub fn open(path: impl Into<PathBuf>) -> PoolResult<Self> {
        let mut pool = Self::new(path);
        pool.load()?;
        Ok(pool)
    }

    /// Replace the in-memory records with the file contents.
    ///
    /// Lines of the wrong width are skipped by the codec. Lines failing
    /// [`RecordKind::check`] and repeats of an earlier key are skipped here;
    /// the first occurrence of a key wins. Returns the number of lines skipped.
    pub fn load(&mut self) -> PoolResult<usize> {
        let parsed = codec::parse_entry_file(&self.path, K::WIDTH)?;
        let mut skipped = parsed.rejected.len();
        let mut records = Vec::with_capacity(parsed.records.len());
        let mut seen = HashSet::with_capacity(parsed.records.len());

        for (record, line) in parsed.records.into_iter().zip(parsed.lines) {
            if let Err(e) = K::check(&record) {
                tracing::error!(
                    kind = K::NAME,
                    path = %self.path.display(),
                    line,
                    error = %e,
                    "invalid entry skipped"
                );
                skipped += 1;
                continue;
            }
            if !seen.insert(record.key().to_string()) {
                tracing::error!(
                    kind = K::NAME,
                    path = %self.path.display(),
                    line,
                    key = record.key(),
                    "duplicate entry skipped"
                );
                skipped += 1;
                continue;
            }
            records.push(record);
        }

        K::rebuild(&records)?;
        tracing::debug!(
            kind = K::NAME,
            path = %self.path.display(),
            records = records.len(),
            skipped,
            "pool loaded"
        );
        self.records = records;
        Ok(skipped)
    }

    /// Append a record in memory. The record is dropped again if the rebuild hook rejects it.
    pub fn append_record(&mut self, record: impl Into<Record>) -> PoolResult<()> {
        let record = record.into();
        if record.len() != K::WIDTH {
            return Err(PoolError::SchemaWidth {
                kind: K::NAME,
                expected: K::WIDTH,
                found: record.len(),
            });
        }
        if let Some(index) = record.fields().iter().position(|f| !codec::validate_field(f)) {
            return Err(PoolError::InvalidField {
                kind: K::NAME,
                index,
            });
        }

        self.records.push(record);
        if let Err(e) = K::rebuild(&self.records) {
            self.records.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Remove every record whose key is in `keys`. Unknown keys are ignored.
    pub fn remove<S: AsRef<str>>(&mut self, keys: &[S]) -> PoolResult<usize> {
        let before = self.records.len();
        self.records
            .retain(|r| !keys.iter().any(|k| k.as_ref() == r.key()));
        let removed = before - self.records.len();
        K::rebuild(&self.records)?;
        Ok(removed)
    }

    /// Atomically replace the backing file with the in-memory records.
    pub fn save(&self) -> PoolResult<()> {
        let lines: Vec<String> = self.records.iter().map(codec::encode).collect();
        let mut data = lines.join("\n");
        if !data.is_empty() {
            data.push('\n');
        }
        write_atomic(&self.path, data.as_bytes())
            .map_err(|e| PoolError::persistence(&self.path, e))?;
        tracing::debug!(
            kind = K::NAME,
            path = %self.path.display(),
            records = self.records.len(),
            "pool saved"
        );
        Ok(())
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.key() == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write `data` to a temp file next to `path`, then rename it into place.
///
/// Readers see either the previous file or the new one, never a partial write.
pub fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".pool-")
        .suffix(".tmp")
        .tempfile_in(parent)?;

    #[cfg(unix)]
    {
        let perm = fs::Permissions::from_mode(constants::POOL_FILE_MODE);
        tmp.as_file().set_permissions(perm)?;
    }

    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
