//! Daemon refresh signalling through a pid file.

use anyhow::{bail, Context, Result};
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Signal the daemon treats as "reload the token index".
pub const REFRESH_SIGNAL: Signal = Signal::SIGUSR1;

pub trait DaemonNotifier {
    /// Ask the daemon to reload `pool`. Returns `Ok(false)` when no daemon is running.
    fn refresh(&self, pool: &str) -> Result<bool>;
}

pub struct PidFileNotifier {
    pid_file: PathBuf,
}

impl PidFileNotifier {
    pub fn new(pid_file: impl Into<PathBuf>) -> Self {
        Self {
            pid_file: pid_file.into(),
        }
    }
}

impl DaemonNotifier for PidFileNotifier {
    fn refresh(&self, pool: &str) -> Result<bool> {
        let pid = match read_pid(&self.pid_file)? {
            Some(pid) => pid,
            None => {
                tracing::info!(pid_file = %self.pid_file.display(), "daemon not running, skipping refresh");
                return Ok(false);
            }
        };
        signal::kill(pid, REFRESH_SIGNAL)
            .with_context(|| format!("signal daemon pid {}", pid))?;
        tracing::info!(pool, pid = pid.as_raw(), "daemon refresh requested");
        Ok(true)
    }
}

/// Read a pid file. A missing file means no daemon.
pub fn read_pid(path: &Path) -> Result<Option<Pid>> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("read pid file {}", path.display())),
    };
    let raw: i32 = content
        .trim()
        .parse()
        .with_context(|| format!("parse pid file {}", path.display()))?;
    if raw <= 0 {
        bail!("invalid pid {} in {}", raw, path.display());
    }
    Ok(Some(Pid::from_raw(raw)))
}

/// Write the current process id to `path`, owner-only.
pub fn write_pid(path: &Path) -> Result<()> {
    let pid = nix::unistd::getpid();
    crate::core::pool::write_atomic(path, format!("{}\n", pid.as_raw()).as_bytes())
        .with_context(|| format!("write pid file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_pid_file_means_not_running() {
        let dir = TempDir::new().unwrap();
        let notifier = PidFileNotifier::new(dir.path().join("prqld.pid"));
        assert!(!notifier.refresh("tokens").unwrap());
    }

    #[test]
    fn test_pid_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prqld.pid");
        write_pid(&path).unwrap();
        assert_eq!(read_pid(&path).unwrap(), Some(nix::unistd::getpid()));
    }

    #[test]
    fn test_garbage_pid_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prqld.pid");
        fs::write(&path, "not-a-pid").unwrap();
        assert!(read_pid(&path).is_err());
        fs::write(&path, "0").unwrap();
        assert!(read_pid(&path).is_err());
    }
}
