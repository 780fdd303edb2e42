//! Daemon reload loop: keeps the token index in sync with the token file.
//!
//! `SIGUSR1` (sent by the CLI) and `SIGHUP` trigger a full refresh.
//! `SIGTERM` and `SIGINT` stop the loop and remove the pid file.

use crate::core::token_index::TokenIndex;
use crate::util::signal::{write_pid, REFRESH_SIGNAL};
use anyhow::{Context, Result};
use nix::sys::signal::{SigSet, Signal};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Stop,
}

/// Signals the daemon waits on.
pub fn daemon_signals() -> SigSet {
    let mut set = SigSet::empty();
    set.add(REFRESH_SIGNAL);
    set.add(Signal::SIGHUP);
    set.add(Signal::SIGTERM);
    set.add(Signal::SIGINT);
    set
}

/// React to one delivered signal.
///
/// A failed refresh is logged and the previous index keeps serving.
pub fn handle_signal(index: &TokenIndex, signal: Signal) -> Control {
    match signal {
        Signal::SIGUSR1 | Signal::SIGHUP => {
            tracing::info!(signal = %signal, "refreshing token index");
            if let Err(e) = index.populate(true) {
                tracing::error!(error = %e, "token refresh failed, serving previous index");
            }
            Control::Continue
        }
        Signal::SIGTERM | Signal::SIGINT => {
            tracing::info!(signal = %signal, "shutting down");
            Control::Stop
        }
        other => {
            tracing::debug!(signal = %other, "ignoring signal");
            Control::Continue
        }
    }
}

/// Populate the index and block on signals until told to stop.
///
/// Must be called before any other thread is spawned so the signal mask
/// is inherited everywhere.
pub fn serve(index: &TokenIndex, pid_file: &Path) -> Result<()> {
    let signals = daemon_signals();
    signals.thread_block().context("block daemon signals")?;

    write_pid(pid_file)?;
    let _pid = PidFileGuard(pid_file.to_path_buf());
    tracing::info!(pid_file = %pid_file.display(), "daemon started");

    index
        .populate(false)
        .with_context(|| format!("load tokens from {}", index.path().display()))?;

    loop {
        let signal = signals.wait().context("wait for signal")?;
        if handle_signal(index, signal) == Control::Stop {
            return Ok(());
        }
    }
}

struct PidFileGuard(PathBuf);

impl Drop for PidFileGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.0) {
            tracing::warn!(pid_file = %self.0.display(), error = %e, "could not remove pid file");
        }
    }
}
