// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, single-instance lock.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use fs2::FileExt;
use lwf_engine::{state_dir, LwfManager, SiteConfig};
use lwf_storage::Database;
use thiserror::Error;
use tracing::info;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.lwf)
    pub state_dir: PathBuf,
    /// Path to the SQLite database
    pub db_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Path to the user site descriptor file
    pub sites_path: PathBuf,
}

impl Config {
    /// Load configuration for the user-level daemon.
    ///
    /// Uses fixed paths under `~/.lwf`. One daemon serves all workflows
    /// for a user; deleting the directory resets all state.
    pub fn load() -> Self {
        let state_dir = state_dir();
        Self {
            db_path: state_dir.join("lwf.db"),
            lock_path: state_dir.join("lwfd.pid"),
            log_path: state_dir.join("lwfd.log"),
            sites_path: state_dir.join("sites.toml"),
            state_dir,
        }
    }

    /// Same layout rooted at an explicit directory (tests).
    pub fn rooted_at(state_dir: PathBuf) -> Self {
        Self {
            db_path: state_dir.join("lwf.db"),
            lock_path: state_dir.join("lwfd.pid"),
            log_path: state_dir.join("lwfd.log"),
            sites_path: state_dir.join("sites.toml"),
            state_dir,
        }
    }
}

/// Errors that can occur during daemon lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("another instance holds the lock at {0}")]
    LockFailed(PathBuf),
    #[error("engine error: {0}")]
    Engine(#[from] lwf_engine::EngineError),
    #[error("store error: {0}")]
    Store(#[from] lwf_storage::StoreError),
}

/// Daemon state during operation.
pub struct DaemonState {
    /// Configuration
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// The middleware façade (owns the event processor)
    pub manager: Arc<LwfManager>,
}

impl DaemonState {
    /// Stop the event processor. Persisted events are re-evaluated on the
    /// next start; the advisory lock releases when this state drops.
    pub fn shutdown(&self) {
        self.manager.shutdown();
        info!("daemon shut down");
    }
}

/// True when a daemon currently holds the instance lock.
pub fn is_running(config: &Config) -> bool {
    let Ok(file) = OpenOptions::new().write(true).open(&config.lock_path) else {
        return false;
    };
    if file.try_lock_exclusive().is_ok() {
        let _ = fs2::FileExt::unlock(&file);
        return false;
    }
    true
}

/// Start the daemon: acquire the single-instance lock, open the store,
/// load site config, and launch the manager with its event processor.
///
/// Must be called inside a tokio runtime.
pub fn startup(config: Config) -> Result<DaemonState, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    let mut lock_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(&config.lock_path)?;
    if lock_file.try_lock_exclusive().is_err() {
        return Err(LifecycleError::LockFailed(config.lock_path.clone()));
    }
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    let site_config = SiteConfig::load_from(&config.sites_path)?;
    let db = Database::open(&config.db_path)?;
    let manager = LwfManager::start(db, site_config);
    info!(
        state_dir = %config.state_dir.display(),
        "daemon started"
    );

    Ok(DaemonState {
        config,
        lock_file,
        manager,
    })
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
