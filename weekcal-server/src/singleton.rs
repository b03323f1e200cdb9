//! Keeps a single weekcal-server running per machine.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File};
use std::path::PathBuf;

/// Holds the lock until dropped.
pub struct LockGuard {
    _file: File,
}

fn lock_path(port: u16) -> Result<PathBuf> {
    let runtime_dir = dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .ok_or_else(|| anyhow::anyhow!("Could not determine runtime directory"))?;

    let dir = runtime_dir.join("weekcal");
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    Ok(dir.join(format!("server-{}.lock", port)))
}

/// Take the exclusive lock for `port`, failing if another server holds it.
pub fn acquire_lock(port: u16) -> Result<LockGuard> {
    let path = lock_path(port)?;
    let file = File::create(&path).context("Failed to create lock file")?;

    file.try_lock_exclusive().map_err(|_| {
        anyhow::anyhow!(
            "Another weekcal-server instance is already running on port {}.\n\
            If you believe this is an error, remove: {}",
            port,
            path.display()
        )
    })?;

    tracing::debug!(path = %path.display(), "acquired server lock");
    Ok(LockGuard { _file: file })
}
