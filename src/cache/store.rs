//! Filesystem-backed byte store.
//!
//! [`DiskStore`] maps string keys onto files beneath a root directory and
//! exposes the three operations the cache needs: probe, read, write. Writes
//! go to a temporary sibling first and are renamed into place, so a reader
//! never observes a half-written artifact. Concurrent writers of the same
//! key race benignly; the last rename wins.

use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Distinguishes concurrent writers' temp files within one process.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// A key-value byte store rooted at a directory on disk.
///
/// Keys are relative paths (`fscache/blog_post-1.html`); intermediate
/// directories are created on demand.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Creates a store rooted at `root`. The directory itself is created
    /// lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Returns whether an entry exists for `key`.
    ///
    /// Probe failures (permission errors, unreachable root) report as
    /// absent rather than surfacing an error; the caller falls through to
    /// the miss path and the subsequent read or write reports the fault.
    pub async fn exists(&self, key: &str) -> bool {
        fs::try_exists(self.resolve(key)).await.unwrap_or(false)
    }

    /// Reads the full contents of the entry for `key`.
    pub async fn get(&self, key: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(key)).await
    }

    /// Writes `bytes` as the entry for `key`, replacing any previous entry.
    ///
    /// The bytes land in a temporary file next to the destination and are
    /// renamed over it, so concurrent readers see either the old entry or
    /// the new one, never a torn write. If any step fails, the temp file is
    /// removed before the error is returned.
    pub async fn put(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        let target = self.resolve(key);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp = temp_sibling(&target);
        if let Err(err) = write_then_rename(&temp, &target, bytes).await {
            let _ = fs::remove_file(&temp).await;
            return Err(err);
        }
        Ok(())
    }
}

/// Stages `bytes` in `temp`, then renames onto `target`. The caller removes
/// `temp` when any step fails.
async fn write_then_rename(temp: &Path, target: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(temp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    drop(file);
    fs::rename(temp, target).await
}

/// Builds a temp path in the same directory as `target` so the final
/// rename never crosses a filesystem boundary.
fn temp_sibling(target: &Path) -> PathBuf {
    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_name = format!("tmp_{}_{seq}_{name}", process::id());
    match target.parent() {
        Some(parent) => parent.join(temp_name),
        None => PathBuf::from(temp_name),
    }
}
