//! File locking and atomic writes for yap
//!
//! - One advisory lock file per yap home, taken without waiting
//! - Atomic write pattern (write temp + fsync + rename) for task files

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{Error, IoContext, Result};

fn is_lock_contended(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::WouldBlock {
        return true;
    }

    // On Windows, fs2 can surface lock/sharing violations as "Other".
    #[cfg(windows)]
    {
        matches!(err.raw_os_error(), Some(32) | Some(33))
    }
    #[cfg(not(windows))]
    {
        false
    }
}

/// A file lock guard that releases the lock when dropped
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Try to acquire a lock without waiting
    ///
    /// Returns `Ok(Some(lock))` if acquired, `Ok(None)` if another holder
    /// has it, or `Err` for other errors. The lock file is created if needed.
    pub fn try_acquire(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("opening lock file {}", path.display()))?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(FileLock {
                file,
                path: path.to_path_buf(),
            })),
            Err(e) if is_lock_contended(&e) => Ok(None),
            Err(e) => Err(Error::io(format!("locking {}", path.display()), e)),
        }
    }

    /// Acquire the single-instance lock or fail fast with `LockHeld`
    pub fn acquire_instance(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match Self::try_acquire(path)? {
            Some(lock) => {
                tracing::debug!(path = %path.display(), "instance lock acquired");
                Ok(lock)
            }
            None => Err(Error::LockHeld(path.to_path_buf())),
        }
    }

    /// Get the path to the locked file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Unlock the file - ignore errors during drop
        let _ = self.file.unlock();
        tracing::debug!(path = %self.path.display(), "instance lock released");
    }
}

/// Atomically write data to a file
///
/// Writes to a temporary sibling, syncs it, then renames it over the
/// target, so readers see either the old or the new content.
pub fn write_atomic(path: impl AsRef<Path>, data: &[u8]) -> Result<()> {
    let path = path.as_ref();

    // Temp file lives in the same directory so the rename stays atomic.
    // The extension keeps it out of `*.task` scans.
    let temp_path = path.with_extension(format!(
        "{}.tmp.{}",
        path.extension().and_then(|e| e.to_str()).unwrap_or(""),
        std::process::id()
    ));

    let mut temp_file = File::create(&temp_path)
        .with_context(|| format!("creating {}", temp_path.display()))?;
    let result = write_and_swap(&mut temp_file, &temp_path, path, data);
    drop(temp_file);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_and_swap(temp_file: &mut File, temp_path: &Path, path: &Path, data: &[u8]) -> Result<()> {
    temp_file
        .write_all(data)
        .with_context(|| format!("writing {}", temp_path.display()))?;
    temp_file
        .sync_all()
        .with_context(|| format!("syncing {}", temp_path.display()))?;
    fs::rename(temp_path, path).with_context(|| {
        format!("renaming {} to {}", temp_path.display(), path.display())
    })
}
