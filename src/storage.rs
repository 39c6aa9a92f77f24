//! On-disk layout of a yap home
//!
//! # Directory Structure
//!
//! ```text
//! ~/.yap/                       # Home (YAP_HOME / --home)
//!   .lock                       # Advisory single-instance lock
//!   config.toml                 # Optional settings
//!   tasks/<uuid>.task           # Canonical task records
//!   pending-tasks/<id>.task     # Symlinks into tasks/
//!   completed-tasks/<id>.task   # Symlinks into tasks/
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IoContext, Result};
use crate::task::TaskState;

pub const TASKS_DIR: &str = "tasks";
pub const PENDING_DIR: &str = "pending-tasks";
pub const COMPLETED_DIR: &str = "completed-tasks";
pub const LOCK_FILE: &str = ".lock";
pub const CONFIG_FILE: &str = "config.toml";

/// Paths of one yap home
#[derive(Debug, Clone)]
pub struct Storage {
    home: PathBuf,
}

impl Storage {
    /// Describe the layout under `home` without touching the filesystem.
    ///
    /// Relative homes are made absolute so link targets can be computed
    /// between sibling directories.
    pub fn new(home: impl AsRef<Path>) -> Result<Self> {
        let home = home.as_ref();
        let home = std::path::absolute(home)
            .with_context(|| format!("resolving home {}", home.display()))?;
        Ok(Self { home })
    }

    /// Describe the layout and create any missing directories.
    pub fn open(home: impl AsRef<Path>) -> Result<Self> {
        let storage = Self::new(home)?;
        storage.ensure_dirs()?;
        Ok(storage)
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn tasks_dir(&self) -> PathBuf {
        self.home.join(TASKS_DIR)
    }

    pub fn pending_dir(&self) -> PathBuf {
        self.home.join(PENDING_DIR)
    }

    pub fn completed_dir(&self) -> PathBuf {
        self.home.join(COMPLETED_DIR)
    }

    /// Link directory holding tasks in `state`
    pub fn state_dir(&self, state: TaskState) -> PathBuf {
        match state {
            TaskState::Pending => self.pending_dir(),
            TaskState::Completed => self.completed_dir(),
        }
    }

    pub fn lock_file(&self) -> PathBuf {
        self.home.join(LOCK_FILE)
    }

    pub fn config_file(&self) -> PathBuf {
        self.home.join(CONFIG_FILE)
    }

    /// Create the home and its three task directories (mode 0700 on unix)
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.tasks_dir(), self.pending_dir(), self.completed_dir()] {
            create_private_dir(&dir)?;
        }
        Ok(())
    }
}

fn create_private_dir(dir: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder
        .create(dir)
        .with_context(|| format!("creating {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_creates_layout() {
        let temp = TempDir::new().unwrap();
        let home = temp.path().join("yap-home");
        let storage = Storage::open(&home).unwrap();

        assert!(storage.tasks_dir().is_dir());
        assert!(storage.pending_dir().is_dir());
        assert!(storage.completed_dir().is_dir());
        assert_eq!(storage.lock_file(), home.join(".lock"));
        assert_eq!(storage.config_file(), home.join("config.toml"));
    }

    #[test]
    fn state_dirs_map_to_link_dirs() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path()).unwrap();
        assert_eq!(
            storage.state_dir(TaskState::Pending),
            temp.path().join("pending-tasks")
        );
        assert_eq!(
            storage.state_dir(TaskState::Completed),
            temp.path().join("completed-tasks")
        );
    }

    #[test]
    fn relative_home_becomes_absolute() {
        let storage = Storage::new("some/relative/home").unwrap();
        assert!(storage.home().is_absolute());
        assert!(storage.home().ends_with("some/relative/home"));
    }

    #[cfg(unix)]
    #[test]
    fn dirs_are_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let storage = Storage::open(temp.path().join("h")).unwrap();
        let mode = fs::metadata(storage.tasks_dir()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }
}
