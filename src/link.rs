//! Small numeric ids for tasks.
//!
//! Each state directory (`pending-tasks/`, `completed-tasks/`) holds
//! symlinks named `<id>.task` pointing at the canonical `<uuid>.task`
//! file in the store. An id means something only inside its directory
//! and only until the task moves; new ids fill the lowest gap.
//!
//! Allocation reads the directory and is not atomic. Two processes that
//! skip the instance lock can hand out the same id.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use uuid::Uuid;

use crate::error::{Error, IoContext, Result};
use crate::store::{TaskStore, TASK_EXT};
use crate::task::LinkedTask;

/// Display id of a task within one state directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct LinkId(u16);

impl LinkId {
    pub const MIN: LinkId = LinkId(1);

    pub fn new(value: u16) -> Result<Self> {
        if value == 0 {
            return Err(Error::InvalidId("ids start at 1".to_string()));
        }
        Ok(LinkId(value))
    }

    pub fn get(self) -> u16 {
        self.0
    }

    fn file_name(self) -> String {
        format!("{}{TASK_EXT}", self.0)
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LinkId {
    type Err = Error;

    /// Only the canonical decimal form is accepted, so `01` or `+1` never
    /// alias the link file `1.task`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidId(format!("'{s}' is not a number between 1 and {}", u16::MAX));
        let value: u16 = s.parse().map_err(|_| invalid())?;
        if value.to_string() != s {
            return Err(invalid());
        }
        LinkId::new(value)
    }
}

/// Maintains the symlink layer over a [`TaskStore`]
#[derive(Debug, Clone)]
pub struct LinkManager {
    store: TaskStore,
}

impl LinkManager {
    pub fn new(store: TaskStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn link_path(dir: &Path, id: LinkId) -> PathBuf {
        dir.join(id.file_name())
    }

    /// Smallest id not currently used in `dir`.
    pub fn allocate_id(&self, dir: &Path) -> Result<LinkId> {
        let used: HashSet<u16> = self.ids_in(dir)?.into_iter().map(LinkId::get).collect();
        let free = (1..=u16::MAX)
            .find(|candidate| !used.contains(candidate))
            .ok_or_else(|| {
                Error::OperationFailed(format!("no free task id left in {}", dir.display()))
            })?;
        Ok(LinkId(free))
    }

    /// Point `<dir>/<id>.task` at the store file of `uuid`.
    pub fn link(&self, dir: &Path, id: LinkId, uuid: &Uuid) -> Result<PathBuf> {
        let path = Self::link_path(dir, id);
        let target = relative_path(dir, &self.store.path_for(uuid));
        match symlink_file(&target, &path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(Error::AlreadyLinked(path));
            }
            Err(e) => return Err(Error::io(format!("linking {}", path.display()), e)),
        }
        tracing::debug!(link = %path.display(), target = %target.display(), "linked");
        Ok(path)
    }

    /// Remove the link only; the store file is untouched.
    pub fn unlink(&self, dir: &Path, id: LinkId) -> Result<()> {
        let path = Self::link_path(dir, id);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(link = %path.display(), "unlinked");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(not_linked(dir, id)),
            Err(e) => Err(Error::io(format!("unlinking {}", path.display()), e)),
        }
    }

    /// Load the task behind `<dir>/<id>.task`, annotated with `id`.
    ///
    /// A link whose target is gone is an error, not a skip.
    pub fn resolve(&self, dir: &Path, id: LinkId) -> Result<LinkedTask> {
        let target = self.target_of(dir, id)?;
        let task = self.store.read_by_path(&target)?;
        Ok(LinkedTask { id, task })
    }

    /// Move the link for `id` from `from` to the lowest free id in `to`.
    pub fn move_link(&self, from: &Path, to: &Path, id: LinkId) -> Result<LinkId> {
        let old_path = Self::link_path(from, id);
        let current = fs::read_link(&old_path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => not_linked(from, id),
            _ => Error::io(format!("reading link {}", old_path.display()), e),
        })?;

        let new_id = self.allocate_id(to)?;
        let new_path = Self::link_path(to, new_id);

        let rebased = if current.is_absolute() {
            current.clone()
        } else {
            relative_path(to, &normalize(&from.join(&current)))
        };

        if rebased == current {
            if new_path.symlink_metadata().is_ok() {
                return Err(Error::AlreadyLinked(new_path));
            }
            fs::rename(&old_path, &new_path).with_context(|| {
                format!("moving {} to {}", old_path.display(), new_path.display())
            })?;
        } else {
            // Directories sit at different depths relative to the store:
            // write a fresh link with the recomputed target, then drop the old one.
            match symlink_file(&rebased, &new_path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    return Err(Error::AlreadyLinked(new_path));
                }
                Err(e) => return Err(Error::io(format!("linking {}", new_path.display()), e)),
            }
            fs::remove_file(&old_path)
                .with_context(|| format!("unlinking {}", old_path.display()))?;
        }

        tracing::debug!(
            from = %old_path.display(),
            to = %new_path.display(),
            "link moved"
        );
        Ok(new_id)
    }

    /// Resolve every link in `dir`, in directory order.
    pub fn list_in(&self, dir: &Path) -> Result<Vec<LinkedTask>> {
        self.ids_in(dir)?
            .into_iter()
            .map(|id| self.resolve(dir, id))
            .collect()
    }

    /// Store path a link points at, made absolute.
    pub fn target_of(&self, dir: &Path, id: LinkId) -> Result<PathBuf> {
        let path = Self::link_path(dir, id);
        let target = fs::read_link(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => not_linked(dir, id),
            _ => Error::io(format!("reading link {}", path.display()), e),
        })?;
        if target.is_absolute() {
            Ok(target)
        } else {
            Ok(dir.join(target))
        }
    }

    fn ids_in(&self, dir: &Path) -> Result<Vec<LinkId>> {
        let entries = fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))?;
        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("listing {}", dir.display()))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            let Some(stem) = name.strip_suffix(TASK_EXT) else {
                continue;
            };
            let id: LinkId = stem.parse().map_err(|_| {
                Error::InvalidId(format!("unexpected entry {name} in {}", dir.display()))
            })?;
            ids.push(id);
        }
        Ok(ids)
    }
}

fn not_linked(dir: &Path, id: LinkId) -> Error {
    Error::NotFound(format!("no task with id {id} in {}", dir.display()))
}

#[cfg(unix)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_file(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

/// Lexically drop `.` and fold `..` into the preceding component.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Path to `target` as seen from inside `base`. Both must be absolute.
pub fn relative_path(base: &Path, target: &Path) -> PathBuf {
    let base = normalize(base);
    let target = normalize(target);
    let base_parts: Vec<_> = base.components().collect();
    let target_parts: Vec<_> = target.components().collect();

    let common = base_parts
        .iter()
        .zip(target_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..base_parts.len() {
        out.push("..");
    }
    for part in &target_parts[common..] {
        out.push(part.as_os_str());
    }
    out
}
