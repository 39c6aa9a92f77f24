//! Canonical task records, one `<uuid>.task` file each.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{Error, IoContext, Result};
use crate::kvfile;
use crate::lock::write_atomic;
use crate::task::Task;

pub const TASK_EXT: &str = ".task";

/// Owner of the `tasks/` directory
#[derive(Debug, Clone)]
pub struct TaskStore {
    dir: PathBuf,
}

impl TaskStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, uuid: &Uuid) -> PathBuf {
        self.dir.join(format!("{}{TASK_EXT}", uuid.as_hyphenated()))
    }

    /// Create or replace the record for `task`.
    pub fn write(&self, task: &Task) -> Result<PathBuf> {
        let path = self.path_for(&task.uuid);
        let text = kvfile::encode(task)?;
        write_atomic(&path, text.as_bytes())?;
        tracing::debug!(uuid = %task.uuid, path = %path.display(), "task written");
        Ok(path)
    }

    pub fn read_by_uuid(&self, uuid: &Uuid) -> Result<Task> {
        self.read_by_path(self.path_for(uuid))
    }

    /// Read a record file. The uuid comes from the file name, not from
    /// anything inside the file.
    pub fn read_by_path(&self, path: impl AsRef<Path>) -> Result<Task> {
        let path = path.as_ref();
        let uuid = uuid_from_path(path)?;
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(format!(
                    "task {uuid} is missing from the store ({})",
                    path.display()
                )));
            }
            Err(e) => return Err(Error::io(format!("reading {}", path.display()), e)),
        };
        let mut task: Task = kvfile::decode(&text).map_err(|e| match e {
            Error::InvalidRecordFormat(msg) => {
                Error::InvalidRecordFormat(format!("{}: {msg}", path.display()))
            }
            other => other,
        })?;
        task.uuid = uuid;
        Ok(task)
    }

    /// Every task in the store. One unreadable file fails the whole call.
    pub fn list_all(&self) -> Result<Vec<Task>> {
        let pattern = self.dir.join(format!("*{TASK_EXT}"));
        let pattern = pattern.to_string_lossy();
        let paths = glob::glob(&pattern)
            .map_err(|e| Error::OperationFailed(format!("bad store pattern {pattern}: {e}")))?;

        let mut tasks = Vec::new();
        for entry in paths {
            let path = entry.map_err(|e| {
                let context = format!("listing {}", e.path().display());
                Error::io(context, e.into_error())
            })?;
            tasks.push(self.read_by_path(&path)?);
        }
        Ok(tasks)
    }
}

fn uuid_from_path(path: &Path) -> Result<Uuid> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidRecordFormat(format!("bad task path {}", path.display())))?;
    let stem = name.strip_suffix(TASK_EXT).ok_or_else(|| {
        Error::InvalidRecordFormat(format!("{name} does not end in {TASK_EXT}"))
    })?;
    Uuid::parse_str(stem)
        .map_err(|e| Error::InvalidRecordFormat(format!("{name} is not named by a uuid: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn sample(title: &str) -> Task {
        Task {
            uuid: Uuid::new_v4(),
            title: title.to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap(),
            completed_at: None,
            due_date: None,
            wait_date: None,
        }
    }

    fn store() -> (TempDir, TaskStore) {
        let temp = TempDir::new().unwrap();
        let store = TaskStore::new(temp.path());
        (temp, store)
    }

    #[test]
    fn write_then_read() {
        let (_temp, store) = store();
        let task = sample("buy milk");
        let path = store.write(&task).unwrap();

        assert!(path.ends_with(format!("{}.task", task.uuid)));
        assert_eq!(store.read_by_uuid(&task.uuid).unwrap(), task);
        assert_eq!(store.read_by_path(&path).unwrap(), task);
    }

    #[test]
    fn odd_titles_read_back_unchanged() {
        let (_temp, store) = store();
        for title in ["", "buy milk ", "  indented"] {
            let task = sample(title);
            store.write(&task).unwrap();
            assert_eq!(store.read_by_uuid(&task.uuid).unwrap(), task);
        }
        assert_eq!(store.list_all().unwrap().len(), 3);
    }

    #[test]
    fn rewrite_replaces_whole_file() {
        let (_temp, store) = store();
        let mut task = sample("draft");
        task.completed_at = Some(Utc::now());
        store.write(&task).unwrap();

        task.completed_at = None;
        store.write(&task).unwrap();

        let text = fs::read_to_string(store.path_for(&task.uuid)).unwrap();
        assert!(!text.contains("completed_at"));
    }

    #[test]
    fn uuid_comes_from_file_name() {
        let (_temp, store) = store();
        let task = sample("renamed");
        let path = store.write(&task).unwrap();

        let other = Uuid::new_v4();
        let moved = store.path_for(&other);
        fs::rename(&path, &moved).unwrap();

        let read = store.read_by_path(&moved).unwrap();
        assert_eq!(read.uuid, other);
        assert_eq!(read.title, "renamed");
    }

    #[test]
    fn missing_task_is_not_found() {
        let (_temp, store) = store();
        let err = store.read_by_uuid(&Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn non_uuid_name_is_rejected() {
        let (temp, store) = store();
        let path = temp.path().join("12.task");
        fs::write(&path, "title x\ncreated_at 2026-10-01T08:00:00Z\n").unwrap();
        let err = store.read_by_path(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidRecordFormat(_)));
    }

    #[test]
    fn list_all_reads_every_task() {
        let (temp, store) = store();
        let a = sample("a");
        let b = sample("b");
        store.write(&a).unwrap();
        store.write(&b).unwrap();
        fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

        let mut titles: Vec<_> = store.list_all().unwrap().into_iter().map(|t| t.title).collect();
        titles.sort();
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[test]
    fn list_all_fails_on_one_bad_file() {
        let (_temp, store) = store();
        store.write(&sample("fine")).unwrap();
        fs::write(
            store.path_for(&Uuid::new_v4()),
            "title odd\ncreated_at 2026-10-01T08:00:00Z\nmystery value\n",
        )
        .unwrap();

        let err = store.list_all().unwrap_err();
        assert!(matches!(err, Error::InvalidRecordFormat(m) if m.contains("unknown key: mystery")));
    }
}
