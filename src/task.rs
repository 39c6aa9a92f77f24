//! Tasks and their pending/completed lifecycle.
//!
//! A task file lives in the store for good. What moves is its link: it
//! starts in `pending-tasks/`, moves to `completed-tasks/` on completion
//! and back on continue, picking up the lowest free id each time.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::datetime::TaskDate;
use crate::error::{Error, Result};
use crate::kvfile::{Field, FieldKind, FieldValue, Record};
use crate::link::{LinkId, LinkManager};
use crate::sort::{sort_tasks, SortKey};
use crate::storage::Storage;
use crate::store::TaskStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Completed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Pending => write!(f, "pending"),
            TaskState::Completed => write!(f, "completed"),
        }
    }
}

/// Canonical task record
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Task {
    pub uuid: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<TaskDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_date: Option<TaskDate>,
}

impl Task {
    /// True when the wait date is still ahead of `now` (local wall clock).
    pub fn is_waiting(&self, now: NaiveDateTime) -> bool {
        self.wait_date.is_some_and(|wait| wait.is_after(now))
    }
}

// The uuid is not persisted: it is the file name.
const TASK_FIELDS: &[Field<Task>] = &[
    Field {
        key: "title",
        kind: FieldKind::Text,
        required: true,
        get: |t| Some(FieldValue::Text(t.title.clone())),
        set: |t, v| {
            if let FieldValue::Text(s) = v {
                t.title = s;
            }
        },
    },
    Field {
        key: "created_at",
        kind: FieldKind::Timestamp,
        required: true,
        get: |t| Some(FieldValue::Timestamp(t.created_at)),
        set: |t, v| {
            if let FieldValue::Timestamp(ts) = v {
                t.created_at = ts;
            }
        },
    },
    Field {
        key: "completed_at",
        kind: FieldKind::Timestamp,
        required: false,
        get: |t| t.completed_at.map(FieldValue::Timestamp),
        set: |t, v| {
            if let FieldValue::Timestamp(ts) = v {
                t.completed_at = Some(ts);
            }
        },
    },
    Field {
        key: "due_date",
        kind: FieldKind::Date,
        required: false,
        get: |t| t.due_date.map(FieldValue::Date),
        set: |t, v| {
            if let FieldValue::Date(d) = v {
                t.due_date = Some(d);
            }
        },
    },
    Field {
        key: "wait_date",
        kind: FieldKind::Date,
        required: false,
        get: |t| t.wait_date.map(FieldValue::Date),
        set: |t, v| {
            if let FieldValue::Date(d) = v {
                t.wait_date = Some(d);
            }
        },
    },
];

impl Record for Task {
    fn schema() -> &'static [Field<Self>] {
        TASK_FIELDS
    }
}

/// A task as seen through one state directory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedTask {
    pub id: LinkId,
    #[serde(flatten)]
    pub task: Task,
}

/// Input for [`Tracker::add`]
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub due_date: Option<TaskDate>,
    pub wait_date: Option<TaskDate>,
}

/// Changes for [`Tracker::edit`]. `Some(None)` clears a date.
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub due_date: Option<Option<TaskDate>>,
    pub wait_date: Option<Option<TaskDate>>,
}

impl TaskEdit {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.due_date.is_none() && self.wait_date.is_none()
    }
}

/// Result of moving one task between states
#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    pub from_id: LinkId,
    pub to_id: LinkId,
    pub to: TaskState,
    pub task: Task,
}

/// Add/complete/continue/list over one yap home
#[derive(Debug, Clone)]
pub struct Tracker {
    storage: Storage,
    links: LinkManager,
}

impl Tracker {
    pub fn new(storage: Storage) -> Self {
        let links = LinkManager::new(TaskStore::new(storage.tasks_dir()));
        Self { storage, links }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn links(&self) -> &LinkManager {
        &self.links
    }

    pub fn store(&self) -> &TaskStore {
        self.links.store()
    }

    pub fn add(&self, new: NewTask) -> Result<LinkedTask> {
        self.add_at(new, Utc::now())
    }

    /// Create a pending task stamped with `now`.
    pub fn add_at(&self, new: NewTask, now: DateTime<Utc>) -> Result<LinkedTask> {
        let title = validate_title(&new.title)?;
        let task = Task {
            uuid: Uuid::new_v4(),
            title,
            created_at: now,
            completed_at: None,
            due_date: new.due_date,
            wait_date: new.wait_date,
        };

        let pending = self.storage.pending_dir();
        let id = self.links.allocate_id(&pending)?;
        self.store().write(&task)?;
        self.links.link(&pending, id, &task.uuid)?;

        tracing::info!(id = %id, uuid = %task.uuid, "task added");
        Ok(LinkedTask { id, task })
    }

    pub fn complete(&self, ids: &[LinkId]) -> Result<Vec<Transition>> {
        self.complete_at(ids, Utc::now())
    }

    /// Complete pending tasks one after another. A failure stops the
    /// batch; tasks handled before it stay completed.
    pub fn complete_at(&self, ids: &[LinkId], now: DateTime<Utc>) -> Result<Vec<Transition>> {
        unique(ids)
            .into_iter()
            .map(|id| {
                self.transition(id, TaskState::Pending, TaskState::Completed, |task| {
                    task.completed_at = Some(now);
                })
            })
            .collect()
    }

    /// Move completed tasks back to pending, clearing `completed_at`.
    /// Same partial-batch behaviour as [`Tracker::complete_at`].
    pub fn continue_tasks(&self, ids: &[LinkId]) -> Result<Vec<Transition>> {
        unique(ids)
            .into_iter()
            .map(|id| {
                self.transition(id, TaskState::Completed, TaskState::Pending, |task| {
                    task.completed_at = None;
                })
            })
            .collect()
    }

    fn transition(
        &self,
        id: LinkId,
        from: TaskState,
        to: TaskState,
        update: impl FnOnce(&mut Task),
    ) -> Result<Transition> {
        let from_dir = self.storage.state_dir(from);
        let to_dir = self.storage.state_dir(to);

        let LinkedTask { task: before, .. } = self.links.resolve(&from_dir, id)?;
        let mut task = before.clone();
        update(&mut task);
        self.store().write(&task)?;
        let to_id = match self.links.move_link(&from_dir, &to_dir, id) {
            Ok(to_id) => to_id,
            Err(err) => {
                // The link stayed in `from`; put the record back to match it.
                if let Err(restore) = self.store().write(&before) {
                    tracing::warn!(uuid = %before.uuid, error = %restore, "could not restore task record");
                }
                return Err(err);
            }
        };

        tracing::info!(from = %id, to = %to_id, state = %to, uuid = %task.uuid, "task moved");
        Ok(Transition {
            from_id: id,
            to_id,
            to,
            task,
        })
    }

    /// Look up one task by its id in `state`.
    pub fn get(&self, state: TaskState, id: LinkId) -> Result<LinkedTask> {
        self.links.resolve(&self.storage.state_dir(state), id)
    }

    /// Rewrite a pending task in place; id and uuid stay the same.
    pub fn edit(&self, id: LinkId, edit: TaskEdit) -> Result<LinkedTask> {
        if edit.is_empty() {
            return Err(Error::InvalidArgument("nothing to edit".to_string()));
        }
        let mut linked = self.get(TaskState::Pending, id)?;
        if let Some(title) = edit.title {
            linked.task.title = validate_title(&title)?;
        }
        if let Some(due) = edit.due_date {
            linked.task.due_date = due;
        }
        if let Some(wait) = edit.wait_date {
            linked.task.wait_date = wait;
        }
        self.store().write(&linked.task)?;
        tracing::info!(id = %id, uuid = %linked.task.uuid, "task edited");
        Ok(linked)
    }

    pub fn list_pending(&self) -> Result<Vec<LinkedTask>> {
        self.list_pending_at(Utc::now())
    }

    /// Pending tasks not waiting past `now`, newest first.
    pub fn list_pending_at(&self, now: DateTime<Utc>) -> Result<Vec<LinkedTask>> {
        let now = local_wall_clock(now);
        let mut tasks = self.links.list_in(&self.storage.pending_dir())?;
        tasks.retain(|t| !t.task.is_waiting(now));
        sort_tasks(&mut tasks, SortKey::Created);
        Ok(tasks)
    }

    pub fn list_waiting(&self) -> Result<Vec<LinkedTask>> {
        self.list_waiting_at(Utc::now())
    }

    /// Pending tasks whose wait date is still ahead of `now`, soonest first.
    pub fn list_waiting_at(&self, now: DateTime<Utc>) -> Result<Vec<LinkedTask>> {
        let now = local_wall_clock(now);
        let mut tasks = self.links.list_in(&self.storage.pending_dir())?;
        tasks.retain(|t| t.task.is_waiting(now));
        sort_tasks(&mut tasks, SortKey::Wait);
        Ok(tasks)
    }

    /// Completed tasks, most recently completed first.
    pub fn list_completed(&self) -> Result<Vec<LinkedTask>> {
        let mut tasks = self.links.list_in(&self.storage.completed_dir())?;
        sort_tasks(&mut tasks, SortKey::Completed);
        Ok(tasks)
    }
}

fn local_wall_clock(now: DateTime<Utc>) -> NaiveDateTime {
    now.with_timezone(&Local).naive_local()
}

fn unique(ids: &[LinkId]) -> Vec<LinkId> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::InvalidArgument("title cannot be empty".to_string()));
    }
    if title.contains(['\n', '\r']) {
        return Err(Error::InvalidArgument(
            "title must be a single line".to_string(),
        ));
    }
    Ok(title.to_string())
}
