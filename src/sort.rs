//! Orderings for task lists.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::task::LinkedTask;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Newest first
    Created,
    /// Most recently completed first
    Completed,
    /// Soonest wait date first
    Wait,
    /// Soonest due date first
    Due,
}

/// Stable sort of `tasks` by `key`. Tasks without the relevant date go last.
pub fn sort_tasks(tasks: &mut [LinkedTask], key: SortKey) {
    match key {
        SortKey::Created => tasks.sort_by(|a, b| b.task.created_at.cmp(&a.task.created_at)),
        SortKey::Completed => {
            tasks.sort_by(|a, b| none_last(a.task.completed_at, b.task.completed_at, true))
        }
        SortKey::Wait => tasks.sort_by(|a, b| none_last(a.task.wait_date, b.task.wait_date, false)),
        SortKey::Due => tasks.sort_by(|a, b| {
            none_last(a.task.due_date, b.task.due_date, false)
                .then_with(|| b.task.created_at.cmp(&a.task.created_at))
        }),
    }
}

fn none_last<T: Ord>(a: Option<T>, b: Option<T>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
