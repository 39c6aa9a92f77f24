//! yap list command implementation

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::{format_date, format_timestamp, load_context, ListKind};
use crate::error::Result;
use crate::output::{emit_success, Human, OutputOptions, Table};
use crate::sort::{sort_tasks, SortKey};
use crate::task::LinkedTask;

pub struct ListOptions {
    pub kind: ListKind,
    pub sort: Option<SortKey>,
    pub limit: Option<usize>,
    pub home: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct TaskListOutput {
    kind: &'static str,
    total: usize,
    tasks: Vec<LinkedTask>,
}

pub fn run(options: ListOptions) -> Result<()> {
    let ctx = load_context(options.home)?;
    let tracker = &ctx.tracker;

    let (mut tasks, default_limit, configured_sort) = match options.kind {
        ListKind::Pending => (
            tracker.list_pending()?,
            0,
            Some(ctx.config.list.pending_sort).filter(|key| *key != SortKey::Created),
        ),
        ListKind::Completed => (
            tracker.list_completed()?,
            ctx.config.list.completed_limit,
            None,
        ),
        ListKind::Waiting => (tracker.list_waiting()?, 0, None),
    };
    drop(ctx);

    if let Some(key) = options.sort.or(configured_sort) {
        sort_tasks(&mut tasks, key);
    }
    let total = tasks.len();
    match options.limit.unwrap_or(default_limit) {
        0 => {}
        limit => tasks.truncate(limit),
    }

    let table = render_table(options.kind, &tasks);
    let output = TaskListOutput {
        kind: kind_name(options.kind),
        total,
        tasks,
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "list",
        &output,
        Some(&Human::Table(table)),
    )
}

fn kind_name(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Pending => "pending",
        ListKind::Completed => "completed",
        ListKind::Waiting => "waiting",
    }
}

fn render_table(kind: ListKind, tasks: &[LinkedTask]) -> Table {
    match kind {
        ListKind::Pending => {
            let mut table = Table::new(["ID", "Due", "Title"]);
            for t in tasks {
                table.push_row([
                    t.id.to_string(),
                    format_date(t.task.due_date.as_ref()),
                    t.task.title.clone(),
                ]);
            }
            table
        }
        ListKind::Completed => {
            let mut table = Table::new(["ID", "Completed", "Due", "Title"]);
            for t in tasks {
                table.push_row([
                    t.id.to_string(),
                    t.task
                        .completed_at
                        .as_ref()
                        .map(format_timestamp)
                        .unwrap_or_default(),
                    format_date(t.task.due_date.as_ref()),
                    t.task.title.clone(),
                ]);
            }
            table
        }
        ListKind::Waiting => {
            let mut table = Table::new(["ID", "Wait", "Due", "Title"]);
            for t in tasks {
                table.push_row([
                    t.id.to_string(),
                    format_date(t.task.wait_date.as_ref()),
                    format_date(t.task.due_date.as_ref()),
                    t.task.title.clone(),
                ]);
            }
            table
        }
    }
}
