//! yap show command implementation

use std::path::PathBuf;

use crate::cli::{format_date, format_timestamp, load_context};
use crate::error::Result;
use crate::output::{emit_success, Human, HumanOutput, OutputOptions};
use crate::task::{LinkedTask, TaskState};

pub struct ShowOptions {
    pub id: String,
    pub completed: bool,
    pub home: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub fn run(options: ShowOptions) -> Result<()> {
    let id = options.id.parse()?;
    let state = if options.completed {
        TaskState::Completed
    } else {
        TaskState::Pending
    };

    let ctx = load_context(options.home)?;
    let linked = ctx.tracker.get(state, id)?;
    drop(ctx);

    let human = Human::Report(task_report(&linked, state));
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "show",
        &linked,
        Some(&human),
    )
}

/// Field-per-line view shared with `edit`
pub(super) fn task_report(linked: &LinkedTask, state: TaskState) -> HumanOutput {
    let task = &linked.task;
    let mut report = HumanOutput::new(format!("Task {}", linked.id));
    report.push_summary("UUID", task.uuid.to_string());
    report.push_summary("State", state.to_string());
    report.push_summary("Title", task.title.clone());
    report.push_summary("Created", format_timestamp(&task.created_at));
    if let Some(completed) = &task.completed_at {
        report.push_summary("Completed", format_timestamp(completed));
    }
    if task.due_date.is_some() {
        report.push_summary("Due", format_date(task.due_date.as_ref()));
    }
    if task.wait_date.is_some() {
        report.push_summary("Wait", format_date(task.wait_date.as_ref()));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::LinkId;
    use crate::output::format_human;
    use crate::task::Task;
    use chrono::Utc;

    #[test]
    fn report_skips_unset_dates() {
        let linked = LinkedTask {
            id: LinkId::new(4).unwrap(),
            task: Task {
                title: "call the plumber".to_string(),
                created_at: Utc::now(),
                wait_date: Some("2026-11-01".parse().unwrap()),
                ..Default::default()
            },
        };
        let text = format_human(&task_report(&linked, TaskState::Pending));
        assert!(text.starts_with("Task 4\n"));
        assert!(text.contains("State    pending"));
        assert!(text.contains("Wait     2026-11-01"));
        assert!(!text.contains("Due"));
        assert!(!text.contains("Completed"));
    }
}
