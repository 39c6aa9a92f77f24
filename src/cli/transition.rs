//! yap complete / continue command implementation

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::{load_context, parse_ids};
use crate::error::Result;
use crate::link::LinkId;
use crate::output::{emit_success, OutputOptions};
use crate::task::{Tracker, Transition};

pub struct TransitionOptions {
    pub ids: Vec<String>,
    pub home: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct TransitionOutput {
    transitions: Vec<Transition>,
}

pub fn run_complete(options: TransitionOptions) -> Result<()> {
    run(options, "complete", Tracker::complete)
}

pub fn run_continue(options: TransitionOptions) -> Result<()> {
    run(options, "continue", Tracker::continue_tasks)
}

fn run(
    options: TransitionOptions,
    command: &str,
    apply: fn(&Tracker, &[LinkId]) -> Result<Vec<Transition>>,
) -> Result<()> {
    let ids = parse_ids(&options.ids)?;
    let ctx = load_context(options.home)?;
    let transitions = apply(&ctx.tracker, &ids)?;
    drop(ctx);

    // Silent on success unless JSON was asked for.
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        command,
        &TransitionOutput { transitions },
        None,
    )
}
