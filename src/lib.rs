//! yap - yet another planner
//!
//! Library behind the `yap` CLI. Tasks live as key-value record files in
//! a home directory; pending and completed tasks are reached through
//! small numeric ids implemented as symlinks.
//!
//! # Layout
//!
//! ```text
//! <home>/
//!   tasks/<uuid>.task             canonical records
//!   pending-tasks/<id>.task       -> ../tasks/<uuid>.task
//!   completed-tasks/<id>.task     -> ../tasks/<uuid>.task
//!   .lock                         single-instance lock
//!   config.toml                   optional settings
//! ```
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Home resolution and `config.toml`
//! - `datetime`: Due/wait dates with optional time of day
//! - `error`: Error types, exit codes and result alias
//! - `kvfile`: Schema-driven `key value` record codec
//! - `link`: Small-id allocation and symlink management
//! - `lock`: Instance lock and atomic writes
//! - `output`: Human and JSON output
//! - `sort`: Task orderings
//! - `storage`: Home directory layout
//! - `store`: Canonical record files
//! - `task`: Task model and lifecycle operations

pub mod cli;
pub mod config;
pub mod datetime;
pub mod error;
pub mod kvfile;
pub mod link;
pub mod lock;
pub mod output;
pub mod sort;
pub mod storage;
pub mod store;
pub mod task;

pub use error::{Error, Result};
