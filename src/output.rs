//! Shared output formatting for yap CLI commands.

use serde::Serialize;

use crate::error::{Error, Result};

pub const SCHEMA_VERSION: &str = "yap.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// What a command prints when `--json` is off
#[derive(Debug, Clone)]
pub enum Human {
    /// A bare line, e.g. the id printed by `add`
    Line(String),
    Report(HumanOutput),
    Table(Table),
}

#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }
}

/// Plain-text table with a header row and left-aligned columns
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(render_row(&self.headers, &widths));
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("  "),
        );
        for row in &self.rows {
            lines.push(render_row(row, &widths));
        }
        lines.join("\n")
    }
}

fn render_row(cells: &[String], widths: &[usize]) -> String {
    let mut out = String::new();
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(cell);
        if i + 1 < widths.len() {
            let pad = width.saturating_sub(cell.chars().count());
            out.push_str(&" ".repeat(pad));
        }
    }
    out
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&Human>,
) -> Result<()> {
    if options.json {
        #[derive(Serialize)]
        struct Envelope<'a, T: Serialize> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            data: &'a T,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }

    match human {
        Some(Human::Line(line)) => println!("{line}"),
        Some(Human::Report(report)) => println!("{}", format_human(report)),
        Some(Human::Table(table)) => println!("{}", table.render()),
        None => {}
    }

    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);
    if json {
        #[derive(Serialize)]
        struct ErrorBody<'a> {
            message: &'a str,
            code: i32,
            kind: &'static str,
        }

        #[derive(Serialize)]
        struct Envelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            error: ErrorBody<'a>,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            next_steps: Vec<String>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: ErrorBody {
                message: &err.to_string(),
                code: err.exit_code(),
                kind: error_kind(err),
            },
            next_steps,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = next_steps.first() {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = vec![output.header.clone()];

    if !output.summary.is_empty() {
        let width = output
            .summary
            .iter()
            .map(|(key, _)| key.chars().count())
            .max()
            .unwrap_or(0);
        for (key, value) in &output.summary {
            lines.push(format!("{key:<width$}  {value}"));
        }
    }

    lines.join("\n")
}

/// Best-effort subcommand name for error envelopes, read from argv
pub fn infer_command_name_from_args() -> String {
    command_name_from(std::env::args().skip(1))
}

fn command_name_from(args: impl IntoIterator<Item = String>) -> String {
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--home" {
            args.next();
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        return arg;
    }
    "list".to_string()
}

fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        2 => "user_error",
        3 => "blocked",
        _ => "operation_failed",
    }
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::LockHeld(_) => vec!["wait for the other yap command to finish".to_string()],
        Error::NotFound(_) | Error::InvalidId(_) => vec!["yap list pending".to_string()],
        Error::InvalidDate(_) => {
            vec!["use YYYY-MM-DD, HH:MM, \"YYYY-MM-DD HH:MM\", today or tomorrow".to_string()]
        }
        Error::InvalidConfig(_) => vec!["fix config.toml in the yap home then retry".to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn table_aligns_columns() {
        let mut table = Table::new(["ID", "Title"]);
        table.push_row(["1", "buy milk"]);
        table.push_row(["12", "call the plumber"]);
        assert_eq!(
            table.render(),
            "ID  Title\n--  ----------------\n1   buy milk\n12  call the plumber"
        );
    }

    #[test]
    fn empty_table_still_has_header() {
        let table = Table::new(["ID", "Due", "Title"]);
        assert_eq!(table.render().lines().count(), 2);
    }

    #[test]
    fn human_report_lists_summary() {
        let mut report = HumanOutput::new("Task 3");
        report.push_summary("Title", "water flowers");
        report.push_summary("Due", "2026-10-20");
        assert_eq!(
            format_human(&report),
            "Task 3\nTitle  water flowers\nDue    2026-10-20"
        );
    }

    #[test]
    fn command_name_skips_home_value() {
        assert_eq!(command_name_from(args(&["--home", "/tmp/x", "add", "milk"])), "add");
        assert_eq!(command_name_from(args(&["--json", "complete", "1"])), "complete");
        assert_eq!(command_name_from(args(&[])), "list");
    }

    #[test]
    fn error_hints() {
        assert_eq!(
            error_next_steps(&Error::NotFound("x".to_string())),
            vec!["yap list pending".to_string()]
        );
        assert_eq!(error_kind(&Error::LockHeld("/tmp/.lock".into())), "blocked");
    }
}
