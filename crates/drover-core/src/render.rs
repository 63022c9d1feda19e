use std::io::{self, IsTerminal, Write};

use drover_shared::{RequestParent, SingularityRequest, TaskCleanup};
use unicode_width::UnicodeWidthStr;

use crate::columns::{Column, columns_for};
use crate::config::Config;
use crate::derive::TaskListView;
use crate::launcher::LaunchOutcome;
use crate::model::TaskStatus;

pub const NO_MATCHING_TASKS: &str = "No matching tasks";

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> Self {
        Self {
            color: cfg.get_bool("color").unwrap_or(true),
        }
    }

    #[tracing::instrument(skip(self, view))]
    pub fn print_task_view(&mut self, status: TaskStatus, view: &TaskListView) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        let rows = match view {
            TaskListView::Loading => {
                writeln!(out, "Loading...")?;
                return Ok(());
            }
            TaskListView::Empty => {
                writeln!(out, "{NO_MATCHING_TASKS}")?;
                return Ok(());
            }
            TaskListView::Rows(rows) => rows,
        };

        let columns = columns_for(status);
        let headers = columns
            .iter()
            .map(|column| column.header().to_string())
            .collect::<Vec<_>>();

        let cells = rows
            .iter()
            .map(|task| {
                columns
                    .iter()
                    .map(|column| {
                        let cell = column.cell(task);
                        match column {
                            Column::TaskId | Column::ScheduledTaskId => self.paint(&cell, "33"),
                            Column::Actions(_) => self.paint(&cell, "31"),
                            _ => cell,
                        }
                    })
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        write_table(&mut out, headers, cells)?;
        Ok(())
    }

    pub fn print_json<T: serde::Serialize>(&mut self, value: &T) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
        Ok(())
    }

    pub fn print_lines(&mut self, lines: &[String]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        for line in lines {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    pub fn print_kill_result(&mut self, cleanup: &TaskCleanup) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(
            out,
            "{} {} ({})",
            self.paint("killing", "31"),
            cleanup.task_id.id,
            cleanup.cleanup_type
        )?;
        Ok(())
    }

    pub fn print_run_result(&mut self, response: &RequestParent) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        let run_id = response
            .pending_request
            .as_ref()
            .and_then(|pending| pending.run_id.clone())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "triggered {} (run {})",
            self.paint(&response.request.id, "33"),
            run_id
        )?;
        Ok(())
    }

    pub fn print_launch(&mut self, outcome: &LaunchOutcome) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "task      {}", outcome.task_id.id)?;
        writeln!(out, "host      {}", outcome.task_id.host)?;
        if let Some(state) = outcome
            .history
            .as_ref()
            .and_then(|history| history.last_task_state.as_deref())
        {
            writeln!(out, "state     {state}")?;
        }
        if let Some(file) = &outcome.tail_file {
            writeln!(out, "tail      {} ({} bytes)", file.name, file.size)?;
        }
        writeln!(out, "open      {}", outcome.route)?;
        Ok(())
    }

    pub fn print_removed(&mut self, request: &SingularityRequest) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{} {}", self.paint("removed", "31"), request.id)?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
