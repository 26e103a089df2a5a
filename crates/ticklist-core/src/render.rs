use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use ticklist_shared::{Checklist, Task};
use unicode_width::UnicodeWidthStr;

use crate::config::Config;

const STRIKE: &str = "9";
const DIM: &str = "2";
const ID: &str = "33";

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self::with_color(color && io::stdout().is_terminal()))
    }

    pub fn with_color(color: bool) -> Self {
        Self { color }
    }

    #[tracing::instrument(skip(self, checklist), fields(rows = checklist.len()))]
    pub fn print_checklist(&mut self, checklist: &Checklist) -> anyhow::Result<()> {
        let out = io::stdout().lock();
        self.write_checklist(out, checklist)
    }

    /// Draws the whole list from scratch: marker, id, text. Completed
    /// rows are struck through when color is on.
    pub fn write_checklist<W: Write>(&self, mut out: W, checklist: &Checklist) -> anyhow::Result<()> {
        if checklist.is_empty() {
            writeln!(out, "No tasks.")?;
            return Ok(());
        }

        let headers = vec!["".to_string(), "ID".to_string(), "Task".to_string()];
        let rows = checklist
            .rows
            .iter()
            .map(|row| {
                let marker = if row.completed { "[x]" } else { "[ ]" };
                let text = if row.struck() {
                    self.paint(&self.paint(&row.text, DIM), STRIKE)
                } else {
                    row.text.clone()
                };
                vec![marker.to_string(), self.paint(&row.id.to_string(), ID), text]
            })
            .collect();

        write_table(&mut out, headers, rows)?;
        writeln!(out)?;
        writeln!(
            out,
            "{} task(s), {} completed",
            checklist.len(),
            checklist.completed_count()
        )?;
        Ok(())
    }

    #[tracing::instrument(skip(self, task), fields(id = task.id))]
    pub fn print_task_info(&mut self, task: &Task) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "id         {}", task.id)?;
        writeln!(out, "task       {}", task.text)?;
        writeln!(
            out,
            "completed  {}",
            if task.completed { "yes" } else { "no" }
        )?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
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

    let last = column_count.saturating_sub(1);
    for (idx, header) in headers.iter().enumerate() {
        if idx == last {
            writeln!(writer, "{header}")?;
        } else {
            write!(writer, "{:width$} ", header, width = widths[idx])?;
        }
    }

    for (idx, width) in widths.iter().enumerate() {
        if idx == last {
            writeln!(writer, "{:-<width$}", "", width = width)?;
        } else {
            write!(writer, "{:-<width$} ", "", width = width)?;
        }
    }

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if idx == last {
                writeln!(writer, "{cell}")?;
                continue;
            }
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
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

#[cfg(test)]
mod tests {
    use ticklist_shared::{Checklist, InteractionMode, Task};

    use super::{Renderer, strip_ansi};

    fn tasks() -> Vec<Task> {
        vec![
            Task {
                id: 1,
                text: "Buy milk".to_string(),
                completed: false,
            },
            Task {
                id: 12,
                text: "Café run".to_string(),
                completed: true,
            },
        ]
    }

    fn render(color: bool, tasks: &[Task]) -> String {
        let checklist = Checklist::build(tasks, InteractionMode::Checkbox);
        let mut buf = Vec::new();
        Renderer::with_color(color)
            .write_checklist(&mut buf, &checklist)
            .expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn plain_checklist_layout() {
        let out = render(false, &tasks());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "    ID Task");
        assert_eq!(lines[1], "--- -- --------");
        assert_eq!(lines[2], "[ ] 1  Buy milk");
        assert_eq!(lines[3], "[x] 12 Café run");
        assert_eq!(lines[5], "2 task(s), 1 completed");
    }

    #[test]
    fn completed_rows_are_struck_when_colored() {
        let out = render(true, &tasks());
        assert!(out.contains("\x1b[9m"));
        assert!(!out.contains("\x1b[9m\x1b[2mBuy milk"));
        assert_eq!(strip_ansi(&out), render(false, &tasks()));
    }

    #[test]
    fn empty_list_message() {
        assert_eq!(render(false, &[]), "No tasks.\n");
    }
}
