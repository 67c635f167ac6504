// Table rendering for task listings

use crate::filter::TaskRow;
use crate::task::Status;
use colored::Colorize;
use std::fmt::Write;

const HEADERS: [&str; 3] = ["#", "Title", "Status"];

/// Render rows as a three-column table (`#`, `Title`, `Status`)
///
/// With `color` set, status labels are painted green (Done) or yellow (Pending).
pub fn render_table(rows: &[TaskRow], color: bool) -> String {
    let pos_width = rows
        .iter()
        .map(|r| r.position.to_string().len())
        .chain(std::iter::once(HEADERS[0].len()))
        .max()
        .unwrap_or(1);
    let title_width = rows
        .iter()
        .map(|r| r.title.chars().count())
        .chain(std::iter::once(HEADERS[1].len()))
        .max()
        .unwrap_or(5);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>pw$}  {:<tw$}  {}",
        HEADERS[0],
        HEADERS[1],
        HEADERS[2],
        pw = pos_width,
        tw = title_width
    );

    if rows.is_empty() {
        out.push_str("(no tasks)\n");
        return out;
    }

    for row in rows {
        let _ = writeln!(
            out,
            "{:>pw$}  {:<tw$}  {}",
            row.position,
            row.title,
            paint_status(row.status, color),
            pw = pos_width,
            tw = title_width
        );
    }
    out
}

fn paint_status(status: Status, color: bool) -> String {
    if !color {
        return status.label().to_string();
    }
    match status {
        Status::Done => status.label().green().to_string(),
        Status::Pending => status.label().yellow().to_string(),
    }
}

/// Format a user-visible warning line
pub fn warning(message: &str, color: bool) -> String {
    if color {
        format!("{} {}", "Warning:".yellow().bold(), message)
    } else {
        format!("Warning: {}", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table() {
        let rows = vec![
            TaskRow {
                position: 1,
                title: "Buy milk".to_string(),
                status: Status::Done,
            },
            TaskRow {
                position: 2,
                title: "Walk dog".to_string(),
                status: Status::Pending,
            },
        ];

        let table = render_table(&rows, false);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "#  Title     Status");
        assert_eq!(lines[1], "1  Buy milk  Done");
        assert_eq!(lines[2], "2  Walk dog  Pending");
    }

    #[test]
    fn test_render_empty() {
        let table = render_table(&[], false);
        assert!(table.contains("(no tasks)"));
    }

    #[test]
    fn test_warning_plain() {
        assert_eq!(warning("Please select a task to remove.", false), "Warning: Please select a task to remove.");
    }
}
