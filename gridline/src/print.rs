//! Printing boundary and the table's transient "printing" indicator.
//!
//! Printing is fire-and-forget. The table attaches a [`PrintDocument`],
//! asks the [`PrintRequester`] to print, and raises its indicator. The
//! indicator clears on a later update, once the requester reports it is no
//! longer printing and the reset delay has passed since it was last seen busy.

use std::time::{Duration, Instant};

use unicode_width::UnicodeWidthStr;

use crate::export::{sanitize_file_name, ExportTable};

/// Printable projection of a table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PrintDocument {
    pub title: String,
    pub table: ExportTable,
}

impl PrintDocument {
    pub fn new(title: impl Into<String>, table: ExportTable) -> Self {
        Self {
            title: title.into(),
            table,
        }
    }

    /// The title reduced to one file name component.
    pub fn file_stem(&self) -> String {
        sanitize_file_name(&self.title)
    }

    /// Plain-text rendering with columns padded to their widest cell.
    pub fn to_text(&self) -> String {
        let cells: Vec<Vec<String>> = self
            .table
            .rows
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect();

        let mut widths: Vec<usize> = self.table.headers.iter().map(|h| h.width()).collect();
        for row in &cells {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.width());
                }
            }
        }

        let format_row = |row: &[String]| -> String {
            row.iter()
                .zip(&widths)
                .map(|(cell, &w)| format!("{cell}{}", " ".repeat(w.saturating_sub(cell.width()))))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        out.push('\n');
        out.push_str(&format_row(&self.table.headers));
        out.push('\n');
        let rule: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(rule));
        out.push('\n');
        for row in &cells {
            out.push_str(&format_row(row));
            out.push('\n');
        }
        out
    }
}

/// External print service.
pub trait PrintRequester: Send + Sync {
    /// Attach the projection the next print uses.
    fn attach(&self, document: PrintDocument);

    fn request_print(&self);

    fn is_printing(&self) -> bool;
}

/// Transient "printing" indicator owned by a table.
#[derive(Debug, Default)]
pub struct PrintIndicator {
    /// Last instant the indicator was raised or the requester was seen busy.
    busy_since: Option<Instant>,
}

impl PrintIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.busy_since.is_some()
    }

    pub fn raise(&mut self, now: Instant) {
        self.busy_since = Some(now);
    }

    /// Advance the indicator. Returns `true` when it cleared on this call.
    pub fn tick(&mut self, now: Instant, printing: bool, delay: Duration) -> bool {
        let Some(since) = self.busy_since else {
            return false;
        };
        if printing {
            self.busy_since = Some(now);
            return false;
        }
        if now.saturating_duration_since(since) >= delay {
            self.busy_since = None;
            return true;
        }
        false
    }
}
