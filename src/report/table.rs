//! Plain-text table rendering.

use std::fmt::{self, Write};

/// Cell alignment within a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// A bordered text table with per-column alignment.
#[derive(Debug, Clone)]
pub struct TextTable {
    headers: Vec<String>,
    aligns: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    /// New table; every column is left-aligned until changed with [`Self::align_from`].
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let aligns = vec![Align::Left; headers.len()];
        Self {
            headers,
            aligns,
            rows: Vec::new(),
        }
    }

    /// Set the alignment of columns `from..` onward.
    pub fn align_from(mut self, from: usize, align: Align) -> Self {
        for a in self.aligns.iter_mut().skip(from) {
            *a = align;
        }
        self
    }

    /// Append a row. Missing cells render empty; extra cells are dropped.
    pub fn push_row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }
        widths
    }

    /// Write the table to `out`.
    pub fn render(&self, out: &mut impl Write) -> fmt::Result {
        let widths = self.widths();
        let rule = rule_line(&widths);

        writeln!(out, "{rule}")?;
        self.write_row(out, &widths, &self.headers, false)?;
        writeln!(out, "{rule}")?;
        for row in &self.rows {
            self.write_row(out, &widths, row, true)?;
        }
        writeln!(out, "{rule}")
    }

    fn write_row(&self, out: &mut impl Write, widths: &[usize], cells: &[String], body: bool) -> fmt::Result {
        out.write_char('|')?;
        for (idx, &width) in widths.iter().enumerate() {
            let cell = cells.get(idx).map(String::as_str).unwrap_or("");
            let align = if body { self.aligns[idx] } else { Align::Left };
            match align {
                Align::Left => write!(out, " {cell:<width$} |")?,
                Align::Right => write!(out, " {cell:>width$} |")?,
            }
        }
        out.write_char('\n')
    }
}

fn rule_line(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for w in widths {
        line.push_str(&"-".repeat(w + 2));
        line.push('+');
    }
    line
}

/// Cut `s` to at most `max` characters.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}
