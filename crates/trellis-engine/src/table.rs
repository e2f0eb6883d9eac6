//! Query results.

use std::fmt;

/// Rows of values under named bindings.
///
/// Statements that only mutate the store return a table with no bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    bindings: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(bindings: Vec<String>) -> Self {
        Self {
            bindings,
            rows: Vec::new(),
        }
    }

    /// A table without bindings, for statements that produce no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bindings(&self) -> &[String] {
        &self.bindings
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends a row. Short rows are padded and long rows truncated to the
    /// binding count.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.bindings.len(), String::new());
        self.rows.push(row);
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = self.bindings.iter().map(|b| b.chars().count()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let rule = widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+");
        let line = |f: &mut fmt::Formatter<'_>, cells: &[String]| -> fmt::Result {
            write!(f, "|")?;
            for (cell, &w) in cells.iter().zip(&widths) {
                write!(f, " {cell:<w$} |")?;
            }
            writeln!(f)
        };

        writeln!(f, "+{rule}+")?;
        line(f, &self.bindings)?;
        writeln!(f, "+{rule}+")?;
        for row in &self.rows {
            line(f, row)?;
        }
        write!(f, "+{rule}+")
    }
}
