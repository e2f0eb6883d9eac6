//! Reading statement files for batch runs.

use std::fs;
use std::io;
use std::path::Path;

/// Source of the ordered statements a batch run executes.
pub trait StatementSource {
    fn read_statements(&self, path: &Path) -> io::Result<Vec<String>>;
}

/// Reads `;`-terminated statements from a text file.
///
/// Lines are trimmed; blank lines and `#` comments are skipped; a statement
/// may span several lines and ends at the first line ending in `;`, which is
/// kept. Trailing text without a `;` is dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileStatementReader;

impl FileStatementReader {
    pub fn split(text: &str) -> Vec<String> {
        let mut statements = Vec::new();
        let mut current = String::new();
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(line);
            if line.ends_with(';') {
                statements.push(std::mem::take(&mut current));
            }
        }
        statements
    }
}

impl StatementSource for FileStatementReader {
    fn read_statements(&self, path: &Path) -> io::Result<Vec<String>> {
        Ok(Self::split(&fs::read_to_string(path)?))
    }
}
