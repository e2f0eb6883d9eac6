//! Running a file of statements.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use trellis_engine::StatementSource;

use crate::output;
use crate::pipeline::{Pipeline, QueryError};
use crate::trace_sink::TraceManager;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub path: PathBuf,
    pub statements: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to read statements from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// `index` is 1-based; statements before it all succeeded and none after
    /// it were attempted.
    #[error("statement {index} of {total} failed: {statement}\n\t{source}")]
    Aborted {
        index: usize,
        total: usize,
        statement: String,
        #[source]
        source: QueryError,
    },
    #[error("failed to write batch output: {0}")]
    Output(#[from] io::Error),
}

/// Executes the statements in `path` in order, stopping at the first failure.
///
/// With `print_results`, every result table that binds something is printed
/// after its progress line.
pub fn run_file(
    pipeline: &Pipeline<'_>,
    tracer: &mut TraceManager,
    reader: &dyn StatementSource,
    path: &Path,
    print_results: bool,
    out: &mut dyn Write,
) -> Result<BatchReport, BatchError> {
    let statements = reader.read_statements(path).map_err(|source| BatchError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let total = statements.len();
    tracing::info!(path = %path.display(), total, "running statement file");

    for (i, statement) in statements.into_iter().enumerate() {
        let index = i + 1;
        writeln!(out, "Processing statement ({index}/{total})")?;
        tracing::debug!(index, total, statement = %statement, "batch statement");
        match pipeline.plan_and_execute(&statement, tracer.writer()) {
            Ok(table) => {
                if print_results {
                    output::table(out, &table)?;
                }
            }
            Err(source) => {
                tracing::warn!(index, total, error = %source, "statement file aborted");
                return Err(BatchError::Aborted {
                    index,
                    total,
                    statement,
                    source,
                });
            }
        }
    }

    Ok(BatchReport {
        path: path.to_path_buf(),
        statements: total,
    })
}
