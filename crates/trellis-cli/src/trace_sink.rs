//! The session's optional trace destination.
//!
//! At most one sink is live. Starting a new one always releases the old one
//! first, and dropping the manager releases whatever is left, so a trace file
//! is flushed and closed on every way out of a session.

use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::{Path, PathBuf};

use crate::command::TraceTarget;

#[derive(Debug)]
pub enum TraceSink {
    None,
    /// Process stdout, shared with the rest of the program.
    Console(Stdout),
    File {
        path: PathBuf,
        writer: BufWriter<File>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("failed to create trace file {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug)]
pub struct TraceManager {
    sink: TraceSink,
}

impl Default for TraceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceManager {
    pub fn new() -> Self {
        Self {
            sink: TraceSink::None,
        }
    }

    pub fn sink(&self) -> &TraceSink {
        &self.sink
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.sink, TraceSink::None)
    }

    /// Path of the trace file currently open, if any.
    pub fn file_path(&self) -> Option<&Path> {
        match &self.sink {
            TraceSink::File { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Releases the current sink. Returns the path of the trace file that was
    /// closed, if there was one. Calling this with no sink is a no-op.
    pub fn stop(&mut self) -> Option<PathBuf> {
        match std::mem::replace(&mut self.sink, TraceSink::None) {
            TraceSink::None => None,
            TraceSink::Console(mut out) => {
                let _ = out.flush();
                None
            }
            TraceSink::File { path, mut writer } => {
                if let Err(e) = writer.flush() {
                    tracing::warn!(path = %path.display(), error = %e, "failed to flush trace file");
                }
                drop(writer);
                tracing::debug!(path = %path.display(), "trace file closed");
                Some(path)
            }
        }
    }

    /// Releases the current sink, then opens `target`. If the trace file
    /// cannot be created the manager is left with no sink.
    pub fn start(&mut self, target: &TraceTarget) -> Result<(), TraceError> {
        self.stop();
        self.sink = match target {
            TraceTarget::Console => TraceSink::Console(io::stdout()),
            TraceTarget::File(path) => {
                let file = File::create(path).map_err(|source| TraceError::Create {
                    path: path.clone(),
                    source,
                })?;
                TraceSink::File {
                    path: path.clone(),
                    writer: BufWriter::new(file),
                }
            }
        };
        tracing::debug!(sink = ?target, "tracing started");
        Ok(())
    }

    /// Borrow of the live sink, handed to the planner for one query.
    pub fn writer(&mut self) -> Option<&mut dyn Write> {
        match &mut self.sink {
            TraceSink::None => None,
            TraceSink::Console(out) => Some(out),
            TraceSink::File { writer, .. } => Some(writer),
        }
    }
}

impl Drop for TraceManager {
    fn drop(&mut self) {
        self.stop();
    }
}
