//! Trellis console
//!
//! A statement-oriented REPL over a Trellis store:
//!
//! ```text
//!  raw lines ──► accumulator ──(rendezvous)──► repl dispatcher ──► trace sink
//!       ▲          (thread)                        │            ──► query pipeline
//!       └──────────── acknowledgement ◄────────────┘            ──► batch runner
//!                                                               ──► load / export
//! ```
//!
//! - `accumulator`: joins raw lines into `;`-terminated statements
//! - `command`: classifies a statement into a typed `Command`
//! - `trace_sink`: the session's single optional trace destination
//! - `pipeline`: parse → plan → execute over the engine contracts
//! - `batch`: runs a statement file, stopping at the first failure
//! - `repl`: the dispatcher loop
//! - `session` / `config`: per-run state and its settings

pub mod accumulator;
pub mod batch;
pub mod command;
pub mod config;
#[cfg(feature = "repl-rustyline")]
pub mod editor;
pub mod error;
mod output;
pub mod pipeline;
pub mod repl;
pub mod session;
pub mod trace_sink;

#[cfg(test)]
pub(crate) mod testing;

pub use accumulator::{spawn_accumulator, LineAccumulator, LineSource, PendingStatement, ReaderLines, Statements};
pub use batch::{BatchError, BatchReport};
pub use command::{Command, CommandError, TraceTarget};
pub use config::{ConfigError, SessionArgs, SessionConfig};
#[cfg(feature = "repl-rustyline")]
pub use editor::EditorLines;
pub use error::ConsoleError;
pub use pipeline::{Pipeline, QueryError};
pub use repl::{dispatch, run_repl, ReplControl, VERSION};
pub use session::{Collaborators, Session};
pub use trace_sink::{TraceError, TraceManager, TraceSink};

/// Prompt shown before each new statement.
pub const PROMPT: &str = "trellis> ";

/// Program name placed first in the argument vectors handed to load/export.
pub const PROGRAM: &str = "trellis";
