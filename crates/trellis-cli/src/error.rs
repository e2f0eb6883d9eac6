//! Everything a single console command can fail with.
//!
//! None of these end the session; the dispatcher prints them and moves on.

use crate::batch::BatchError;
use crate::command::CommandError;
use crate::pipeline::QueryError;
use crate::trace_sink::TraceError;

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Trace(#[from] TraceError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Batch(#[from] BatchError),
}
