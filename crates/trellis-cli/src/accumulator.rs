//! Turning raw input lines into `;`-terminated statements.
//!
//! The accumulator runs on its own thread and hands each statement to the
//! dispatcher over a zero-capacity channel, then waits for an
//! acknowledgement before reading another line. At most one statement is in
//! flight and nothing is read ahead of the dispatcher.

use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Context, Result};

/// A source of raw input lines.
pub trait LineSource {
    /// Reads one line, showing `prompt` first (empty for continuation
    /// lines). `None` means the source is exhausted.
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// Lines from any buffered reader, with the prompt written to `out`.
pub struct ReaderLines<R, W> {
    reader: R,
    out: W,
}

impl<R: BufRead, W: Write> ReaderLines<R, W> {
    pub fn new(reader: R, out: W) -> Self {
        Self { reader, out }
    }
}

impl<R: BufRead, W: Write> LineSource for ReaderLines<R, W> {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        if !prompt.is_empty() {
            let _ = write!(self.out, "{prompt}");
            let _ = self.out.flush();
        }
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read input line");
                None
            }
        }
    }
}

/// The statement buffer.
#[derive(Debug, Default)]
pub struct LineAccumulator {
    buffer: String,
}

impl LineAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no partial statement is buffered.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Appends a trimmed line, space-separated. Returns the whole statement
    /// once the buffer ends with `;`, leaving the buffer empty.
    pub fn push(&mut self, line: &str) -> Option<String> {
        let line = line.trim();
        if !line.is_empty() {
            if !self.buffer.is_empty() {
                self.buffer.push(' ');
            }
            self.buffer.push_str(line);
        }
        if self.buffer.ends_with(';') {
            Some(std::mem::take(&mut self.buffer))
        } else {
            None
        }
    }
}

/// Receiving end of the accumulator thread.
pub struct Statements {
    statements: Receiver<String>,
    acks: SyncSender<bool>,
    worker: Option<JoinHandle<Result<()>>>,
}

/// A statement the dispatcher has received but not yet acknowledged.
///
/// Dropping it without calling [`PendingStatement::acknowledge`] tells the
/// accumulator to stop.
pub struct PendingStatement<'a> {
    text: String,
    acks: &'a SyncSender<bool>,
    acknowledged: bool,
}

impl PendingStatement<'_> {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Releases the accumulator: `terminate` stops it, otherwise it goes on
    /// to read the next statement.
    pub fn acknowledge(mut self, terminate: bool) {
        self.acknowledged = true;
        // The accumulator may already be gone if its source failed.
        let _ = self.acks.send(terminate);
    }
}

impl Drop for PendingStatement<'_> {
    fn drop(&mut self) {
        if !self.acknowledged {
            let _ = self.acks.send(true);
        }
    }
}

impl Statements {
    /// Blocks for the next statement. `None` once the accumulator has
    /// stopped.
    pub fn recv(&mut self) -> Option<PendingStatement<'_>> {
        let text = self.statements.recv().ok()?;
        Some(PendingStatement {
            text,
            acks: &self.acks,
            acknowledged: false,
        })
    }

    /// Waits for the accumulator thread, surfacing a failure to open its
    /// line source.
    pub fn join(mut self) -> Result<()> {
        match self.worker.take() {
            Some(worker) => worker
                .join()
                .map_err(|_| anyhow!("input thread panicked"))?,
            None => Ok(()),
        }
    }
}

/// Starts the accumulator thread. The line source is built on that thread,
/// so it never has to be `Send`.
pub fn spawn_accumulator<F>(prompt: impl Into<String>, make_source: F) -> Result<Statements>
where
    F: FnOnce() -> Result<Box<dyn LineSource>> + Send + 'static,
{
    let prompt = prompt.into();
    let (statement_tx, statement_rx) = mpsc::sync_channel::<String>(0);
    let (ack_tx, ack_rx) = mpsc::sync_channel::<bool>(0);

    let worker = thread::Builder::new()
        .name("trellis-input".to_string())
        .spawn(move || -> Result<()> {
            let mut source = make_source().context("failed to open input")?;
            let mut accumulator = LineAccumulator::new();
            loop {
                let shown = if accumulator.is_empty() { prompt.as_str() } else { "" };
                let Some(line) = source.read_line(shown) else {
                    tracing::debug!(partial = !accumulator.is_empty(), "input exhausted");
                    return Ok(());
                };
                let Some(statement) = accumulator.push(&line) else {
                    continue;
                };
                if statement_tx.send(statement).is_err() {
                    return Ok(());
                }
                match ack_rx.recv() {
                    Ok(false) => {}
                    Ok(true) | Err(_) => {
                        tracing::debug!("accumulator stopped");
                        return Ok(());
                    }
                }
            }
        })
        .context("failed to spawn input thread")?;

    Ok(Statements {
        statements: statement_rx,
        acks: ack_tx,
        worker: Some(worker),
    })
}
