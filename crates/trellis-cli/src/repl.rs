//! The console dispatcher.
//!
//! Each statement from the accumulator is classified, handled to completion,
//! and acknowledged exactly once. Errors from a single command are printed
//! and the session goes on; only `quit;` (or the end of input) ends it.

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use chrono::Local;
use colored::Colorize;

use crate::accumulator::Statements;
use crate::command::{Command, TraceTarget};
use crate::error::ConsoleError;
use crate::output;
use crate::session::Session;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplControl {
    Continue,
    Exit,
}

/// Runs the console until `quit;` or the end of input, then releases the
/// trace sink and waits for the input thread.
pub fn run_repl(session: &mut Session, mut statements: Statements, out: &mut dyn Write) -> Result<()> {
    print_banner(session, out)?;
    let processed = process(session, &mut statements, out);
    let closed = session.close();
    processed?;
    report_closed(closed, out)?;
    print_farewell(out)?;
    statements.join()
}

fn process(session: &mut Session, statements: &mut Statements, out: &mut dyn Write) -> Result<()> {
    while let Some(pending) = statements.recv() {
        match dispatch(session, pending.text(), out)? {
            ReplControl::Continue => pending.acknowledge(false),
            ReplControl::Exit => {
                pending.acknowledge(true);
                break;
            }
        }
    }
    Ok(())
}

/// Handles one statement. The returned error is only ever a failure to write
/// to `out`; command failures are printed.
pub fn dispatch(session: &mut Session, statement: &str, out: &mut dyn Write) -> Result<ReplControl> {
    let command = match Command::parse(statement) {
        Ok(command) => command,
        Err(e) => {
            report(out, e.into())?;
            return Ok(ReplControl::Continue);
        }
    };
    tracing::debug!(?command, "dispatching statement");

    match command {
        Command::Quit => return Ok(ReplControl::Exit),
        Command::Help => print_help(out)?,
        Command::StartTracing(target) => start_tracing(session, &target, out)?,
        Command::StopTracing => {
            report_closed(session.tracer_mut().stop(), out)?;
            writeln!(out, "Tracing is off.")?;
        }
        Command::Export(args) => {
            let start = Instant::now();
            session.export(&args, out);
            output::time_spent(out, start.elapsed())?;
        }
        Command::Load(args) => {
            let start = Instant::now();
            session.load(&args, out);
            output::time_spent(out, start.elapsed())?;
        }
        Command::Describe(text) => {
            let (pipeline, _) = session.parts();
            let planned = pipeline.plan(&text, None);
            match planned {
                Ok(plan) => {
                    writeln!(out, "{}", plan.describe())?;
                    writeln!(out, "{}", "[OK]".green().bold())?;
                }
                Err(e) => report(out, e.into())?,
            }
        }
        Command::RunFile(path) => {
            let start = Instant::now();
            let outcome = match path {
                Ok(path) => session.run_file(&path, false, out).map_err(ConsoleError::from),
                Err(e) => Err(e.into()),
            };
            match outcome {
                Ok(summary) => writeln!(
                    out,
                    "Loaded {:?} and run {} statements successfully\n",
                    summary.path, summary.statements
                )?,
                Err(e) => report(out, e)?,
            }
            writeln!(out, "Time spent: {:?}", start.elapsed())?;
        }
        Command::Query(text) => {
            let start = Instant::now();
            let (pipeline, tracer) = session.parts();
            match pipeline.plan_and_execute(&text, tracer.writer()) {
                Ok(table) => {
                    output::table(out, &table)?;
                    output::time_spent(out, start.elapsed())?;
                }
                Err(e) => {
                    report(out, e.into())?;
                    writeln!(out, "Time spent: {:?}\n", start.elapsed())?;
                }
            }
        }
    }
    Ok(ReplControl::Continue)
}

fn start_tracing(session: &mut Session, target: &TraceTarget, out: &mut dyn Write) -> Result<()> {
    report_closed(session.tracer_mut().stop(), out)?;
    match session.tracer_mut().start(target) {
        Ok(()) => output::warning(out, "Tracing is on. This may slow your queries.")?,
        Err(e) => report(out, e.into())?,
    }
    Ok(())
}

fn report_closed(closed: Option<PathBuf>, out: &mut dyn Write) -> Result<()> {
    if closed.is_some() {
        writeln!(out, "Closing tracing file.")?;
    }
    Ok(())
}

fn report(out: &mut dyn Write, error: ConsoleError) -> Result<()> {
    tracing::debug!(error = %error, "command failed");
    output::error(out, error)?;
    Ok(())
}

pub fn print_help(out: &mut dyn Write) -> Result<()> {
    write!(
        out,
        r#"help;                                                  - prints help for the console.
export <graph_names_separated_by_commas> <file_path>;  - dumps triples from graphs into a file path.
desc <query>;                                          - prints the execution plan for a query.
load <file_path> <graph_names_separated_by_commas>;    - loads triples into the specified graphs.
run <file_with_statements>;                            - runs all the statements in the file.
start tracing [trace_file];                            - starts tracing queries.
stop tracing;                                          - stops tracing queries.
quit;                                                  - quits the console.

"#
    )?;
    Ok(())
}

fn print_banner(session: &Session, out: &mut dyn Write) -> Result<()> {
    let store = session.store();
    writeln!(out, "{} ({VERSION})", "Welcome to the Trellis console".green().bold())?;
    writeln!(
        out,
        "Using driver {:?} ({}). Type quit; to exit",
        store.name(),
        store.version()
    )?;
    writeln!(out, "Session started at {}\n", Local::now().format("%Y-%m-%d %H:%M:%S %Z"))?;
    Ok(())
}

fn print_farewell(out: &mut dyn Write) -> Result<()> {
    writeln!(out, "\n\nThanks for all those queries!\n")?;
    Ok(())
}
