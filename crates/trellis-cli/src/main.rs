//! Trellis CLI
//!
//! - `trellis` / `trellis repl`: the interactive console
//! - `trellis run <file>`: execute a statement file and print each result
//! - `trellis version`: console and driver versions

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use trellis_cli::{
    run_repl, spawn_accumulator, LineSource, ReaderLines, Session, SessionArgs, SessionConfig, TraceTarget,
    PROMPT, VERSION,
};

#[derive(Parser)]
#[command(name = "trellis")]
#[command(author, version, about = "Trellis: an interactive console for triple stores")]
struct Cli {
    #[command(flatten)]
    session: SessionArgs,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive console (default).
    Repl,
    /// Execute a file of `;`-terminated statements, stopping at the first failure.
    Run {
        file: PathBuf,
        /// Write planner traces to this file.
        #[arg(long, value_name = "FILE")]
        trace: Option<PathBuf>,
    },
    /// Print the console and driver versions.
    Version,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();
    if cli.plain {
        colored::control::set_override(false);
    }

    let config = cli.session.resolve()?;
    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => cmd_repl(config),
        Commands::Run { file, trace } => cmd_run(config, &file, trace),
        Commands::Version => cmd_version(config),
    }
}

fn cmd_repl(config: SessionConfig) -> Result<()> {
    let mut session = Session::open(config)?;
    let statements = spawn_accumulator(PROMPT, open_input)?;
    // Unlocked: the input thread writes prompts to stdout too.
    run_repl(&mut session, statements, &mut io::stdout())
}

fn open_input() -> Result<Box<dyn LineSource>> {
    #[cfg(feature = "repl-rustyline")]
    {
        if io::stdin().is_terminal() {
            return Ok(Box::new(trellis_cli::EditorLines::new()?));
        }
    }
    tracing::debug!(terminal = io::stdin().is_terminal(), "reading plain lines from stdin");
    Ok(Box::new(ReaderLines::new(io::stdin().lock(), io::stdout())))
}

fn cmd_run(config: SessionConfig, file: &Path, trace: Option<PathBuf>) -> Result<()> {
    let mut session = Session::open(config)?;
    if let Some(path) = trace {
        session.tracer_mut().start(&TraceTarget::File(path))?;
    }

    let start = Instant::now();
    let mut out = io::stdout();
    let result = session.run_file(file, true, &mut out);
    session.close();
    let report = result?;

    println!(
        "{} {:?}: {} statements in {:?}",
        "ok".green().bold(),
        report.path,
        report.statements,
        start.elapsed()
    );
    Ok(())
}

fn cmd_version(config: SessionConfig) -> Result<()> {
    let session = Session::open(config)?;
    let store = session.store();
    println!("trellis {VERSION} (driver {} {})", store.name(), store.version());
    Ok(())
}
