//! Statement classification.

use std::path::PathBuf;

use crate::PROGRAM;

pub const START_TRACING_USAGE: &str = "start tracing [trace_file]";
pub const RUN_USAGE: &str = "run <file_with_statements>";
pub const EXPORT_USAGE: &str = "Wrong syntax\n\n\texport <graph_names_separated_by_commas> <file_path>\n";
pub const LOAD_USAGE: &str = "Wrong syntax\n\n\tload <file_path> <graph_names_separated_by_commas>\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceTarget {
    Console,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    StartTracing(TraceTarget),
    StopTracing,
    /// Argument vector for the exporter, starting with the program name.
    Export(Vec<String>),
    /// Argument vector for the loader, starting with the program name.
    Load(Vec<String>),
    Describe(String),
    /// A `run` with the wrong number of arguments still reaches the timed
    /// batch handling, carrying its syntax error.
    RunFile(Result<PathBuf, CommandError>),
    Query(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("invalid syntax\n\t{usage}")]
    Syntax { usage: &'static str },
}

impl Command {
    /// Classifies a statement. Surrounding whitespace and one trailing `;`
    /// are ignored; keywords match whole leading tokens, case-insensitively.
    /// Anything that is not a console command is a query.
    pub fn parse(statement: &str) -> Result<Self, CommandError> {
        let text = strip_terminator(statement);
        let tokens = split_command_line(text);
        let keyword = |i: usize, kw: &str| tokens.get(i).is_some_and(|t| t.eq_ignore_ascii_case(kw));

        if keyword(0, "quit") {
            return Ok(Command::Quit);
        }
        if keyword(0, "help") {
            return Ok(Command::Help);
        }
        if keyword(0, "start") && keyword(1, "tracing") {
            return match tokens.len() {
                2 => Ok(Command::StartTracing(TraceTarget::Console)),
                3 => Ok(Command::StartTracing(TraceTarget::File(PathBuf::from(&tokens[2])))),
                _ => Err(CommandError::Syntax {
                    usage: START_TRACING_USAGE,
                }),
            };
        }
        if keyword(0, "stop") && keyword(1, "tracing") {
            return Ok(Command::StopTracing);
        }
        if keyword(0, "export") {
            return Ok(Command::Export(argument_vector(tokens)));
        }
        if keyword(0, "load") {
            return Ok(Command::Load(argument_vector(tokens)));
        }
        if keyword(0, "desc") {
            return Ok(Command::Describe(after_first_token(text).to_string()));
        }
        if keyword(0, "run") {
            return Ok(Command::RunFile(match tokens.as_slice() {
                [_, path] => Ok(PathBuf::from(path)),
                _ => Err(CommandError::Syntax { usage: RUN_USAGE }),
            }));
        }
        Ok(Command::Query(text.to_string()))
    }
}

fn strip_terminator(statement: &str) -> &str {
    let text = statement.trim();
    text.strip_suffix(';').unwrap_or(text).trim_end()
}

fn argument_vector(tokens: Vec<String>) -> Vec<String> {
    std::iter::once(PROGRAM.to_string()).chain(tokens).collect()
}

/// The raw text after the leading keyword, so quoted literals reach the
/// parser untouched.
fn after_first_token(text: &str) -> &str {
    text.split_once(char::is_whitespace)
        .map_or("", |(_, rest)| rest.trim_start())
}

/// Whitespace-separated tokens; double quotes group, backslash escapes.
pub(crate) fn split_command_line(line: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        out.push(current);
    }

    out
}
