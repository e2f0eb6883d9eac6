//! Interactive line editing with history and tab completion.

use anyhow::{anyhow, Result};
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use crate::accumulator::LineSource;

const KEYWORDS: &[&str] = &[
    "quit;", "help;", "start", "stop", "tracing", "export", "load", "desc", "run", "select", "insert",
    "delete", "create", "drop", "show",
];

pub struct EditorLines {
    editor: Editor<ConsoleHelper, DefaultHistory>,
}

impl EditorLines {
    pub fn new() -> Result<Self> {
        let mut editor: Editor<ConsoleHelper, DefaultHistory> =
            Editor::new().map_err(|e| anyhow!("failed to init rustyline: {e}"))?;
        editor.set_helper(Some(ConsoleHelper {
            files: FilenameCompleter::new(),
        }));
        Ok(Self { editor })
    }
}

impl LineSource for EditorLines {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                        tracing::debug!(error = %e, "failed to record history");
                    }
                }
                Some(line)
            }
            // Ctrl-C abandons nothing; the buffered statement stays as is.
            Err(ReadlineError::Interrupted) => Some(String::new()),
            Err(ReadlineError::Eof) => None,
            Err(e) => {
                tracing::warn!(error = %e, "readline error");
                None
            }
        }
    }
}

struct ConsoleHelper {
    files: FilenameCompleter,
}

impl rustyline::Helper for ConsoleHelper {}

impl rustyline::highlight::Highlighter for ConsoleHelper {}

impl rustyline::hint::Hinter for ConsoleHelper {
    type Hint = String;
    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        None
    }
}

impl rustyline::validate::Validator for ConsoleHelper {}

impl Completer for ConsoleHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = line[..pos]
            .rfind(char::is_whitespace)
            .map(|i| i + 1)
            .unwrap_or(0);
        if let Some(pairs) = keyword_candidates(&line[..start], &line[start..pos]) {
            return Ok((start, pairs));
        }

        self.files.complete(line, pos, ctx)
    }
}

/// Keyword completions for `word`, or `None` where a file path is expected.
/// Keywords go first on the line and after `start` / `stop`.
fn keyword_candidates(head: &str, word: &str) -> Option<Vec<Pair>> {
    let mut tokens = head.split_whitespace();
    let keyword_position = match (tokens.next(), tokens.next()) {
        (None, _) => true,
        (Some(previous), None) => {
            previous.eq_ignore_ascii_case("start") || previous.eq_ignore_ascii_case("stop")
        }
        _ => false,
    };
    if !keyword_position {
        return None;
    }
    let lower = word.to_ascii_lowercase();
    Some(
        KEYWORDS
            .iter()
            .filter(|k| k.starts_with(&lower))
            .map(|k| Pair {
                display: k.to_string(),
                replacement: k.to_string(),
            })
            .collect(),
    )
}
