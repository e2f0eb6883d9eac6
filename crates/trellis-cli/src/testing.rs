//! Mock collaborators for dispatcher tests.
//!
//! - `MockParser` fails on any text containing `bad syntax`.
//! - `MockPlanner` fails on `unplannable` and records every plan it executes.
//! - Plans fail on `explode`; texts containing `select` yield a one-row table
//!   bound to `?x`, everything else a table without bindings.

use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use trellis_engine::{
    ExecutionError, Exporter, Loader, MemoryStore, ParseError, Parser, Plan, PlanError, Planner, Statement,
    StatementKind, StatementSource, Store, Table,
};

use crate::config::SessionConfig;
use crate::pipeline::Pipeline;
use crate::session::{Collaborators, Session};

type Log<T> = Arc<Mutex<Vec<T>>>;

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct MockParser;

impl Parser for MockParser {
    fn parse(&self, text: &str) -> Result<Statement, ParseError> {
        if text.contains("bad syntax") {
            return Err(ParseError::Unexpected {
                found: "bad".to_string(),
                expected: "a statement",
            });
        }
        Ok(Statement {
            text: text.trim().to_string(),
            kind: StatementKind::ShowGraphs,
        })
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct MockPlanner {
    executed: Log<String>,
}

impl Planner for MockPlanner {
    fn build<'a>(
        &self,
        _store: &'a dyn Store,
        statement: Statement,
        channel_size: usize,
        trace: Option<&'a mut dyn Write>,
    ) -> Result<Box<dyn Plan + 'a>, PlanError> {
        if statement.text.contains("unplannable") {
            return Err(PlanError::NoPatterns);
        }
        Ok(Box::new(MockPlan {
            text: statement.text,
            channel_size,
            trace,
            executed: Arc::clone(&self.executed),
        }))
    }
}

struct MockPlan<'a> {
    text: String,
    channel_size: usize,
    trace: Option<&'a mut dyn Write>,
    executed: Log<String>,
}

impl Plan for MockPlan<'_> {
    fn execute(&mut self) -> Result<Table, ExecutionError> {
        if let Some(w) = self.trace.as_deref_mut() {
            let _ = writeln!(w, "mock: executing {}", self.text);
        }
        self.executed.lock().unwrap().push(self.text.clone());
        if self.text.contains("explode") {
            return Err(ExecutionError::Failed("boom".to_string()));
        }
        if self.text.contains("select") {
            let mut table = Table::new(vec!["?x".to_string()]);
            table.push_row(vec!["1".to_string()]);
            return Ok(table);
        }
        Ok(Table::empty())
    }

    fn describe(&self) -> String {
        format!("mock plan for {} (channel size {})", self.text, self.channel_size)
    }
}

/// Records the argument vectors it is called with.
#[derive(Debug, Default, Clone)]
pub(crate) struct RecordingBulk {
    calls: Log<Vec<String>>,
}

impl Exporter for RecordingBulk {
    fn eval(&self, _usage: &str, args: &[String], _store: &dyn Store, bulk_size: usize, out: &mut dyn Write) {
        self.calls.lock().unwrap().push(args.to_vec());
        let _ = writeln!(out, "mock export (bulk {bulk_size})");
    }
}

impl Loader for RecordingBulk {
    fn eval(
        &self,
        _usage: &str,
        args: &[String],
        _store: &dyn Store,
        bulk_size: usize,
        builder_size: usize,
        out: &mut dyn Write,
    ) {
        self.calls.lock().unwrap().push(args.to_vec());
        let _ = writeln!(out, "mock load (bulk {bulk_size}, builder {builder_size})");
    }
}

/// Hands out the same statements for any path.
#[derive(Debug, Default, Clone)]
pub(crate) struct StaticStatements {
    statements: Vec<String>,
}

impl StaticStatements {
    pub(crate) fn new(statements: Vec<String>) -> Self {
        Self { statements }
    }
}

impl StatementSource for StaticStatements {
    fn read_statements(&self, _path: &Path) -> io::Result<Vec<String>> {
        Ok(self.statements.clone())
    }
}

/// One set of mocks sharing a call log.
pub(crate) struct Mocks {
    store: MemoryStore,
    parser: MockParser,
    planner: MockPlanner,
    bulk: RecordingBulk,
}

impl Mocks {
    pub(crate) fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            parser: MockParser,
            planner: MockPlanner::default(),
            bulk: RecordingBulk::default(),
        }
    }

    pub(crate) fn pipeline(&self) -> Pipeline<'_> {
        Pipeline {
            parser: &self.parser,
            planner: &self.planner,
            store: &self.store,
            channel_size: 0,
        }
    }

    /// A session over a fresh memory store wired to these mocks.
    pub(crate) fn session(&self, statements: Vec<String>) -> Session {
        let collaborators = Collaborators {
            parser: Box::new(self.parser),
            planner: Box::new(self.planner.clone()),
            loader: Box::new(self.bulk.clone()),
            exporter: Box::new(self.bulk.clone()),
            statements: Box::new(StaticStatements::new(statements)),
        };
        Session::new(Box::new(MemoryStore::new()), collaborators, SessionConfig::default())
    }

    /// Texts of every plan executed so far, in order.
    pub(crate) fn executed(&self) -> Vec<String> {
        self.planner.executed.lock().unwrap().clone()
    }

    /// Argument vectors handed to load and export so far.
    pub(crate) fn bulk_calls(&self) -> Vec<Vec<String>> {
        self.bulk.calls.lock().unwrap().clone()
    }
}
