//! Planning and execution contracts, and the memory driver's planner.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::io::Write;

use chrono::Local;

use crate::parser::{Statement, StatementKind};
use crate::store::{Store, StoreError};
use crate::table::Table;
use crate::triple::{Pattern, Term, Triple};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("projected variable {0} is not bound by any pattern")]
    UnboundProjection(String),
    #[error("select needs at least one pattern")]
    NoPatterns,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Failed(String),
}

/// An executable statement.
pub trait Plan {
    fn execute(&mut self) -> Result<Table, ExecutionError>;

    /// Human-readable description of what `execute` would do.
    fn describe(&self) -> String;
}

/// Builds plans for parsed statements.
///
/// `trace`, when present, receives diagnostic lines for as long as the plan
/// lives. `channel_size` is an engine tuning knob the caller passes through
/// untouched.
pub trait Planner {
    fn build<'a>(
        &self,
        store: &'a dyn Store,
        statement: Statement,
        channel_size: usize,
        trace: Option<&'a mut dyn Write>,
    ) -> Result<Box<dyn Plan + 'a>, PlanError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryPlanner;

impl Planner for MemoryPlanner {
    fn build<'a>(
        &self,
        store: &'a dyn Store,
        statement: Statement,
        channel_size: usize,
        mut trace: Option<&'a mut dyn Write>,
    ) -> Result<Box<dyn Plan + 'a>, PlanError> {
        emit(&mut trace, format_args!("planner: building plan for {:?}", statement.text));

        if let StatementKind::Select {
            projection,
            patterns,
            ..
        } = &statement.kind
        {
            if patterns.is_empty() {
                return Err(PlanError::NoPatterns);
            }
            if let Some(unbound) = projection
                .iter()
                .find(|v| !patterns.iter().any(|p| p.vars().any(|b| b == v.as_str())))
            {
                return Err(PlanError::UnboundProjection(unbound.clone()));
            }
        }

        emit(&mut trace, format_args!("planner: plan ready"));
        Ok(Box::new(MemoryPlan {
            store,
            statement,
            channel_size,
            trace,
        }))
    }
}

fn emit(trace: &mut Option<&mut dyn Write>, args: fmt::Arguments<'_>) {
    if let Some(w) = trace.as_deref_mut() {
        // Tracing is best effort and never fails a query.
        let _ = writeln!(w, "{} {}", Local::now().format("%Y-%m-%dT%H:%M:%S%.6f"), args);
    }
}

struct MemoryPlan<'a> {
    store: &'a dyn Store,
    statement: Statement,
    channel_size: usize,
    trace: Option<&'a mut dyn Write>,
}

type Solution<'t> = BTreeMap<&'t str, &'t str>;

impl Plan for MemoryPlan<'_> {
    fn execute(&mut self) -> Result<Table, ExecutionError> {
        let MemoryPlan {
            store,
            statement,
            trace,
            ..
        } = self;
        let store = *store;
        emit(trace, format_args!("execute: {:?}", statement.text));

        let table = match &statement.kind {
            StatementKind::CreateGraphs(graphs) => {
                for g in graphs {
                    store.new_graph(g)?;
                    emit(trace, format_args!("execute: created graph {g}"));
                }
                Table::empty()
            }
            StatementKind::DropGraphs(graphs) => {
                for g in graphs {
                    store.delete_graph(g)?;
                    emit(trace, format_args!("execute: dropped graph {g}"));
                }
                Table::empty()
            }
            StatementKind::Insert { graphs, data } => {
                for g in graphs {
                    let added = store.add_triples(g, data)?;
                    emit(trace, format_args!("execute: inserted {added} triples into {g}"));
                }
                Table::empty()
            }
            StatementKind::Delete { graphs, data } => {
                for g in graphs {
                    let removed = store.remove_triples(g, data)?;
                    emit(trace, format_args!("execute: removed {removed} triples from {g}"));
                }
                Table::empty()
            }
            StatementKind::Select {
                projection,
                graphs,
                patterns,
                limit,
            } => {
                let mut triples = BTreeSet::new();
                for g in graphs {
                    triples.extend(store.triples(g)?);
                }
                emit(
                    trace,
                    format_args!("execute: scanning {} triples from {} graphs", triples.len(), graphs.len()),
                );
                select(projection, patterns, *limit, &triples, trace)
            }
            StatementKind::ShowGraphs => {
                let mut table = Table::new(vec!["?graph_name".to_string()]);
                for name in store.graph_names() {
                    table.push_row(vec![name]);
                }
                table
            }
        };

        emit(trace, format_args!("execute: done, {} rows", table.len()));
        Ok(table)
    }

    fn describe(&self) -> String {
        let mut out = String::new();
        let _ = self.write_description(&mut out);
        out
    }
}

impl MemoryPlan<'_> {
    fn write_description(&self, out: &mut String) -> fmt::Result {
        use std::fmt::Write as _;

        writeln!(out, "plan for {:?} (channel size {})", self.statement.text, self.channel_size)?;
        match &self.statement.kind {
            StatementKind::CreateGraphs(graphs) => write!(out, "  create graphs: {}", graphs.join(", ")),
            StatementKind::DropGraphs(graphs) => write!(out, "  drop graphs: {}", graphs.join(", ")),
            StatementKind::Insert { graphs, data } => write!(
                out,
                "  insert {} triples into: {}",
                data.len(),
                graphs.join(", ")
            ),
            StatementKind::Delete { graphs, data } => write!(
                out,
                "  delete {} triples from: {}",
                data.len(),
                graphs.join(", ")
            ),
            StatementKind::Select {
                projection,
                graphs,
                patterns,
                limit,
            } => {
                writeln!(out, "  scan graphs: {}", graphs.join(", "))?;
                writeln!(out, "  nested-loop match over {} patterns:", patterns.len())?;
                for p in patterns {
                    writeln!(out, "    {p}")?;
                }
                write!(out, "  project: {}", projection.join(", "))?;
                if let Some(limit) = limit {
                    write!(out, "\n  limit: {limit}")?;
                }
                Ok(())
            }
            StatementKind::ShowGraphs => write!(out, "  list graph names"),
        }
    }
}

fn select(
    projection: &[String],
    patterns: &[Pattern],
    limit: Option<usize>,
    triples: &BTreeSet<Triple>,
    trace: &mut Option<&mut dyn Write>,
) -> Table {
    let mut solutions: Vec<Solution<'_>> = vec![Solution::new()];
    for pattern in patterns {
        solutions = solutions
            .iter()
            .flat_map(|s| triples.iter().filter_map(move |t| unify(pattern, t, s)))
            .collect();
        emit(trace, format_args!("execute: {pattern} -> {} solutions", solutions.len()));
    }

    let mut table = Table::new(projection.to_vec());
    let mut seen = HashSet::new();
    for solution in &solutions {
        if limit.is_some_and(|l| table.len() >= l) {
            break;
        }
        let row: Vec<String> = projection
            .iter()
            .map(|v| solution.get(v.as_str()).map(|s| s.to_string()).unwrap_or_default())
            .collect();
        if seen.insert(row.clone()) {
            table.push_row(row);
        }
    }
    table
}

fn unify<'t>(pattern: &'t Pattern, triple: &'t Triple, solution: &Solution<'t>) -> Option<Solution<'t>> {
    let mut out = solution.clone();
    let values = [&triple.subject, &triple.predicate, &triple.object];
    for (term, value) in pattern.terms().into_iter().zip(values) {
        match term {
            Term::Const(c) if c != value => return None,
            Term::Const(_) => {}
            Term::Var(v) => match out.get(v.as_str()) {
                Some(bound) if *bound != value.as_str() => return None,
                Some(_) => {}
                None => {
                    out.insert(v.as_str(), value.as_str());
                }
            },
        }
    }
    Some(out)
}
