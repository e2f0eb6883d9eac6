//! Trellis engine
//!
//! The console core talks to its query engine only through the contracts
//! defined here:
//!
//! ```text
//!   text ──► Parser ──► Statement ──► Planner ──► Plan ──► Table
//!                                        ▲
//!                                        │ &dyn Store, channel size,
//!                                        │ optional trace writer
//! ```
//!
//! plus the bulk utilities (`Loader`, `Exporter`) and the statement-file
//! reader (`StatementSource`) used by `run`.
//!
//! ## Reference driver
//!
//! The `memory` driver (`MemoryStore`, `StatementParser`, `MemoryPlanner`,
//! `TripleFileLoader`, `TripleFileExporter`, `FileStatementReader`) is a
//! deliberately small implementation of those contracts: named graphs of
//! `subject predicate object` triples, and a handful of statements:
//!
//! ```text
//! create graph ?a, ?b;
//! drop graph ?a;
//! insert data into ?a { /u<joe> knows /u<mary> . /u<mary> knows /u<peter> };
//! delete data from ?a { /u<joe> knows /u<mary> };
//! select ?s, ?o from ?a where { ?s knows ?o } limit 10;
//! show graphs;
//! ```

pub mod bulk;
pub mod memory;
pub mod parser;
pub mod planner;
pub mod statements;
pub mod store;
pub mod table;
pub mod triple;

pub use bulk::{Exporter, Loader, TripleFileExporter, TripleFileLoader};
pub use memory::MemoryStore;
pub use parser::{ParseError, Parser, Statement, StatementKind, StatementParser};
pub use planner::{ExecutionError, MemoryPlanner, Plan, PlanError, Planner};
pub use statements::{FileStatementReader, StatementSource};
pub use store::{Store, StoreError};
pub use table::Table;
pub use triple::{Pattern, Term, Triple};

/// Name the memory driver reports through `Store::name`.
pub const MEMORY_DRIVER: &str = "memory";
