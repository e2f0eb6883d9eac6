//! Per-run console state.

use std::io::Write;
use std::path::{Path, PathBuf};

use trellis_engine::{
    Exporter, FileStatementReader, Loader, MemoryPlanner, MemoryStore, Parser, Planner, StatementParser,
    StatementSource, Store, TripleFileExporter, TripleFileLoader, MEMORY_DRIVER,
};

use crate::batch::{self, BatchError, BatchReport};
use crate::command::{EXPORT_USAGE, LOAD_USAGE};
use crate::config::{ConfigError, SessionConfig};
use crate::pipeline::Pipeline;
use crate::trace_sink::TraceManager;

/// The engine pieces a session delegates to.
pub struct Collaborators {
    pub parser: Box<dyn Parser>,
    pub planner: Box<dyn Planner>,
    pub loader: Box<dyn Loader>,
    pub exporter: Box<dyn Exporter>,
    pub statements: Box<dyn StatementSource>,
}

impl Collaborators {
    pub fn memory() -> Self {
        Self {
            parser: Box::new(StatementParser),
            planner: Box::new(MemoryPlanner),
            loader: Box::new(TripleFileLoader),
            exporter: Box::new(TripleFileExporter),
            statements: Box::new(FileStatementReader),
        }
    }
}

pub struct Session {
    store: Box<dyn Store>,
    config: SessionConfig,
    tracer: TraceManager,
    collaborators: Collaborators,
}

impl Session {
    pub fn new(store: Box<dyn Store>, collaborators: Collaborators, config: SessionConfig) -> Self {
        Self {
            store,
            config,
            tracer: TraceManager::new(),
            collaborators,
        }
    }

    /// Opens the driver named in `config`.
    pub fn open(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        match config.driver.as_str() {
            MEMORY_DRIVER => Ok(Self::new(
                Box::new(MemoryStore::new()),
                Collaborators::memory(),
                config,
            )),
            other => Err(ConfigError::UnknownDriver {
                name: other.to_string(),
            }),
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn tracer(&self) -> &TraceManager {
        &self.tracer
    }

    pub fn tracer_mut(&mut self) -> &mut TraceManager {
        &mut self.tracer
    }

    /// Splits the session into the query pipeline and the trace manager, so
    /// each query can borrow the live sink.
    pub fn parts(&mut self) -> (Pipeline<'_>, &mut TraceManager) {
        let pipeline = Pipeline {
            parser: self.collaborators.parser.as_ref(),
            planner: self.collaborators.planner.as_ref(),
            store: self.store.as_ref(),
            channel_size: self.config.channel_size,
        };
        (pipeline, &mut self.tracer)
    }

    pub fn export(&self, args: &[String], out: &mut dyn Write) {
        self.collaborators
            .exporter
            .eval(EXPORT_USAGE, args, self.store(), self.config.bulk_size, out);
    }

    pub fn load(&self, args: &[String], out: &mut dyn Write) {
        self.collaborators.loader.eval(
            LOAD_USAGE,
            args,
            self.store(),
            self.config.bulk_size,
            self.config.builder_size,
            out,
        );
    }

    pub fn run_file(&mut self, path: &Path, print_results: bool, out: &mut dyn Write) -> Result<BatchReport, BatchError> {
        let Session {
            store,
            config,
            tracer,
            collaborators,
        } = self;
        let pipeline = Pipeline {
            parser: collaborators.parser.as_ref(),
            planner: collaborators.planner.as_ref(),
            store: store.as_ref(),
            channel_size: config.channel_size,
        };
        batch::run_file(
            &pipeline,
            tracer,
            collaborators.statements.as_ref(),
            path,
            print_results,
            out,
        )
    }

    /// Stops tracing. Returns the trace file that was closed, if any.
    pub fn close(&mut self) -> Option<PathBuf> {
        self.tracer.stop()
    }
}
