//! Parse → plan → execute over the engine contracts.

use std::io::Write;

use trellis_engine::{ExecutionError, ParseError, Parser, Plan, PlanError, Planner, Store, Table};

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    /// A statement that parsed but could not be planned. The planner is not
    /// supposed to reject anything the parser accepts.
    #[error("internal error: planner rejected a parsed statement: {0}")]
    Plan(#[from] PlanError),
    #[error("execution error: {0}")]
    Execution(#[from] ExecutionError),
}

/// Borrowed view of the session pieces a query needs.
#[derive(Clone, Copy)]
pub struct Pipeline<'s> {
    pub parser: &'s dyn Parser,
    pub planner: &'s dyn Planner,
    pub store: &'s dyn Store,
    pub channel_size: usize,
}

impl<'s> Pipeline<'s> {
    pub fn plan<'a>(
        &'a self,
        text: &str,
        trace: Option<&'a mut dyn Write>,
    ) -> Result<Box<dyn Plan + 'a>, QueryError> {
        let statement = self.parser.parse(text)?;
        tracing::debug!(text, "statement parsed");
        let plan = self
            .planner
            .build(self.store, statement, self.channel_size, trace)
            .map_err(|e| {
                tracing::error!(text, error = %e, "planner rejected a parsed statement");
                QueryError::Plan(e)
            })?;
        Ok(plan)
    }

    pub fn plan_and_execute<'a>(
        &'a self,
        text: &str,
        trace: Option<&'a mut dyn Write>,
    ) -> Result<Table, QueryError> {
        let mut plan = self.plan(text, trace)?;
        Ok(plan.execute()?)
    }
}
