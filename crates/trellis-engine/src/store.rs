//! The graph store contract.

use crate::triple::Triple;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("graph {0} does not exist")]
    GraphNotFound(String),
    #[error("graph {0} already exists")]
    GraphExists(String),
}

/// A backend holding named graphs of triples.
///
/// Handles are shared (`&dyn Store`) between the session, plans, and the bulk
/// utilities, so mutation goes through `&self`.
pub trait Store {
    /// Driver name, shown in the session banner.
    fn name(&self) -> String;

    fn version(&self) -> String;

    fn new_graph(&self, id: &str) -> Result<(), StoreError>;

    fn delete_graph(&self, id: &str) -> Result<(), StoreError>;

    /// Graph names in sorted order.
    fn graph_names(&self) -> Vec<String>;

    /// Adds triples to `graph`, returning how many were new.
    fn add_triples(&self, graph: &str, triples: &[Triple]) -> Result<usize, StoreError>;

    /// Removes triples from `graph`, returning how many were present.
    fn remove_triples(&self, graph: &str, triples: &[Triple]) -> Result<usize, StoreError>;

    /// Snapshot of every triple in `graph`, in sorted order.
    fn triples(&self, graph: &str) -> Result<Vec<Triple>, StoreError>;
}
