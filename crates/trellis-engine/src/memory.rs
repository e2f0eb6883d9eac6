//! Volatile in-memory store.

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::RwLock;

use crate::store::{Store, StoreError};
use crate::triple::Triple;
use crate::MEMORY_DRIVER;

#[derive(Debug, Default)]
pub struct MemoryStore {
    graphs: RwLock<BTreeMap<String, BTreeSet<Triple>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn name(&self) -> String {
        MEMORY_DRIVER.to_string()
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn new_graph(&self, id: &str) -> Result<(), StoreError> {
        let mut graphs = self.graphs.write();
        if graphs.contains_key(id) {
            return Err(StoreError::GraphExists(id.to_string()));
        }
        graphs.insert(id.to_string(), BTreeSet::new());
        Ok(())
    }

    fn delete_graph(&self, id: &str) -> Result<(), StoreError> {
        self.graphs
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::GraphNotFound(id.to_string()))
    }

    fn graph_names(&self) -> Vec<String> {
        self.graphs.read().keys().cloned().collect()
    }

    fn add_triples(&self, graph: &str, triples: &[Triple]) -> Result<usize, StoreError> {
        let mut graphs = self.graphs.write();
        let g = graphs
            .get_mut(graph)
            .ok_or_else(|| StoreError::GraphNotFound(graph.to_string()))?;
        Ok(triples.iter().filter(|t| g.insert((*t).clone())).count())
    }

    fn remove_triples(&self, graph: &str, triples: &[Triple]) -> Result<usize, StoreError> {
        let mut graphs = self.graphs.write();
        let g = graphs
            .get_mut(graph)
            .ok_or_else(|| StoreError::GraphNotFound(graph.to_string()))?;
        Ok(triples.iter().filter(|t| g.remove(*t)).count())
    }

    fn triples(&self, graph: &str) -> Result<Vec<Triple>, StoreError> {
        self.graphs
            .read()
            .get(graph)
            .map(|g| g.iter().cloned().collect())
            .ok_or_else(|| StoreError::GraphNotFound(graph.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graphs_are_created_once_and_deleted_once() {
        let store = MemoryStore::new();
        store.new_graph("?a").unwrap();
        assert_eq!(
            store.new_graph("?a"),
            Err(StoreError::GraphExists("?a".into()))
        );
        store.delete_graph("?a").unwrap();
        assert_eq!(
            store.delete_graph("?a"),
            Err(StoreError::GraphNotFound("?a".into()))
        );
    }

    #[test]
    fn add_and_remove_report_effective_counts() {
        let store = MemoryStore::new();
        store.new_graph("?g").unwrap();
        let t = Triple::new("a", "knows", "b");
        assert_eq!(store.add_triples("?g", &[t.clone(), t.clone()]).unwrap(), 1);
        assert_eq!(store.triples("?g").unwrap(), vec![t.clone()]);
        assert_eq!(store.remove_triples("?g", &[t.clone()]).unwrap(), 1);
        assert_eq!(store.remove_triples("?g", &[t]).unwrap(), 0);
        assert!(store.add_triples("?missing", &[]).is_err());
    }
}
