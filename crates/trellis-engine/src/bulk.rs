//! Bulk triple load and export.
//!
//! Both utilities take a raw argument vector (`[program, command, ...]`) and
//! report their own errors on `out`. The caller only measures time.
//!
//! Triple files hold one `subject predicate object` triple per line. Blank
//! lines and lines starting with `#` are ignored.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::store::Store;
use crate::triple::Triple;

pub trait Exporter {
    /// `args` is `[program, "export", graphs, path]`.
    fn eval(&self, usage: &str, args: &[String], store: &dyn Store, bulk_size: usize, out: &mut dyn Write);
}

pub trait Loader {
    /// `args` is `[program, "load", path, graphs]`.
    fn eval(
        &self,
        usage: &str,
        args: &[String],
        store: &dyn Store,
        bulk_size: usize,
        builder_size: usize,
        out: &mut dyn Write,
    );
}

fn graph_list(arg: &str) -> Vec<String> {
    arg.split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TripleFileExporter;

impl TripleFileExporter {
    fn export(
        &self,
        graphs: &[String],
        path: &Path,
        store: &dyn Store,
        bulk_size: usize,
    ) -> Result<usize, String> {
        let mut triples = Vec::new();
        for g in graphs {
            triples.extend(store.triples(g).map_err(|e| e.to_string())?);
        }
        triples.sort();
        triples.dedup();

        let file = File::create(path).map_err(|e| format!("failed to create {}: {e}", path.display()))?;
        let mut w = BufWriter::new(file);
        let write_err = |e: io::Error| format!("failed to write {}: {e}", path.display());
        for chunk in triples.chunks(bulk_size.max(1)) {
            for t in chunk {
                writeln!(w, "{t}").map_err(write_err)?;
            }
            w.flush().map_err(write_err)?;
            tracing::debug!(triples = chunk.len(), "exported chunk");
        }
        Ok(triples.len())
    }
}

impl Exporter for TripleFileExporter {
    fn eval(&self, usage: &str, args: &[String], store: &dyn Store, bulk_size: usize, out: &mut dyn Write) {
        if args.len() != 4 {
            let _ = writeln!(out, "{usage}");
            return;
        }
        let graphs = graph_list(&args[2]);
        let path = Path::new(&args[3]);
        let _ = match self.export(&graphs, path, store, bulk_size) {
            Ok(n) => writeln!(
                out,
                "Exported {n} triples from {} into {}",
                graphs.join(", "),
                path.display()
            ),
            Err(e) => {
                tracing::warn!(error = %e, "export failed");
                writeln!(out, "[ERROR] {e}")
            }
        };
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TripleFileLoader;

impl TripleFileLoader {
    fn load(
        &self,
        path: &Path,
        graphs: &[String],
        store: &dyn Store,
        bulk_size: usize,
        builder_size: usize,
    ) -> Result<usize, String> {
        for g in graphs {
            // Fail before reading anything if a target graph is missing.
            store.triples(g).map_err(|e| e.to_string())?;
        }
        let text = fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        let bulk_size = bulk_size.max(1);
        let mut batch: Vec<Triple> = Vec::with_capacity(builder_size.min(bulk_size));
        let mut loaded = 0usize;
        let mut flush = |batch: &mut Vec<Triple>| -> Result<(), String> {
            for g in graphs {
                store.add_triples(g, batch).map_err(|e| e.to_string())?;
            }
            loaded += batch.len();
            tracing::debug!(triples = batch.len(), "loaded chunk");
            batch.clear();
            Ok(())
        };

        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let triple = Triple::parse_line(line)
                .map_err(|e| format!("{}:{}: {e}", path.display(), idx + 1))?;
            batch.push(triple);
            if batch.len() >= bulk_size {
                flush(&mut batch)?;
            }
        }
        if !batch.is_empty() {
            flush(&mut batch)?;
        }
        Ok(loaded)
    }
}

impl Loader for TripleFileLoader {
    fn eval(
        &self,
        usage: &str,
        args: &[String],
        store: &dyn Store,
        bulk_size: usize,
        builder_size: usize,
        out: &mut dyn Write,
    ) {
        if args.len() != 4 {
            let _ = writeln!(out, "{usage}");
            return;
        }
        let path = Path::new(&args[2]);
        let graphs = graph_list(&args[3]);
        let _ = match self.load(path, &graphs, store, bulk_size, builder_size) {
            Ok(n) => writeln!(
                out,
                "Loaded {n} triples from {} into {}",
                path.display(),
                graphs.join(", ")
            ),
            Err(e) => {
                tracing::warn!(error = %e, "load failed");
                writeln!(out, "[ERROR] {e}")
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use tempfile::tempdir;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn export_then_load_moves_triples_between_graphs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.triples");
        let path_str = path.to_str().unwrap();

        let store = MemoryStore::new();
        store.new_graph("?a").unwrap();
        store.new_graph("?b").unwrap();
        store
            .add_triples(
                "?a",
                &[Triple::new("joe", "knows", "mary"), Triple::new("joe", "full name", "Joe S")],
            )
            .unwrap();

        let mut out = Vec::new();
        TripleFileExporter.eval("usage", &args(&["t", "export", "?a", path_str]), &store, 1, &mut out);
        TripleFileLoader.eval("usage", &args(&["t", "load", path_str, "?b"]), &store, 1, 1, &mut out);

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Exported 2 triples"), "{printed}");
        assert!(printed.contains("Loaded 2 triples"), "{printed}");
        assert_eq!(store.triples("?b").unwrap(), store.triples("?a").unwrap());
    }

    #[test]
    fn wrong_arity_prints_usage() {
        let store = MemoryStore::new();
        let mut out = Vec::new();
        TripleFileLoader.eval("usage: load <file> <graphs>", &args(&["t", "load"]), &store, 10, 10, &mut out);
        assert_eq!(String::from_utf8(out).unwrap(), "usage: load <file> <graphs>\n");
    }

    #[test]
    fn load_into_missing_graph_reports_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.triples");
        fs::write(&path, "# comment\na b c\n").unwrap();

        let store = MemoryStore::new();
        let mut out = Vec::new();
        TripleFileLoader.eval(
            "usage",
            &args(&["t", "load", path.to_str().unwrap(), "?nope"]),
            &store,
            10,
            10,
            &mut out,
        );
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("[ERROR] graph ?nope does not exist"), "{printed}");
    }
}
