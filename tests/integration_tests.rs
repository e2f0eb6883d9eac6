//! Integration tests for complete console sessions
//!
//! These tests drive the console end to end over the memory driver:
//! - scripted input → accumulator → dispatcher → store
//! - statement files through `run`
//! - triple files through `load` / `export`
//! - trace files across session teardown
//!
//! Run with: cargo test --test integration_tests

use std::fs;
use std::io::{self, Cursor};
use std::path::Path;

use tempfile::tempdir;
use trellis_cli::{
    run_repl, spawn_accumulator, LineSource, ReaderLines, Session, SessionConfig, Statements,
};
use trellis_engine::Triple;

fn scripted(input: &str) -> Statements {
    let input = input.to_string();
    spawn_accumulator("trellis> ", move || {
        Ok(Box::new(ReaderLines::new(Cursor::new(input), io::sink())) as Box<dyn LineSource>)
    })
    .unwrap()
}

fn memory_session() -> Session {
    Session::open(SessionConfig::default()).unwrap()
}

fn run_script(session: &mut Session, input: &str) -> String {
    colored::control::set_override(false);
    let mut out = Vec::new();
    run_repl(session, scripted(input), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

// ============================================================================
// Interactive sessions
// ============================================================================

#[test]
fn test_session_creates_inserts_and_selects() {
    let mut session = memory_session();
    let printed = run_script(
        &mut session,
        r#"create graph ?people;
insert data into ?people {
  /u<joe> knows /u<mary> .
  /u<mary> knows /u<peter>
};
select ?a, ?c from ?people
  where { ?a knows ?b . ?b knows ?c };
quit;
"#,
    );

    assert!(printed.contains("| ?a      | ?c        |"), "{printed}");
    assert!(printed.contains("| /u<joe> | /u<peter> |"), "{printed}");
    assert!(printed.contains("[OK] Time spent"), "{printed}");
    assert_eq!(session.store().graph_names(), vec!["?people"]);
}

#[test]
fn test_errors_do_not_end_the_session() {
    let mut session = memory_session();
    let printed = run_script(
        &mut session,
        "frobnicate;\nselect ?s from ?missing where { ?s ?p ?o };\nrun;\ncreate graph ?a;\n",
    );

    assert!(printed.contains("[ERROR] parse error"), "{printed}");
    assert!(printed.contains("[ERROR] execution error: graph ?missing does not exist"), "{printed}");
    assert!(printed.contains("[ERROR] invalid syntax"), "{printed}");
    assert_eq!(session.store().graph_names(), vec!["?a"]);
    assert!(printed.contains("Thanks for all those queries!"), "{printed}");
}

#[test]
fn test_quit_discards_everything_after_it() {
    let mut session = memory_session();
    run_script(&mut session, "create graph ?a;\nQUIT;\ncreate graph ?b;\n");
    assert_eq!(session.store().graph_names(), vec!["?a"]);
}

#[test]
fn test_desc_has_no_side_effects() {
    let mut session = memory_session();
    let printed = run_script(&mut session, "desc create graph ?a;\nshow graphs;\n");

    assert!(printed.contains("create graphs: ?a"), "{printed}");
    assert!(printed.contains("[OK]"), "{printed}");
    assert!(session.store().graph_names().is_empty());
}

#[test]
fn test_help_is_printed_without_touching_the_store() {
    let mut session = memory_session();
    let printed = run_script(&mut session, "help;\n");
    assert!(printed.contains("quit;"), "{printed}");
    assert!(session.store().graph_names().is_empty());
    assert!(!session.tracer().is_active());
}

// ============================================================================
// Batch runs
// ============================================================================

fn write_statements(dir: &Path, text: &str) -> std::path::PathBuf {
    let path = dir.join("batch.tql");
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_run_executes_a_statement_file() {
    let dir = tempdir().unwrap();
    let path = write_statements(
        dir.path(),
        "# seed\ncreate graph ?a;\ninsert data into ?a {\n  a b c\n};\n",
    );

    let mut session = memory_session();
    let printed = run_script(&mut session, &format!("run {};\n", path.display()));

    assert!(printed.contains("Processing statement (2/2)"), "{printed}");
    assert!(printed.contains("and run 2 statements successfully"), "{printed}");
    assert_eq!(session.store().triples("?a").unwrap(), vec![Triple::new("a", "b", "c")]);
}

#[test]
fn test_run_stops_at_the_failing_statement() {
    let dir = tempdir().unwrap();
    let path = write_statements(
        dir.path(),
        "create graph ?a;\ncreate graph ?b;\ndrop graph ?missing;\ncreate graph ?c;\ncreate graph ?d;\n",
    );

    let mut session = memory_session();
    let printed = run_script(&mut session, &format!("run {};\n", path.display()));

    assert!(printed.contains("Processing statement (3/5)"), "{printed}");
    assert!(!printed.contains("Processing statement (4/5)"), "{printed}");
    assert!(printed.contains("statement 3 of 5 failed: drop graph ?missing;"), "{printed}");
    assert_eq!(session.store().graph_names(), vec!["?a", "?b"]);
}

// ============================================================================
// Load / export
// ============================================================================

#[test]
fn test_export_then_load_round_trips_through_a_file() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("people.triples");

    let mut session = memory_session();
    let printed = run_script(
        &mut session,
        &format!(
            "create graph ?a, ?b;\ninsert data into ?a {{ joe \"full name\" \"Joe Smith\" }};\nexport ?a {0};\nload {0} ?b;\n",
            file.display()
        ),
    );

    assert!(printed.contains("Exported 1 triples"), "{printed}");
    assert!(printed.contains("Loaded 1 triples"), "{printed}");
    assert_eq!(
        session.store().triples("?b").unwrap(),
        vec![Triple::new("joe", "full name", "Joe Smith")]
    );
}

// ============================================================================
// Tracing
// ============================================================================

#[test]
fn test_trace_file_is_closed_when_input_ends() {
    let dir = tempdir().unwrap();
    let trace = dir.path().join("trace.log");

    let mut session = memory_session();
    let printed = run_script(
        &mut session,
        &format!("start tracing {};\ncreate graph ?a;\n", trace.display()),
    );

    assert!(printed.contains("[WARNING] Tracing is on"), "{printed}");
    assert!(printed.contains("Closing tracing file."), "{printed}");
    let text = fs::read_to_string(&trace).unwrap();
    assert!(text.contains("planner: building plan"), "{text}");
    assert!(text.contains("created graph ?a"), "{text}");
}

#[test]
fn test_unwritable_trace_file_leaves_tracing_off() {
    let mut session = memory_session();
    let printed = run_script(
        &mut session,
        "start tracing /nonexistent/dir/file;\ncreate graph ?a;\n",
    );

    assert!(printed.contains("[ERROR] failed to create trace file"), "{printed}");
    assert!(!printed.contains("Closing tracing file."), "{printed}");
    assert_eq!(session.store().graph_names(), vec!["?a"]);
}
