//! Triples, pattern terms, and their text form.

use std::fmt;

use nom::combinator::{eof, opt};
use nom::multi::many0;
use nom::sequence::{terminated, tuple};

use crate::parser::{expect, finish, separator_dot, value, ws, ParseError};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Parses one line of a triple file: three terms, optionally followed by `.`.
    pub fn parse_line(line: &str) -> Result<Self, ParseError> {
        let terms = finish(
            line,
            terminated(
                many0(value),
                tuple((opt(ws(separator_dot)), expect("end of line", eof))),
            ),
        )?;
        match <[String; 3]>::try_from(terms) {
            Ok([s, p, o]) => Ok(Self::new(s, p, o)),
            Err(terms) => Err(ParseError::TripleArity(terms.len())),
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            Quoted(&self.subject),
            Quoted(&self.predicate),
            Quoted(&self.object)
        )
    }
}

/// Writes a term, quoting and escaping it when it would not parse back as a
/// bare word.
struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bare = !self.0.is_empty()
            && !self.0.starts_with('?')
            && !self
                .0
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '"' | '{' | '}' | ',' | ';'))
            && !self.0.ends_with('.');
        if bare {
            return f.write_str(self.0);
        }
        f.write_str("\"")?;
        for c in self.0.chars() {
            match c {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                '\n' => f.write_str("\\n")?,
                '\t' => f.write_str("\\t")?,
                '\r' => f.write_str("\\r")?,
                c => write!(f, "{c}")?,
            }
        }
        f.write_str("\"")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Var(String),
    Const(String),
}

impl Term {
    pub fn var(&self) -> Option<&str> {
        match self {
            Term::Var(name) => Some(name),
            Term::Const(_) => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Var(name) => f.write_str(name),
            Term::Const(value) => Quoted(value).fmt(f),
        }
    }
}

/// A triple pattern inside a `where { ... }` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Pattern {
    pub fn terms(&self) -> [&Term; 3] {
        [&self.subject, &self.predicate, &self.object]
    }

    pub fn vars(&self) -> impl Iterator<Item = &str> {
        self.terms().into_iter().filter_map(Term::var)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}
