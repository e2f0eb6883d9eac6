//! Statement grammar for the memory driver.
//!
//! Keywords are case-insensitive. A trailing `;` is optional so the same
//! parser accepts console input (already stripped) and statement files
//! (which keep it).

use std::num::ParseIntError;

use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, is_not, tag, take, take_while1};
use nom::character::complete::{anychar, char as pchar, digit1, multispace0, multispace1};
use nom::combinator::{cut, eof, map, map_res, not, opt, peek, recognize, verify};
use nom::error::{ErrorKind, FromExternalError, ParseError as NomParseError};
use nom::multi::{many1, many1_count, separated_list1};
use nom::sequence::{delimited, preceded, terminated, tuple};
use nom::IResult;

use crate::triple::{Pattern, Term, Triple};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty statement")]
    Empty,
    #[error("unterminated quoted literal")]
    UnterminatedQuote,
    #[error("unexpected `{found}`, expected {expected}")]
    Unexpected {
        found: String,
        expected: &'static str,
    },
    #[error("unexpected end of statement, expected {0}")]
    UnexpectedEnd(&'static str),
    #[error("variable {0} is not allowed in data blocks")]
    VariableInData(String),
    #[error("a triple needs exactly 3 terms, found {0}")]
    TripleArity(usize),
}

/// Turns statement text into a `Statement`.
pub trait Parser {
    fn parse(&self, text: &str) -> Result<Statement, ParseError>;
}

/// A parsed statement. Keeps its source text for plan descriptions and traces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub text: String,
    pub kind: StatementKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    CreateGraphs(Vec<String>),
    DropGraphs(Vec<String>),
    Insert {
        graphs: Vec<String>,
        data: Vec<Triple>,
    },
    Delete {
        graphs: Vec<String>,
        data: Vec<Triple>,
    },
    Select {
        projection: Vec<String>,
        graphs: Vec<String>,
        patterns: Vec<Pattern>,
        limit: Option<usize>,
    },
    ShowGraphs,
}

/// The grammar above, with no configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatementParser;

impl Parser for StatementParser {
    fn parse(&self, text: &str) -> Result<Statement, ParseError> {
        let body = text.trim();
        if body.strip_suffix(';').unwrap_or(body).trim().is_empty() {
            return Err(ParseError::Empty);
        }
        let kind = finish(
            text,
            terminated(
                ws(statement),
                tuple((opt(pchar(';')), multispace0, expect("end of statement", eof))),
            ),
        )?;
        Ok(Statement {
            text: body.to_string(),
            kind,
        })
    }
}

// =============================================================================
// Parsing
// =============================================================================

pub(crate) type PResult<'a, O> = IResult<&'a str, O, Syntax<'a>>;

/// Grammar error: where parsing stopped and what would have been accepted
/// there. `cause` carries errors raised by semantic checks.
#[derive(Debug)]
pub(crate) struct Syntax<'a> {
    at: &'a str,
    expected: &'static str,
    cause: Option<ParseError>,
}

impl<'a> Syntax<'a> {
    fn because(at: &'a str, cause: ParseError) -> Self {
        Self {
            at,
            expected: "valid syntax",
            cause: Some(cause),
        }
    }

    fn into_parse_error(self) -> ParseError {
        if let Some(cause) = self.cause {
            return cause;
        }
        match found(self.at) {
            Some(found) => ParseError::Unexpected {
                found,
                expected: self.expected,
            },
            None => ParseError::UnexpectedEnd(self.expected),
        }
    }
}

impl<'a> NomParseError<&'a str> for Syntax<'a> {
    fn from_error_kind(input: &'a str, _kind: ErrorKind) -> Self {
        Self {
            at: input,
            expected: "valid syntax",
            cause: None,
        }
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    fn or(self, other: Self) -> Self {
        // Keep whichever branch got further.
        if self.at.len() < other.at.len() {
            self
        } else {
            other
        }
    }
}

impl<'a> FromExternalError<&'a str, ParseError> for Syntax<'a> {
    fn from_external_error(input: &'a str, _kind: ErrorKind, e: ParseError) -> Self {
        Self::because(input, e)
    }
}

impl<'a> FromExternalError<&'a str, ParseIntError> for Syntax<'a> {
    fn from_external_error(input: &'a str, kind: ErrorKind, _e: ParseIntError) -> Self {
        Self::from_error_kind(input, kind)
    }
}

/// Runs `parser` over the whole of `input`, mapping grammar errors.
pub(crate) fn finish<'a, O, F>(input: &'a str, mut parser: F) -> Result<O, ParseError>
where
    F: FnMut(&'a str) -> PResult<'a, O>,
{
    match parser(input) {
        Ok((_, out)) => Ok(out),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e.into_parse_error()),
        Err(nom::Err::Incomplete(_)) => Err(ParseError::UnexpectedEnd("more input")),
    }
}

/// The token at `at`, for error messages.
fn found(at: &str) -> Option<String> {
    let token: PResult<'_, &str> = alt((word, take(1usize)))(at.trim_start());
    token.ok().map(|(_, t)| t.to_string())
}

const VERBS: &str = "create, drop, insert, delete, select or show";

fn statement(input: &str) -> PResult<'_, StatementKind> {
    expect(
        VERBS,
        alt((
            preceded(
                keyword("create"),
                cut(preceded(keyword("graph"), map(graph_names, StatementKind::CreateGraphs))),
            ),
            preceded(
                keyword("drop"),
                cut(preceded(keyword("graph"), map(graph_names, StatementKind::DropGraphs))),
            ),
            preceded(
                keyword("insert"),
                cut(map(
                    tuple((keyword("data"), keyword("into"), graph_names, data_block)),
                    |(_, _, graphs, data)| StatementKind::Insert { graphs, data },
                )),
            ),
            preceded(
                keyword("delete"),
                cut(map(
                    tuple((keyword("data"), keyword("from"), graph_names, data_block)),
                    |(_, _, graphs, data)| StatementKind::Delete { graphs, data },
                )),
            ),
            preceded(keyword("select"), cut(select)),
            preceded(
                keyword("show"),
                cut(map(keyword("graphs"), |_| StatementKind::ShowGraphs)),
            ),
        )),
    )(input)
}

fn select(input: &str) -> PResult<'_, StatementKind> {
    map(
        tuple((
            many1(terminated(variable, opt(ws(pchar(','))))),
            keyword("from"),
            graph_names,
            keyword("where"),
            pattern_block,
            opt(preceded(keyword("limit"), cut(row_limit))),
        )),
        |(projection, _, graphs, _, patterns, limit)| StatementKind::Select {
            projection,
            graphs,
            patterns,
            limit,
        },
    )(input)
}

fn graph_names(input: &str) -> PResult<'_, Vec<String>> {
    separated_list1(
        ws(pchar(',')),
        expect("a graph name", ws(map(word, String::from))),
    )(input)
}

fn variable(input: &str) -> PResult<'_, String> {
    expect(
        "a variable",
        ws(map(verify(word, |w: &str| w.starts_with('?')), String::from)),
    )(input)
}

fn row_limit(input: &str) -> PResult<'_, usize> {
    expect(
        "a row limit",
        ws(map_res(digit1, |s: &str| s.parse::<usize>())),
    )(input)
}

/// `{ t t t . t t t ... }` with an optional trailing `.`.
fn pattern_block(input: &str) -> PResult<'_, Vec<Pattern>> {
    preceded(
        expect("{", ws(pchar('{'))),
        alt((
            map(ws(pchar('}')), |_| Vec::new()),
            cut(terminated(
                separated_list1(ws(separator_dot), pattern),
                tuple((opt(ws(separator_dot)), expect("`.` or `}`", ws(pchar('}'))))),
            )),
        )),
    )(input)
}

fn pattern(input: &str) -> PResult<'_, Pattern> {
    map(tuple((term, term, term)), |(subject, predicate, object)| Pattern {
        subject,
        predicate,
        object,
    })(input)
}

fn data_block(input: &str) -> PResult<'_, Vec<Triple>> {
    map_res(pattern_block, |patterns: Vec<Pattern>| {
        patterns
            .into_iter()
            .map(|p| -> Result<Triple, ParseError> {
                let [s, p, o] = [p.subject, p.predicate, p.object].map(|t| match t {
                    Term::Const(c) => Ok(c),
                    Term::Var(v) => Err(ParseError::VariableInData(v)),
                });
                Ok(Triple::new(s?, p?, o?))
            })
            .collect::<Result<Vec<_>, ParseError>>()
    })(input)
}

fn term(input: &str) -> PResult<'_, Term> {
    expect(
        "a term",
        ws(alt((
            map(string_lit, Term::Const),
            map(word, |w: &str| {
                if w.starts_with('?') {
                    Term::Var(w.to_string())
                } else {
                    Term::Const(w.to_string())
                }
            }),
        ))),
    )(input)
}

/// A bare term or a quoted literal, as written in triple files.
pub(crate) fn value(input: &str) -> PResult<'_, String> {
    ws(alt((string_lit, map(word, String::from))))(input)
}

/// A bare word. A `.` ends it only when followed by whitespace, `}` or the
/// end, so terms like `/u<joe.smith>` stay whole.
fn word(input: &str) -> PResult<'_, &str> {
    recognize(many1_count(alt((
        take_while1(is_word_char),
        recognize(preceded(not(separator_dot), pchar('.'))),
    ))))(input)
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '{' | '}' | ',' | ';' | '"' | '.')
}

pub(crate) fn separator_dot(input: &str) -> PResult<'_, char> {
    terminated(pchar('.'), peek(alt((multispace1, tag("}"), eof))))(input)
}

fn string_lit(input: &str) -> PResult<'_, String> {
    let (input, _) = pchar('"')(input)?;
    let esc = escaped_transform(
        is_not("\\\""),
        '\\',
        alt((
            map(pchar('n'), |_| "\n"),
            map(pchar('t'), |_| "\t"),
            map(pchar('r'), |_| "\r"),
            recognize(anychar),
        )),
    );
    // `escaped_transform` rejects an empty literal.
    let (input, literal) = map(opt(esc), Option::unwrap_or_default)(input)?;
    let closing: PResult<'_, char> = pchar('"')(input);
    match closing {
        Ok((rest, _)) => Ok((rest, literal)),
        Err(_) => Err(nom::Err::Failure(Syntax::because(
            input,
            ParseError::UnterminatedQuote,
        ))),
    }
}

fn keyword<'a>(k: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    expect(k, ws(verify(word, move |w: &str| w.eq_ignore_ascii_case(k))))
}

/// Names what `inner` accepts when it fails without committing.
pub(crate) fn expect<'a, F, O>(
    expected: &'static str,
    mut inner: F,
) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: FnMut(&'a str) -> PResult<'a, O>,
{
    move |input: &'a str| match inner(input) {
        Err(nom::Err::Error(_)) => Err(nom::Err::Error(Syntax {
            at: input,
            expected,
            cause: None,
        })),
        other => other,
    }
}

pub(crate) fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: FnMut(&'a str) -> PResult<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<StatementKind, ParseError> {
        StatementParser.parse(text).map(|s| s.kind)
    }

    #[test]
    fn parses_graph_management() {
        assert_eq!(
            parse("create graph ?a, ?b;").unwrap(),
            StatementKind::CreateGraphs(vec!["?a".into(), "?b".into()])
        );
        assert_eq!(
            parse("DROP GRAPH ?a").unwrap(),
            StatementKind::DropGraphs(vec!["?a".into()])
        );
        assert_eq!(parse("show graphs").unwrap(), StatementKind::ShowGraphs);
    }

    #[test]
    fn parses_insert_data_with_dotted_terms() {
        let kind = parse("insert data into ?a { /u<joe.smith> knows /u<mary> . b c \"d e\" . };")
            .unwrap();
        assert_eq!(
            kind,
            StatementKind::Insert {
                graphs: vec!["?a".into()],
                data: vec![
                    Triple::new("/u<joe.smith>", "knows", "/u<mary>"),
                    Triple::new("b", "c", "d e"),
                ],
            }
        );
    }

    #[test]
    fn rejects_variables_in_data() {
        assert_eq!(
            parse("insert data into ?a { ?x knows b }"),
            Err(ParseError::VariableInData("?x".into()))
        );
    }

    #[test]
    fn parses_select_with_or_without_commas() {
        let kind = parse("select ?s ?o from ?a, ?b where { ?s knows ?o . ?o age \"42\" } limit 3")
            .unwrap();
        let StatementKind::Select {
            projection,
            graphs,
            patterns,
            limit,
        } = kind
        else {
            panic!("expected select");
        };
        assert_eq!(projection, vec!["?s", "?o"]);
        assert_eq!(graphs, vec!["?a", "?b"]);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[1].object, Term::Const("42".into()));
        assert_eq!(limit, Some(3));
    }

    #[test]
    fn reports_syntax_errors() {
        assert_eq!(parse(";"), Err(ParseError::Empty));
        assert!(matches!(
            parse("selekt ?s from ?a where { ?s ?p ?o }"),
            Err(ParseError::Unexpected { .. })
        ));
        assert_eq!(
            parse("select ?s from ?a where {"),
            Err(ParseError::UnexpectedEnd("a term"))
        );
        assert_eq!(parse("insert data into ?a { \"x"), Err(ParseError::UnterminatedQuote));
    }

    #[test]
    fn keywords_match_whole_words_only() {
        assert!(matches!(
            parse("show graphsx"),
            Err(ParseError::Unexpected { expected: "graphs", .. })
        ));
        assert_eq!(
            parse("select ?s from ?a where { ?s ?p ?o } limit"),
            Err(ParseError::UnexpectedEnd("a row limit"))
        );
    }

    #[test]
    fn parses_escaped_and_empty_literals() {
        let kind = parse(r#"insert data into ?a { a says "\"hi\"\n" . a is "" }"#).unwrap();
        assert_eq!(
            kind,
            StatementKind::Insert {
                graphs: vec!["?a".into()],
                data: vec![Triple::new("a", "says", "\"hi\"\n"), Triple::new("a", "is", "")],
            }
        );
    }

    #[test]
    fn reports_trailing_input() {
        assert_eq!(
            parse("show graphs; extra"),
            Err(ParseError::Unexpected {
                found: "extra".into(),
                expected: "end of statement",
            })
        );
    }

    #[test]
    fn keeps_source_text() {
        let stmt = StatementParser.parse("  show graphs;  ").unwrap();
        assert_eq!(stmt.text, "show graphs;");
    }
}
