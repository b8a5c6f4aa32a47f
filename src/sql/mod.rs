//! DDL statement parsing: one file's text to an ordered list of declarations.

mod comments;
mod cursor;
mod lexer;
mod strict;
mod tolerant;
mod types;

pub use comments::strip_comments;
pub use lexer::{Lexer, Span, Spanned, Token};
pub use strict::StrictParser;
pub use tolerant::TolerantParser;
pub use types::normalize_type;

use crate::ast::Declaration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: unterminated string literal")]
    UnterminatedString { line: usize },
    #[error("line {line}: unterminated quoted identifier")]
    UnterminatedIdentifier { line: usize },
    #[error("line {line}: unterminated block comment")]
    UnterminatedComment { line: usize },
    #[error("line {line}: expected {expected}, found {found}")]
    Expected {
        expected: &'static str,
        found: String,
        line: usize,
    },
    #[error("line {line}: invalid number `{text}`")]
    InvalidNumber { text: String, line: usize },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::UnterminatedString { line }
            | ParseError::UnterminatedIdentifier { line }
            | ParseError::UnterminatedComment { line }
            | ParseError::Expected { line, .. }
            | ParseError::InvalidNumber { line, .. } => *line,
        }
    }
}

/// A parse failure tied to the file it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {source}")]
pub struct FileParseError {
    pub path: String,
    #[source]
    pub source: ParseError,
}

/// Turns one file's DDL text into declarations.
///
/// A failure yields no partial result.
pub trait StatementParser: Send + Sync {
    fn name(&self) -> &'static str;

    fn parse(&self, text: &str) -> Result<Vec<Declaration>, ParseError>;
}

/// Which [`StatementParser`] a batch runs with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    Strict,
    #[default]
    Tolerant,
}

impl ParserKind {
    pub fn parser(self) -> Box<dyn StatementParser> {
        match self {
            ParserKind::Strict => Box::new(StrictParser),
            ParserKind::Tolerant => Box::new(TolerantParser),
        }
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParserKind::Strict => f.write_str("strict"),
            ParserKind::Tolerant => f.write_str("tolerant"),
        }
    }
}

impl FromStr for ParserKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(ParserKind::Strict),
            "tolerant" => Ok(ParserKind::Tolerant),
            other => Err(format!("unknown parser `{other}` (expected strict or tolerant)")),
        }
    }
}

/// Parse one file, attaching its path to any failure.
pub fn parse_file(
    parser: &dyn StatementParser,
    path: &str,
    text: &str,
) -> Result<Vec<Declaration>, FileParseError> {
    parser.parse(text).map_err(|source| FileParseError {
        path: path.to_string(),
        source,
    })
}
