//! Error types for schema loading and SQL parsing.
//!
//! # Error Handling Strategy
//!
//! This crate separates two kinds of failure:
//!
//! - [`SchemaLoadError`]: construction-time failures. Without a schema no
//!   validation is possible, so callers treat this as fatal to startup.
//!
//! - [`ParseError`]: the candidate SQL text could not be tokenized or
//!   structurally recognized. It is always recoverable and is reported to the
//!   caller inside [`crate::Verdict::ParseError`] rather than propagated.
//!
//! Unsafe statements and schema violations are not errors at all; they are
//! verdict data.

use crate::types::Dialect;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;
#[cfg(feature = "tracing")]
use tracing::trace;

/// Error encountered while parsing a candidate SQL statement.
///
/// This error preserves structured information from the tokenizer or the
/// underlying parser, including position information when available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParseError {
    /// Human-readable error message.
    pub message: String,
    /// Line/column where the error occurred, if available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// The SQL dialect being parsed when the error occurred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<Dialect>,
    /// The specific category of parse error.
    pub kind: ParseErrorKind,
}

/// Position information for a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

/// Category of parse error for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ParseErrorKind {
    /// Unexpected token or character in input.
    #[default]
    SyntaxError,
    /// Nothing but whitespace, comments or terminators.
    Empty,
    /// Lexer/tokenization error, e.g. an unterminated quote.
    LexerError,
    /// Opening and closing parentheses do not pair up.
    UnbalancedParentheses,
    /// More than one non-empty statement in the input.
    MultipleStatements,
    /// The statement does not start with a keyword or name.
    Malformed,
    /// Missing required clause or keyword (strict mode).
    MissingClause,
    /// Invalid or unexpected end of input (strict mode).
    UnexpectedEof,
    /// Feature not supported by the current dialect (strict mode).
    UnsupportedFeature,
}

impl ParseError {
    /// Creates a new parse error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
            dialect: None,
            kind: ParseErrorKind::SyntaxError,
        }
    }

    /// Creates a parse error with position information.
    pub fn with_position(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            position: Some(Position { line, column }),
            dialect: None,
            kind: ParseErrorKind::SyntaxError,
        }
    }

    /// The error reported for empty input.
    pub fn empty() -> Self {
        Self::new("empty statement").with_kind(ParseErrorKind::Empty)
    }

    /// Adds dialect context to the error.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Sets the error kind.
    pub fn with_kind(mut self, kind: ParseErrorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Parses position from sqlparser error message format.
    ///
    /// sqlparser uses format like "Expected ..., found ... at Line: X, Column: Y"
    ///
    /// # Implementation Note
    ///
    /// This parsing is coupled to the `sqlparser` crate's error message format.
    /// Gracefully returns `None` when the expected format is not found.
    fn parse_position_from_message(message: &str) -> Option<Position> {
        static POSITION_REGEX: OnceLock<Regex> = OnceLock::new();
        let re = POSITION_REGEX.get_or_init(|| {
            Regex::new(r"Line:\s*(\d+)\s*,\s*Column:\s*(\d+)").expect("Invalid regex pattern")
        });

        let result = re.captures(message).and_then(|caps| {
            let line: usize = caps.get(1)?.as_str().parse().ok()?;
            let column: usize = caps.get(2)?.as_str().parse().ok()?;
            Some(Position { line, column })
        });

        #[cfg(feature = "tracing")]
        if result.is_none() && (message.contains("Line") || message.contains("Column")) {
            trace!(
                "Failed to parse position from error message that appears to contain position info: {}",
                message
            );
        }

        result
    }

    /// Determines the error kind from the message content.
    fn infer_kind_from_message(message: &str) -> ParseErrorKind {
        let lower = message.to_lowercase();
        if lower.contains("unexpected end") || lower.contains("eof") {
            ParseErrorKind::UnexpectedEof
        } else if lower.contains("expected") {
            ParseErrorKind::MissingClause
        } else if lower.contains("not supported") || lower.contains("unsupported") {
            ParseErrorKind::UnsupportedFeature
        } else if lower.contains("lexer") || lower.contains("token") {
            ParseErrorKind::LexerError
        } else {
            ParseErrorKind::SyntaxError
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error")?;

        if let Some(dialect) = self.dialect {
            write!(f, " ({dialect:?})")?;
        }

        if let Some(pos) = self.position {
            write!(f, " at line {}, column {}", pos.line, pos.column)?;
        }

        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<sqlparser::parser::ParserError> for ParseError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        let message = err.to_string();
        let position = Self::parse_position_from_message(&message);
        let kind = Self::infer_kind_from_message(&message);

        Self {
            message,
            position,
            dialect: None,
            kind,
        }
    }
}

impl From<sqlparser::tokenizer::TokenizerError> for ParseError {
    fn from(err: sqlparser::tokenizer::TokenizerError) -> Self {
        // Location 0:0 means the tokenizer had no position to report.
        let position = (err.location.line > 0).then_some(Position {
            line: err.location.line as usize,
            column: err.location.column as usize,
        });

        Self {
            message: err.message,
            position,
            dialect: None,
            kind: ParseErrorKind::LexerError,
        }
    }
}

/// Error encountered while constructing a [`crate::Schema`].
#[derive(Debug, thiserror::Error)]
pub enum SchemaLoadError {
    #[error("failed to read schema file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed schema document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("failed to parse schema DDL: {0}")]
    Ddl(#[from] ParseError),

    #[error("table at position {index} has an empty name")]
    EmptyTableName { index: usize },

    #[error("duplicate table name '{name}' in schema")]
    DuplicateTable { name: String },

    #[error("schema source defines no tables")]
    Empty,
}
