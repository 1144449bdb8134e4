//! Response types: the verdict of a validation run and its diagnostics.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::common::{ColumnRef, StatementKind};
use crate::error::ParseError;

/// The single terminal result of a validation run.
///
/// Every path through the pipeline ends in exactly one variant. Lists carried
/// by [`SchemaViolation`] are sorted, so two runs over the same input compare
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "verdict", rename_all = "camelCase")]
pub enum Verdict {
    /// The statement is a read-only query over known tables and columns.
    Valid,
    /// The statement mutates data or is not a `SELECT`.
    Unsafe { reason: UnsafeReason },
    /// The statement references tables or columns missing from the schema.
    SchemaViolation(SchemaViolation),
    /// The statement could not be tokenized or structurally recognized.
    ParseError { error: ParseError },
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn is_unsafe(&self) -> bool {
        matches!(self, Self::Unsafe { .. })
    }

    /// Short machine-readable name of the variant.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Valid => "VALID",
            Self::Unsafe { .. } => "UNSAFE",
            Self::SchemaViolation(_) => "SCHEMA_VIOLATION",
            Self::ParseError { .. } => "PARSE_ERROR",
        }
    }

    pub fn schema_violation(&self) -> Option<&SchemaViolation> {
        match self {
            Self::SchemaViolation(violation) => Some(violation),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "Valid SQL query"),
            Self::Unsafe { reason } => write!(f, "Unsupported Query: {reason}"),
            Self::SchemaViolation(violation) => write!(f, "Unsupported Query: {violation}"),
            Self::ParseError { error } => {
                write!(f, "Unsupported Query: Invalid SQL syntax - {error}")
            }
        }
    }
}

/// A keyword from the fixed deny-list of mutating/DDL operations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeniedKeyword {
    Delete,
    Drop,
    Truncate,
    Alter,
    Create,
    Insert,
    Update,
}

impl DeniedKeyword {
    /// The deny-list in evaluation order. On multiple matches the earliest
    /// entry here wins, not the earliest occurrence in the statement.
    pub const ALL: [DeniedKeyword; 7] = [
        Self::Delete,
        Self::Drop,
        Self::Truncate,
        Self::Alter,
        Self::Create,
        Self::Insert,
        Self::Update,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Drop => "DROP",
            Self::Truncate => "TRUNCATE",
            Self::Alter => "ALTER",
            Self::Create => "CREATE",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
        }
    }
}

impl fmt::Display for DeniedKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a statement was judged unsafe, and which check decided it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum UnsafeReason {
    /// The lexical safety gate found a deny-listed keyword.
    DeniedKeyword { keyword: DeniedKeyword },
    /// The parsed statement is not a `SELECT`.
    StatementKind { kind: StatementKind },
}

impl fmt::Display for UnsafeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeniedKeyword { keyword } => write!(
                f,
                "DML operations like {keyword} are not supported. Only SELECT queries are allowed."
            ),
            Self::StatementKind { kind } => {
                write!(f, "only SELECT statements are permitted (found {kind})")
            }
        }
    }
}

/// Unknown table and column references with everything needed to correct them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct SchemaViolation {
    /// Referenced tables that do not exist, sorted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalid_tables: Vec<String>,

    /// Qualified column references that do not exist on their table, sorted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalid_columns: Vec<ColumnRef>,

    /// Every table name in the schema, sorted
    pub available_tables: Vec<String>,

    /// For each table implicated by an invalid column, all of its columns in schema order
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub available_columns: BTreeMap<String, Vec<String>>,
}

impl SchemaViolation {
    pub fn is_empty(&self) -> bool {
        self.invalid_tables.is_empty() && self.invalid_columns.is_empty()
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote_tables = false;
        if !self.invalid_tables.is_empty() {
            write!(
                f,
                "Table(s) '{}' do not exist in the database schema. Available tables: {}",
                self.invalid_tables.join(", "),
                self.available_tables.join(", ")
            )?;
            wrote_tables = true;
        }

        if !self.invalid_columns.is_empty() {
            if wrote_tables {
                f.write_str(". ")?;
            }
            let columns: Vec<String> = self.invalid_columns.iter().map(ToString::to_string).collect();
            let available: Vec<String> = self
                .available_columns
                .iter()
                .map(|(table, columns)| format!("{table} table: {}", columns.join(", ")))
                .collect();
            write!(
                f,
                "Column(s) '{}' do not exist in the schema. Available columns: {}",
                columns.join(", "),
                available.join("; ")
            )?;
        }

        Ok(())
    }
}

/// The pipeline stage that produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    SafetyGate,
    Parser,
    SchemaValidator,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SafetyGate => "safety gate",
            Self::Parser => "parser",
            Self::SchemaValidator => "schema validator",
        };
        f.write_str(name)
    }
}

/// A verdict together with the stage that decided it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub verdict: Verdict,

    /// Stage that produced the verdict (the schema validator for `Valid`)
    pub stage: Stage,

    /// Statement kind, when the statement got far enough to be parsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_kind: Option<StatementKind>,
}
