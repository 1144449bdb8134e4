//! Schema-bound SQL safety validation.
//!
//! Decides whether a candidate SQL statement is a read-only `SELECT` over
//! tables and columns that exist in a known [`Schema`]. A run passes through
//! three stages in fixed order, and the first one to fail produces the
//! [`Verdict`]:
//!
//! 1. [`safety::check_safety`] rejects deny-listed keywords in the raw text.
//! 2. [`parser::parse`] recovers the statement kind and its table and column
//!    references.
//! 3. [`validator::validate`] checks those references against the schema.
//!
//! [`run`] wires the stages together.

pub mod error;
pub mod parser;
pub mod pipeline;
pub mod safety;
pub mod schema;
pub mod types;
pub mod validator;

// Re-export main types and functions
pub use error::{ParseError, ParseErrorKind, Position, SchemaLoadError};
pub use parser::{
    parse, parse_sql, parse_sql_with_dialect, parse_with_dialect, parse_with_options,
    ParsedStatement,
};
pub use pipeline::{run, run_report, run_with_options};
pub use safety::{check_safety, Safety};
pub use schema::{Schema, SchemaStore, Table};
pub use validator::validate;

pub use types::{
    // Shared
    ColumnRef,
    // Request types
    Dialect,
    StatementKind,
    ValidateOptions,
    // Response types
    DeniedKeyword,
    SchemaViolation,
    Stage,
    UnsafeReason,
    ValidationReport,
    Verdict,
};
