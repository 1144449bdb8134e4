//! Types for the SQL validation API.
//!
//! This module defines the request and response types shared by the parser,
//! the schema validator and the pipeline. Response types serialize to JSON so
//! that any presentation layer can render a complete diagnostic.

mod common;
mod request;
mod response;

// Re-export all public types
pub use common::{ColumnRef, StatementKind};
pub use request::{Dialect, ValidateOptions};
pub use response::{
    DeniedKeyword, SchemaViolation, Stage, UnsafeReason, ValidationReport, Verdict,
};
