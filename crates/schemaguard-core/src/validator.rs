//! Schema validation of a parsed statement.

use crate::error::{ParseError, ParseErrorKind};
use crate::parser::ParsedStatement;
use crate::schema::Schema;
use crate::types::{ColumnRef, SchemaViolation, StatementKind, UnsafeReason, Verdict};
use std::collections::BTreeMap;

/// Check a parsed statement against the schema.
///
/// Non-`SELECT` statements are rejected before any lookup. Otherwise every
/// referenced table must exist, and every qualified column whose qualifier
/// resolves to a schema table must exist on that table. Qualifiers resolve
/// through the aliases bound in the scope where the column appears. Unknown
/// tables and columns are reported together in one [`SchemaViolation`].
pub fn validate(parsed: &ParsedStatement, schema: &Schema) -> Verdict {
    match parsed.kind {
        StatementKind::Malformed => {
            return Verdict::ParseError {
                error: ParseError::new("statement does not begin with a keyword or name")
                    .with_kind(ParseErrorKind::Malformed),
            };
        }
        kind if !kind.is_read_only() => {
            return Verdict::Unsafe {
                reason: UnsafeReason::StatementKind { kind },
            };
        }
        _ => {}
    }

    let invalid_tables: Vec<String> = parsed
        .referenced_tables
        .iter()
        .filter(|table| !schema.has_table(table))
        .cloned()
        .collect();

    // Columns of unknown tables are covered by the table report.
    let invalid_columns: Vec<ColumnRef> = parsed
        .column_refs
        .iter()
        .filter(|reference| {
            schema.has_table(&reference.table)
                && !schema.has_column(&reference.table, &reference.column)
        })
        .cloned()
        .collect();

    let mut violation = SchemaViolation {
        invalid_tables,
        invalid_columns,
        ..Default::default()
    };
    if violation.is_empty() {
        return Verdict::Valid;
    }

    violation.available_tables = schema.table_names();
    violation.available_columns = violation
        .invalid_columns
        .iter()
        .map(|reference| {
            (
                reference.table.clone(),
                schema.available_columns(&reference.table),
            )
        })
        .collect::<BTreeMap<_, _>>();

    Verdict::SchemaViolation(violation)
}
