//! The validation pipeline: safety gate, then parser, then schema validator.
//!
//! Each stage can end the run. The first failing stage produces the verdict
//! and later stages are skipped. Every function here is a pure function of
//! its inputs, so any number of runs may share one [`Schema`].

use crate::parser::parse_with_options;
use crate::safety::{check_safety, Safety};
use crate::schema::Schema;
use crate::types::{Stage, UnsafeReason, ValidateOptions, ValidationReport, Verdict};
use crate::validator::validate;
#[cfg(feature = "tracing")]
use tracing::{debug, info_span};

/// Validate one candidate statement with the default options.
///
/// # Example
///
/// ```
/// use schemaguard_core::{run, Schema, Table, Verdict};
///
/// let schema = Schema::from_tables(vec![
///     Table::new("users").with_column("user_id", "").with_column("name", ""),
/// ])
/// .unwrap();
///
/// assert_eq!(run("SELECT u.name FROM users u", &schema), Verdict::Valid);
/// assert!(run("DROP TABLE users", &schema).is_unsafe());
/// ```
pub fn run(raw_sql: &str, schema: &Schema) -> Verdict {
    run_report(raw_sql, schema, &ValidateOptions::default()).verdict
}

pub fn run_with_options(raw_sql: &str, schema: &Schema, options: &ValidateOptions) -> Verdict {
    run_report(raw_sql, schema, options).verdict
}

/// Validate one candidate statement and report which stage decided it.
pub fn run_report(raw_sql: &str, schema: &Schema, options: &ValidateOptions) -> ValidationReport {
    #[cfg(feature = "tracing")]
    let _span = info_span!("validate", dialect = ?options.dialect, strict = options.strict_syntax)
        .entered();

    let report = run_stages(raw_sql, schema, options);

    #[cfg(feature = "tracing")]
    debug!(verdict = report.verdict.code(), stage = %report.stage, "validation finished");

    report
}

fn run_stages(raw_sql: &str, schema: &Schema, options: &ValidateOptions) -> ValidationReport {
    if let Safety::Unsafe(keyword) = check_safety(raw_sql) {
        return ValidationReport {
            verdict: Verdict::Unsafe {
                reason: UnsafeReason::DeniedKeyword { keyword },
            },
            stage: Stage::SafetyGate,
            statement_kind: None,
        };
    }

    let parsed = match parse_with_options(raw_sql, options) {
        Ok(parsed) => parsed,
        Err(error) => {
            return ValidationReport {
                verdict: Verdict::ParseError { error },
                stage: Stage::Parser,
                statement_kind: None,
            };
        }
    };

    let verdict = validate(&parsed, schema);
    // A malformed statement is rejected by the validator but is a parser failure.
    let stage = match verdict {
        Verdict::ParseError { .. } => Stage::Parser,
        _ => Stage::SchemaValidator,
    };

    ValidationReport {
        verdict,
        stage,
        statement_kind: Some(parsed.kind),
    }
}
