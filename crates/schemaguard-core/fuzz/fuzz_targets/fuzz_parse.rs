//! Fuzz target for the statement parser.
//!
//! Arbitrary input must come back as a `ParsedStatement` or a `ParseError`,
//! never a panic, and the safety gate must agree with itself across runs.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use schemaguard_core::{check_safety, parse_with_options, Dialect, ValidateOptions};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    sql: String,
    dialect_idx: u8,
    strict: bool,
}

impl FuzzInput {
    fn options(&self) -> ValidateOptions {
        let dialect = match self.dialect_idx % 5 {
            0 => Dialect::Generic,
            1 => Dialect::Postgres,
            2 => Dialect::Mysql,
            3 => Dialect::Bigquery,
            _ => Dialect::Sqlite,
        };
        let options = ValidateOptions::default().with_dialect(dialect);
        if self.strict {
            options.strict()
        } else {
            options
        }
    }
}

fuzz_target!(|input: FuzzInput| {
    let _result = parse_with_options(&input.sql, &input.options());
    assert_eq!(check_safety(&input.sql), check_safety(&input.sql));
});
