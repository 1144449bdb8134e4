#![no_main]

use libfuzzer_sys::fuzz_target;
use schemaguard_core::{run_with_options, Dialect, Schema, Table, ValidateOptions};
use std::sync::OnceLock;

fn schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::from_tables(vec![
            Table::new("users")
                .with_column("user_id", "")
                .with_column("name", ""),
            Table::new("incidents")
                .with_column("incident_id", "")
                .with_column("user_id", "")
                .with_column("status", ""),
        ])
        .expect("fuzz schema is valid")
    })
}

fuzz_target!(|data: &[u8]| {
    if let Ok(sql) = std::str::from_utf8(data) {
        let strict = data.first().is_some_and(|b| b & 1 == 1);
        let mut options = ValidateOptions::default().with_dialect(Dialect::Generic);
        options.strict_syntax = strict;

        let _ = run_with_options(sql, schema(), &options);
    }
});
