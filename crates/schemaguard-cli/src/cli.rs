//! CLI argument parsing using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// SchemaGuard - schema-bound SQL safety validator
#[derive(Parser, Debug)]
#[command(name = "schemaguard")]
#[command(about = "Check generated SQL against a schema before it runs", long_about = None)]
#[command(version)]
pub struct Args {
    /// SQL files to validate, one statement per file (reads from stdin if none provided)
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Schema file: a JSON schema document, or CREATE TABLE DDL when the extension is .sql
    #[arg(short, long, value_name = "FILE")]
    pub schema: PathBuf,

    /// SQL dialect
    #[arg(short, long, default_value = "generic", value_enum)]
    pub dialect: DialectArg,

    /// Output format
    #[arg(short, long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also require each statement to parse with the full SQL grammar
    #[arg(long)]
    pub strict: bool,

    /// Validate input exactly as given, without unwrapping Markdown code fences
    #[arg(long)]
    pub raw: bool,

    /// Suppress warnings on stderr
    #[arg(short, long)]
    pub quiet: bool,

    /// Compact JSON output (no pretty-printing)
    #[arg(short, long)]
    pub compact: bool,

    /// Print the loaded schema and exit
    #[arg(long)]
    pub describe: bool,

    /// Log pipeline decisions to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// SQL dialect options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    Generic,
    Ansi,
    Bigquery,
    Clickhouse,
    Databricks,
    Duckdb,
    Hive,
    Mssql,
    Mysql,
    Postgres,
    Redshift,
    Snowflake,
    Sqlite,
}

impl From<DialectArg> for schemaguard_core::Dialect {
    fn from(d: DialectArg) -> Self {
        match d {
            DialectArg::Generic => schemaguard_core::Dialect::Generic,
            DialectArg::Ansi => schemaguard_core::Dialect::Ansi,
            DialectArg::Bigquery => schemaguard_core::Dialect::Bigquery,
            DialectArg::Clickhouse => schemaguard_core::Dialect::Clickhouse,
            DialectArg::Databricks => schemaguard_core::Dialect::Databricks,
            DialectArg::Duckdb => schemaguard_core::Dialect::Duckdb,
            DialectArg::Hive => schemaguard_core::Dialect::Hive,
            DialectArg::Mssql => schemaguard_core::Dialect::Mssql,
            DialectArg::Mysql => schemaguard_core::Dialect::Mysql,
            DialectArg::Postgres => schemaguard_core::Dialect::Postgres,
            DialectArg::Redshift => schemaguard_core::Dialect::Redshift,
            DialectArg::Snowflake => schemaguard_core::Dialect::Snowflake,
            DialectArg::Sqlite => schemaguard_core::Dialect::Sqlite,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable PASS/FAIL report
    Table,
    /// JSON array of validation reports
    Json,
}

impl Args {
    pub fn validate_options(&self) -> schemaguard_core::ValidateOptions {
        let options = schemaguard_core::ValidateOptions::default().with_dialect(self.dialect.into());
        if self.strict {
            options.strict()
        } else {
            options
        }
    }
}
