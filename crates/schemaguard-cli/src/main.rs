//! SchemaGuard CLI - schema-bound SQL safety validator

use schemaguard_cli::cli;
use schemaguard_cli::input;
use schemaguard_cli::output;
use schemaguard_cli::schema;

use anyhow::{Context, Result};
use clap::Parser;
use is_terminal::IsTerminal;
use schemaguard_core::run_report;
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{debug, Level};

use cli::{Args, OutputFormat};
use output::{format_json, format_report, format_schema, CandidateResult};

/// At least one candidate was rejected.
const EXIT_FAILURE: u8 = 1;
/// Configuration error (unreadable input, invalid schema).
const EXIT_CONFIG_ERROR: u8 = 66;

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(all_passed) => {
            if all_passed {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_FAILURE)
            }
        }
        Err(e) => {
            eprintln!("schemaguard: error: {e:#}");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Validate every candidate; returns whether all of them passed.
fn run(args: Args) -> Result<bool> {
    let dialect = args.dialect.into();
    let schema = schema::load_schema(&args.schema, dialect)?;
    debug!(tables = schema.len(), path = %args.schema.display(), "schema loaded");

    if !args.quiet {
        for table in schema::tables_without_columns(&schema) {
            eprintln!("schemaguard: warning: table '{table}' declares no columns");
        }
    }

    let colored = args.output.is_none() && io::stdout().is_terminal();

    if args.describe {
        write_output(&args.output, &format_schema(&schema, colored))?;
        return Ok(true);
    }

    let started_at = Instant::now();
    let candidates = input::read_input(&args.files)?;
    let options = args.validate_options();

    let results: Vec<CandidateResult> = candidates
        .iter()
        .map(|candidate| {
            let sql = if args.raw {
                candidate.sql.as_str()
            } else {
                match input::strip_code_fence(&candidate.sql) {
                    Some(inner) => {
                        if !args.quiet {
                            eprintln!(
                                "schemaguard: warning: {}: unwrapped Markdown code fence",
                                candidate.name
                            );
                        }
                        inner
                    }
                    None => candidate.sql.as_str(),
                }
            };

            CandidateResult {
                name: candidate.name.clone(),
                report: run_report(sql, &schema, &options),
            }
        })
        .collect();

    let all_passed = results.iter().all(CandidateResult::passed);

    let output_str = match args.format {
        OutputFormat::Json => format_json(&results, args.compact),
        OutputFormat::Table => format_report(&results, colored, started_at.elapsed()),
    };

    write_output(&args.output, &output_str)?;

    Ok(all_passed)
}

fn write_output(path: &Option<std::path::PathBuf>, content: &str) -> Result<()> {
    if let Some(path) = path {
        fs::write(path, content)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    } else {
        io::stdout()
            .write_all(content.as_bytes())
            .context("Failed to write to stdout")?;
        // Ensure newline at end for terminal output
        if !content.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}
