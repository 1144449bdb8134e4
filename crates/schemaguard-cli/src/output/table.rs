//! Human-readable report formatting.

use super::CandidateResult;
use owo_colors::OwoColorize;
use schemaguard_core::Schema;
use std::fmt::Write;
use std::time::Duration;

/// Format candidate results as a PASS/FAIL report with optional colors.
pub fn format_report(results: &[CandidateResult], colored: bool, elapsed: Duration) -> String {
    let mut out = String::new();

    let mut total_pass = 0usize;
    let mut total_fail = 0usize;

    for result in results {
        if result.passed() {
            total_pass += 1;
        } else {
            total_fail += 1;
        }

        write_candidate_section(&mut out, result, colored);
    }

    writeln!(out, "All Finished in {}!", format_elapsed(elapsed)).unwrap();
    writeln!(
        out,
        "  {} passed. {} failed.",
        count_str(total_pass, colored, Outcome::Pass),
        count_str(total_fail, colored, Outcome::Fail)
    )
    .unwrap();

    out
}

fn write_candidate_section(out: &mut String, result: &CandidateResult, colored: bool) {
    let outcome = if result.passed() {
        Outcome::Pass
    } else {
        Outcome::Fail
    };

    writeln!(out, "== [{}] {}", result.name, outcome.paint(outcome.label(), colored)).unwrap();

    if outcome == Outcome::Pass {
        return;
    }

    let verdict = &result.report.verdict;
    let code = if colored {
        verdict.code().yellow().to_string()
    } else {
        verdict.code().to_string()
    };

    writeln!(out, "{} | {} | {}", code, result.report.stage, verdict).unwrap();
}

/// Format the loaded schema as an indented table/column listing.
pub fn format_schema(schema: &Schema, colored: bool) -> String {
    let mut out = String::new();

    for table in schema.tables() {
        let title = format!("{} ({} columns)", table.name, table.columns.len());
        if colored {
            writeln!(out, "{}", title.bold()).unwrap();
        } else {
            writeln!(out, "{title}").unwrap();
        }

        if !table.description.is_empty() {
            writeln!(out, "  {}", table.description).unwrap();
        }

        let width = table.columns.keys().map(|c| c.len()).max().unwrap_or(0);
        for (column, description) in &table.columns {
            let line = format!("    {column:<width$}  {description}");
            writeln!(out, "{}", line.trim_end()).unwrap();
        }
    }

    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Pass,
    Fail,
}

impl Outcome {
    fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }

    fn paint(self, text: &str, colored: bool) -> String {
        match (colored, self) {
            (false, _) => text.to_string(),
            (true, Self::Pass) => text.green().to_string(),
            (true, Self::Fail) => text.red().to_string(),
        }
    }
}

fn count_str(count: usize, colored: bool, outcome: Outcome) -> String {
    let s = format!("{count} candidate{}", if count == 1 { "" } else { "s" });
    if count > 0 {
        outcome.paint(&s, colored)
    } else {
        s
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs >= 1.0 {
        format!("{secs:.2}s")
    } else if elapsed.as_millis() >= 1 {
        format!("{}ms", elapsed.as_millis())
    } else {
        format!("{}us", elapsed.as_micros())
    }
}
