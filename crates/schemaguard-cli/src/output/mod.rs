//! Output formatting modules.

pub mod json;
pub mod table;

pub use json::format_json;
pub use table::{format_report, format_schema};

use schemaguard_core::ValidationReport;
use serde::Serialize;

/// Validation outcome for one named candidate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResult {
    pub name: String,
    #[serde(flatten)]
    pub report: ValidationReport,
}

impl CandidateResult {
    pub fn passed(&self) -> bool {
        self.report.verdict.is_valid()
    }
}
