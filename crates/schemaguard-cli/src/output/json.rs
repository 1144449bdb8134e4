//! JSON output formatting.

use super::CandidateResult;

/// Format the candidate results as a JSON array.
///
/// If `compact` is true, outputs minified JSON without whitespace.
pub fn format_json(results: &[CandidateResult], compact: bool) -> String {
    if compact {
        serde_json::to_string(results).expect("serialization cannot fail")
    } else {
        serde_json::to_string_pretty(results).expect("serialization cannot fail")
    }
}
