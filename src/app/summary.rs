//! One-line run summaries for humans and check scripts.

use crate::config::{SUMMARY_NO_CONTEXT, SUMMARY_NO_RESULTS};
use crate::models::{MonitoringResults, SequenceResult};

/// Summarizes the latest result of a probe invocation.
///
/// `None` means no invocation happened at all, which is distinct from one that
/// produced no results.
pub fn render_summary(results: Option<&MonitoringResults>) -> String {
    let Some(results) = results else {
        return SUMMARY_NO_CONTEXT.to_string();
    };
    match results.latest() {
        Some(latest) => summarize(latest),
        None => SUMMARY_NO_RESULTS.to_string(),
    }
}

/// The first error of the run, or its total duration when every step passed.
pub fn summarize(result: &SequenceResult) -> String {
    match result.first_error() {
        Some(message) => message.to_string(),
        None => format!("OK: Full sequence took {}ms", result.duration_millis()),
    }
}
