//! Verification report formatters.

use crate::error::ApiError;
use crate::verify::{Call, VerificationReport};

fn join_calls(calls: &[Call]) -> String {
    if calls.is_empty() {
        return "(none)".to_string();
    }
    calls
        .iter()
        .map(|call| call.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One line per scenario; mismatches also list both sequences
pub fn format_verification_text(report: &VerificationReport) -> String {
    let mut lines = Vec::new();
    for scenario in &report.scenarios {
        let verdict = if scenario.passed { "ok" } else { "FAIL" };
        lines.push(format!(
            "{:<10} {:<36} {}",
            scenario.bean,
            scenario.style.as_str(),
            verdict
        ));
        if !scenario.passed {
            lines.push(format!("    expected: {}", join_calls(&scenario.expected)));
            lines.push(format!("    recorded: {}", join_calls(&scenario.recorded)));
            if let Some(error) = &scenario.error {
                lines.push(format!("    error:    {}", error));
            }
        }
    }
    let failed = report.failures().count();
    lines.push(String::new());
    lines.push(format!(
        "{} scenario(s), {} passed, {} failed",
        report.scenarios.len(),
        report.scenarios.len() - failed,
        failed
    ));
    lines.join("\n")
}

pub fn format_verification_json(report: &VerificationReport) -> Result<String, ApiError> {
    let value = serde_json::json!({
        "passed": report.passed(),
        "scenarios": report.scenarios,
    });
    serde_json::to_string_pretty(&value)
        .map_err(|e| ApiError::ConfigError(format!("Failed to serialize report: {}", e)))
}
