//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Exit status for a failed verification run
pub const EXIT_VERIFICATION_FAILED: i32 = 2;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::VerificationFailed(report) => report.clone(),
        other => other.to_string(),
    }
}

/// Process exit status for `e`
pub fn exit_code(e: &ApiError) -> i32 {
    match e {
        ApiError::VerificationFailed(_) => EXIT_VERIFICATION_FAILED,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_failure_prints_report_verbatim() {
        let e = ApiError::VerificationFailed("SubBeanA ... FAIL".to_string());
        assert_eq!(map_error(&e), "SubBeanA ... FAIL");
        assert_eq!(exit_code(&e), EXIT_VERIFICATION_FAILED);
    }

    #[test]
    fn test_other_errors_use_display() {
        let e = ApiError::ConfigError("bad key".to_string());
        assert_eq!(map_error(&e), "Configuration error: bad key");
        assert_eq!(exit_code(&e), 1);
    }
}
