//! Error handling utilities
//!
//! This module provides centralized error handling for the application.

use tracing::error;

use crate::error::{describe_error_code, SplitError};

/// Exit code for an error returned from a run
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<SplitError>()
        .map(SplitError::exit_code)
        .unwrap_or(1)
}

/// Handle fatal errors and exit with appropriate status code
///
/// - `verbose = 0`: User-friendly message only
/// - `verbose >= 1`: Includes the full error chain
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {}", error);
    eprintln!("{}", fatal_error_report(&error, verbose));
    std::process::exit(exit_code_for(&error))
}

/// Text printed on stderr for a fatal error
pub fn fatal_error_report(error: &anyhow::Error, verbose: u8) -> String {
    let mut report = String::new();

    if let Some(split_err) = error.downcast_ref::<SplitError>() {
        report.push_str(&format!("Error: {}", split_err.user_message()));
        if verbose >= 1 {
            report.push_str(&format!(
                "\n\nE{:04}: {}\nContext Chain:\n{}",
                split_err.code(),
                describe_error_code(split_err.code()),
                split_err.developer_message()
            ));
        }
    } else {
        report.push_str(&format!("Error: {error}"));
        if verbose >= 1 {
            report.push_str("\n\nError chain:");
            for (i, cause) in error.chain().enumerate() {
                report.push_str(&format!("\n  {}: {}", i, cause));
            }
        }
    }

    report
}
