//! Error handling utilities

use crate::error::{describe_error_code, ErrorKind, SessionError};
use tracing::error;

/// Handle fatal errors and exit with appropriate status code
///
/// A [`SessionError`] prints its client-facing message and code, plus the
/// code's description with `-v`. Anything else prints the error, plus the
/// full chain with `-v`.
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {}", error);

    let exit_code = if let Some(session_err) = error.downcast_ref::<SessionError>() {
        eprintln!(
            "Error [E{:04}]: {}",
            session_err.code(),
            session_err.user_message()
        );
        if verbose >= 1 {
            eprintln!("  ({})", describe_error_code(session_err.code()));
        }
        match session_err.kind() {
            ErrorKind::InvalidArgument => 2,
            _ => 1,
        }
    } else {
        eprintln!("Error: {error}");
        if verbose >= 1 {
            eprintln!("\nError chain:");
            for (i, cause) in error.chain().enumerate() {
                eprintln!("  {}: {}", i, cause);
            }
        }
        1
    };

    std::process::exit(exit_code)
}
