//! Exit code constants for consistent CLI behavior.
//!
//! Usage errors are reported by clap itself with status 2.

use crate::error::ReclaimError;

/// General error
pub const ERROR: i32 = 1;

/// The daemon could not be reached
pub const DAEMON_UNREACHABLE: i32 = 3;

/// Pick the exit status for a failed command.
pub fn code_for(err: &ReclaimError) -> i32 {
    match err {
        ReclaimError::Unreachable { .. } => DAEMON_UNREACHABLE,
        _ => ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_nonzero() {
        assert_ne!(ERROR, 0);
    }

    #[test]
    fn test_unreachable_is_distinct_from_clap_usage() {
        assert_ne!(DAEMON_UNREACHABLE, 2);
        assert_ne!(DAEMON_UNREACHABLE, ERROR);
    }

    #[test]
    fn test_daemon_errors_use_general_code() {
        let err = ReclaimError::Daemon("boom".to_string());
        assert_eq!(code_for(&err), ERROR);
    }
}
