//! Error classification shared by every crate in the workspace
//!
//! Concrete error types live next to the code that raises them. This module
//! only defines the vocabulary used to reason about them uniformly: whether
//! an error is worth retrying and how loudly it should be reported.

use std::fmt;
use std::time::Duration;

/// Classification of errors for retry and alerting decisions
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use faas_common::error::{ErrorClassification, ErrorSeverity};
///
/// #[derive(Debug)]
/// enum FetchError {
///     Reset,
///     Rejected,
/// }
///
/// impl ErrorClassification for FetchError {
///     fn is_retryable(&self) -> bool {
///         matches!(self, Self::Reset)
///     }
///
///     fn severity(&self) -> ErrorSeverity {
///         match self {
///             Self::Reset => ErrorSeverity::Warning,
///             Self::Rejected => ErrorSeverity::Error,
///         }
///     }
/// }
///
/// assert!(FetchError::Reset.is_retryable());
/// assert!(!FetchError::Rejected.is_critical());
/// assert_eq!(FetchError::Rejected.retry_after(), None::<Duration>);
/// ```
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient issues that may succeed if attempted
    /// again, such as a reset connection or an unavailable gateway.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    /// Get the suggested retry delay if applicable
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates `ErrorSeverity` ordering for the escalation scenario.
    ///
    /// Assertions:
    /// - Confirms severities order from Info to Critical.
    /// - Confirms display strings are the short upper-case labels.
    #[test]
    fn test_severity_ordering_and_display() {
        assert!(ErrorSeverity::Info < ErrorSeverity::Warning);
        assert!(ErrorSeverity::Error < ErrorSeverity::Critical);
        assert_eq!(ErrorSeverity::Warning.to_string(), "WARN");
        assert_eq!(ErrorSeverity::Critical.to_string(), "CRITICAL");
    }
}
