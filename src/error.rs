//! Error Types
//!
//! Typed failures returned by the selector, the flow controllers and the
//! configuration loader. None of them is fatal to the process: the owning
//! transfer state machine decides whether to retry, fail or ignore.

use thiserror::Error;

use crate::status::{ResponseStatus, StatusFailure};

/// Flow control error taxonomy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("No data plane can move data from `{source_type}` to `{dest_type}`")]
    NoCapableWorker {
        source_type: String,
        dest_type: String,
    },

    #[error("No flow controller can handle transfer process {0}")]
    NoMatchingController(String),

    #[error("Dispatch to data plane failed: {0}")]
    DispatchFailure(StatusFailure),

    /// Data plane reasons are kept verbatim; the failing instances are listed apart
    #[error(
        "Termination failed on data planes [{}]: {failure}",
        .failed_instances.join(", ")
    )]
    TerminationPartialFailure {
        failure: StatusFailure,
        failed_instances: Vec<String>,
    },

    #[error("Missing configuration: {0}")]
    ConfigurationMissing(String),
}

impl FlowError {
    /// Stable error code for logs and API responses
    pub fn code(&self) -> &'static str {
        match self {
            FlowError::NoCapableWorker { .. } => "NO_CAPABLE_WORKER",
            FlowError::NoMatchingController(_) => "NO_MATCHING_CONTROLLER",
            FlowError::DispatchFailure(_) => "DISPATCH_FAILURE",
            FlowError::TerminationPartialFailure { .. } => "TERMINATION_PARTIAL_FAILURE",
            FlowError::ConfigurationMissing(_) => "CONFIGURATION_MISSING",
        }
    }

    /// Whether repeating the call later may succeed
    ///
    /// A missing worker counts as retryable since instances can join at any time.
    pub fn is_retryable(&self) -> bool {
        match self {
            FlowError::NoCapableWorker { .. } => true,
            FlowError::DispatchFailure(f)
            | FlowError::TerminationPartialFailure { failure: f, .. } => f.is_retryable(),
            FlowError::NoMatchingController(_) | FlowError::ConfigurationMissing(_) => false,
        }
    }

    /// Underlying failure reasons, one entry per failing call where applicable
    pub fn reasons(&self) -> Vec<String> {
        match self {
            FlowError::DispatchFailure(f)
            | FlowError::TerminationPartialFailure { failure: f, .. } => f.reasons.clone(),
            other => vec![other.to_string()],
        }
    }

    /// Data planes that reported a failure, in registry order
    pub fn failed_instances(&self) -> &[String] {
        match self {
            FlowError::TerminationPartialFailure {
                failed_instances, ..
            } => failed_instances,
            _ => &[],
        }
    }

    /// Status category the error maps to
    pub fn status(&self) -> ResponseStatus {
        if self.is_retryable() {
            ResponseStatus::ErrorRetry
        } else {
            ResponseStatus::FatalError
        }
    }
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            FlowError::NoMatchingController("tp-1".into()).code(),
            "NO_MATCHING_CONTROLLER"
        );
        assert_eq!(
            FlowError::ConfigurationMissing("callback".into()).code(),
            "CONFIGURATION_MISSING"
        );
    }

    #[test]
    fn test_retryable_follows_status() {
        let retry = FlowError::DispatchFailure(StatusFailure::retry("busy"));
        let fatal = FlowError::DispatchFailure(StatusFailure::fatal("bad request"));
        assert!(retry.is_retryable());
        assert!(!fatal.is_retryable());
        assert_eq!(fatal.status(), ResponseStatus::FatalError);
    }

    #[test]
    fn test_reasons_preserved() {
        let failure = StatusFailure::retry("disk full").combine(StatusFailure::fatal("bad id"));
        let err = FlowError::TerminationPartialFailure {
            failure,
            failed_instances: vec!["dp-1".to_string(), "dp-2".to_string()],
        };
        assert_eq!(err.reasons(), vec!["disk full".to_string(), "bad id".to_string()]);
        assert_eq!(err.failed_instances(), ["dp-1", "dp-2"]);
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "Termination failed on data planes [dp-1, dp-2]: FATAL_ERROR: disk full; bad id"
        );
    }

    #[test]
    fn test_failed_instances_empty_for_other_errors() {
        let err = FlowError::DispatchFailure(StatusFailure::retry("busy"));
        assert!(err.failed_instances().is_empty());
    }

    #[test]
    fn test_display() {
        let err = FlowError::NoCapableWorker {
            source_type: "HttpData".into(),
            dest_type: "S3".into(),
        };
        assert_eq!(
            err.to_string(),
            "No data plane can move data from `HttpData` to `S3`"
        );
    }
}
