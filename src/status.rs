//! Status Results
//!
//! Success-or-failure values returned by data plane clients, plus the merge
//! operator used to fold the outcomes of independent calls into one verdict.
//!
//! # Merge Rules
//!
//! ```text
//! merge(Ok a,   Ok _)   = Ok a
//! merge(Ok _,   Err r)  = Err r
//! merge(Err r,  Ok _)   = Err r
//! merge(Err r1, Err r2) = Err(r1 ++ r2)      status = max(s1, s2)
//! ```
//!
//! `FatalError` dominates `ErrorRetry`, so the merged status is the same for
//! every fold order. Reason order follows the fold and is not part of the
//! contract.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure category reported by a data plane or transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    /// Transient: the caller may try again later
    ErrorRetry,
    /// Permanent: repeating the call will not help
    FatalError,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::ErrorRetry => "ERROR_RETRY",
            ResponseStatus::FatalError => "FATAL_ERROR",
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Failed outcome with every collected reason
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{status}: {}", .reasons.join("; "))]
pub struct StatusFailure {
    pub status: ResponseStatus,
    pub reasons: Vec<String>,
}

impl StatusFailure {
    pub fn new(status: ResponseStatus, reasons: Vec<String>) -> Self {
        Self { status, reasons }
    }

    /// Transient failure with a single reason
    pub fn retry(reason: impl Into<String>) -> Self {
        Self::new(ResponseStatus::ErrorRetry, vec![reason.into()])
    }

    /// Permanent failure with a single reason
    pub fn fatal(reason: impl Into<String>) -> Self {
        Self::new(ResponseStatus::FatalError, vec![reason.into()])
    }

    #[inline]
    pub fn is_retryable(&self) -> bool {
        self.status == ResponseStatus::ErrorRetry
    }

    /// Combine two failures: reasons are concatenated, the worse status wins
    pub fn combine(mut self, other: StatusFailure) -> Self {
        self.status = self.status.max(other.status);
        self.reasons.extend(other.reasons);
        self
    }
}

/// Result of a data plane operation
pub type StatusResult<T> = Result<T, StatusFailure>;

pub fn ok<T>(value: T) -> StatusResult<T> {
    Ok(value)
}

pub fn failure<T>(status: ResponseStatus, reasons: Vec<String>) -> StatusResult<T> {
    Err(StatusFailure::new(status, reasons))
}

/// Merge two results; the first success is kept when both succeed
pub fn merge<T>(a: StatusResult<T>, b: StatusResult<T>) -> StatusResult<T> {
    match (a, b) {
        (Ok(first), Ok(_)) => Ok(first),
        (Ok(_), Err(e)) | (Err(e), Ok(_)) => Err(e),
        (Err(e1), Err(e2)) => Err(e1.combine(e2)),
    }
}

/// Left fold of `merge` over all results; empty input is `Ok(())`
pub fn reduce<I>(results: I) -> StatusResult<()>
where
    I: IntoIterator<Item = StatusResult<()>>,
{
    results.into_iter().fold(Ok(()), merge)
}
