//! Result type for best-effort operations.

use crate::error::Error;

/// The result of a best-effort operation.
///
/// Fatal operations return [`crate::Result`]. Operations whose failures are
/// absorbed (profile cache writes, storage cleanup, remote logout) return an
/// `Outcome` instead, so a swallowed failure is still visible to the caller.
#[derive(Debug)]
#[must_use]
pub enum Outcome<T> {
    /// The operation fully succeeded.
    Ok(T),
    /// The operation completed, but part of it failed and was absorbed.
    Advisory { value: T, warning: Error },
}

impl<T> Outcome<T> {
    /// Build an outcome from a fallible step whose failure is absorbed.
    pub fn absorb(result: Result<T, Error>, fallback: T) -> Self {
        match result {
            Ok(value) => Outcome::Ok(value),
            Err(warning) => Outcome::Advisory {
                value: fallback,
                warning,
            },
        }
    }

    /// Returns true if part of the operation failed.
    pub fn is_advisory(&self) -> bool {
        matches!(self, Outcome::Advisory { .. })
    }

    /// Returns the absorbed failure, if any.
    pub fn warning(&self) -> Option<&Error> {
        match self {
            Outcome::Ok(_) => None,
            Outcome::Advisory { warning, .. } => Some(warning),
        }
    }

    /// Discard any warning and return the value.
    pub fn into_value(self) -> T {
        match self {
            Outcome::Ok(value) | Outcome::Advisory { value, .. } => value,
        }
    }

    /// Split into the value and the absorbed failure.
    pub fn into_parts(self) -> (T, Option<Error>) {
        match self {
            Outcome::Ok(value) => (value, None),
            Outcome::Advisory { value, warning } => (value, Some(warning)),
        }
    }
}

impl Outcome<()> {
    /// Merge a second best-effort step into this one, keeping the first warning.
    pub fn and(self, other: Outcome<()>) -> Outcome<()> {
        match (self, other) {
            (Outcome::Ok(()), other) => other,
            (advisory, _) => advisory,
        }
    }
}
