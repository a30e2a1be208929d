//! Error types for the varpage library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when a model value or solver parameter is
//!   invalid (e.g. a non-positive page weight, a zero branching factor).
//! - [`InvariantError`]: Returned when a produced schedule violates a
//!   structural invariant (see [`check_capacity`](crate::model::check_capacity)).
//! - [`SolveError`]: Returned by min-cost-flow solvers and
//!   [`OfflineSolver::try_solve`](crate::offline::OfflineSolver::try_solve).
//!
//! ## Example Usage
//!
//! ```
//! use varpage::error::ConfigError;
//! use varpage::model::Page;
//!
//! let page: Result<Page, ConfigError> = Page::try_new("A", 1.5);
//! assert!(page.is_ok());
//!
//! // Non-positive weights are rejected without panicking
//! let bad = Page::try_new("B", 0.0);
//! assert!(bad.is_err());
//! ```

use thiserror::Error;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when a model value or solver parameter is invalid.
///
/// Carries a human-readable description of which parameter failed validation.
///
/// # Example
///
/// ```
/// use varpage::generator::nested_sequence;
///
/// let err = nested_sequence(3, 2.0, 0).unwrap_err();
/// assert!(err.to_string().contains("branching"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when a schedule violates an invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// SolveError
// ---------------------------------------------------------------------------

/// Failure of the offline path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    /// The network admits no flow of the required value.
    #[error("flow network is infeasible: routed {routed} of {required} units")]
    InfeasibleNetwork { required: i64, routed: i64 },

    /// The residual graph contains a negative-cost cycle.
    #[error("negative-cost cycle reachable from the source")]
    NegativeCycle,

    /// Solver configuration was rejected.
    #[error("invalid solver configuration: {0}")]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("weight must be > 0");
        assert_eq!(err.to_string(), "weight must be > 0");
    }

    #[test]
    fn config_message_accessor() {
        let err = ConfigError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn config_clone_and_eq() {
        let a = ConfigError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("step 3 holds 2 pages, capacity 1");
        assert_eq!(err.to_string(), "step 3 holds 2 pages, capacity 1");
    }

    #[test]
    fn invariant_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<InvariantError>();
    }

    // -- SolveError -------------------------------------------------------

    #[test]
    fn infeasible_display_reports_units() {
        let err = SolveError::InfeasibleNetwork {
            required: 3,
            routed: 1,
        };
        assert_eq!(
            err.to_string(),
            "flow network is infeasible: routed 1 of 3 units"
        );
    }

    #[test]
    fn config_error_converts_into_solve_error() {
        let err: SolveError = ConfigError::new("min_reward must be positive").into();
        assert!(matches!(err, SolveError::Config(_)));
        assert!(err.to_string().contains("min_reward"));
    }
}
