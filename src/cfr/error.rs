//! Error types for the solver.
//!
//! Every error here is a bad game definition or a programming error rather
//! than an expected runtime condition. The solver aborts the run and reports the
//! InfoSet and sweep phase that failed instead of working around it.

use std::fmt;

use thiserror::Error;

use crate::cfr::config::ConfigError;

/// The sweep phase in which an error was raised.
///
/// Only these phases divide by a total that can vanish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Belief update.
    Belief,
    /// Strategy renormalization.
    Strategy,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Belief => "belief",
            Phase::Strategy => "strategy",
        };
        f.write_str(name)
    }
}

/// Errors that abort a solving run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// A history (or an InfoSet built on it) that the game cannot produce.
    #[error("invalid history `{history}`: {reason}")]
    InvalidHistory {
        /// Textual form of the offending history or key.
        history: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The joint private-type prior does not sum to one.
    #[error("private-type prior sums to {total}, expected 1")]
    InvalidPrior {
        /// Actual total probability of all deals.
        total: f64,
    },

    /// No candidate opponent type can produce the InfoSet's history.
    #[error("info set `{key}` has zero total likelihood during {phase} phase")]
    DegenerateBelief {
        /// InfoSet key text.
        key: String,
        /// Phase that detected the condition.
        phase: Phase,
    },

    /// Cumulative gain of an InfoSet is zero, so renormalization is undefined.
    #[error("info set `{key}` has zero cumulative gain during {phase} phase")]
    DegenerateStrategyUpdate {
        /// InfoSet key text.
        key: String,
        /// Phase that detected the condition.
        phase: Phase,
    },

    /// Invalid solver configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SolverError {
    /// Shorthand for [`SolverError::InvalidHistory`].
    pub fn invalid_history(history: impl Into<String>, reason: impl Into<String>) -> Self {
        SolverError::InvalidHistory {
            history: history.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = SolverError::DegenerateBelief {
            key: "2:pb".to_string(),
            phase: Phase::Belief,
        };
        let msg = err.to_string();
        assert!(msg.contains("2:pb"));
        assert!(msg.contains("belief"));

        let err = SolverError::DegenerateStrategyUpdate {
            key: "0:".to_string(),
            phase: Phase::Strategy,
        };
        assert_eq!(
            err.to_string(),
            "info set `0:` has zero cumulative gain during strategy phase"
        );

        let err = SolverError::invalid_history("pbpb", "history longer than 3");
        assert_eq!(err.to_string(), "invalid history `pbpb`: history longer than 3");
    }
}
