//! Local contract violations.
//!
//! These are rejected at the call site. They never reach the shared document
//! and never drive the session into `FAILED`.

use thiserror::Error;

use super::document::{CourtStatus, Side};

/// Result type alias for session-level operations
pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The side's statement is sealed and cannot be edited.
    #[error("statement {side} is sealed")]
    SealedField { side: Side },

    /// The operation is not permitted while the session is in `status`.
    #[error("cannot {action} while session is {status}")]
    InvalidPhase {
        status: CourtStatus,
        action: &'static str,
    },

    /// Court was opened before both statements were sealed.
    #[error("both statements must be sealed before court opens")]
    NotReady,

    /// The requested status edge is not part of the state graph.
    #[error("illegal state transition: {from} → {to}")]
    IllegalTransition { from: CourtStatus, to: CourtStatus },

    /// A user-entered room code is not six digits.
    #[error("room code must be 6 digits, got {0:?}")]
    InvalidRoomCode(String),

    /// A snapshot violates the outcome-field invariants.
    #[error("corrupt session document: {0}")]
    CorruptDocument(String),
}

impl SessionError {
    /// Build an `InvalidPhase` for `action` attempted in `status`.
    pub fn phase(status: CourtStatus, action: &'static str) -> Self {
        Self::InvalidPhase { status, action }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            SessionError::SealedField { side: Side::A }.to_string(),
            "statement A is sealed"
        );
        assert_eq!(
            SessionError::phase(CourtStatus::Resolved, "unseal").to_string(),
            "cannot unseal while session is RESOLVED"
        );
        assert_eq!(
            SessionError::IllegalTransition {
                from: CourtStatus::Idle,
                to: CourtStatus::Resolved
            }
            .to_string(),
            "illegal state transition: IDLE → RESOLVED"
        );
    }
}
