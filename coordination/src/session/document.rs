//! The replicated session record.
//!
//! One `SessionDocument` exists per session id. It is the only shared mutable
//! resource: both parties and whichever client drives adjudication write into
//! it through the sync channel, and every subscriber reconciles against the
//! full snapshot.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::SessionError;
use super::room_code::SessionId;
use crate::adjudication::FailureKind;

/// One of the two parties of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

/// Adjudication status of a session.
///
/// `Idle` is initial. `Resolved` and `Failed` are stable until a user
/// action moves them back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourtStatus {
    #[default]
    Idle,
    Adjudicating,
    Resolved,
    Failed,
}

impl fmt::Display for CourtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Adjudicating => write!(f, "ADJUDICATING"),
            Self::Resolved => write!(f, "RESOLVED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Classified adjudication failure as written into the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReason {
    pub kind: FailureKind,
    /// User-facing message for the failure kind.
    pub message: String,
}

/// The full session record, as delivered in every snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDocument {
    pub session_id: SessionId,
    #[serde(default)]
    pub statement_a: String,
    #[serde(default)]
    pub statement_b: String,
    #[serde(default)]
    pub sealed_a: bool,
    #[serde(default)]
    pub sealed_b: bool,
    #[serde(default)]
    pub status: CourtStatus,
    #[serde(default)]
    pub verdict_text: String,
    #[serde(default)]
    pub failure_reason: Option<FailureReason>,
}

impl SessionDocument {
    /// A fresh `IDLE` document with both sides empty and unsealed.
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            statement_a: String::new(),
            statement_b: String::new(),
            sealed_a: false,
            sealed_b: false,
            status: CourtStatus::Idle,
            verdict_text: String::new(),
            failure_reason: None,
        }
    }

    pub fn statement(&self, side: Side) -> &str {
        match side {
            Side::A => &self.statement_a,
            Side::B => &self.statement_b,
        }
    }

    pub fn is_sealed(&self, side: Side) -> bool {
        match side {
            Side::A => self.sealed_a,
            Side::B => self.sealed_b,
        }
    }

    /// Both statements are final for this cycle.
    ///
    /// This is the only precondition for opening court.
    pub fn is_ready(&self) -> bool {
        self.sealed_a && self.sealed_b
    }

    /// Check the field-level invariants that tie the outcome fields to status.
    pub fn check_invariants(&self) -> Result<(), SessionError> {
        let has_verdict = !self.verdict_text.is_empty();
        let has_failure = self.failure_reason.is_some();

        if has_verdict && self.status != CourtStatus::Resolved {
            return Err(SessionError::CorruptDocument(format!(
                "verdict present while status is {}",
                self.status
            )));
        }
        if has_failure && self.status != CourtStatus::Failed {
            return Err(SessionError::CorruptDocument(format!(
                "failure reason present while status is {}",
                self.status
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> SessionDocument {
        SessionDocument::new(SessionId::new("482913"))
    }

    #[test]
    fn test_new_document_is_idle_and_unsealed() {
        let d = doc();
        assert_eq!(d.status, CourtStatus::Idle);
        assert!(!d.sealed_a && !d.sealed_b);
        assert!(d.verdict_text.is_empty());
        assert!(d.failure_reason.is_none());
        assert!(d.check_invariants().is_ok());
    }

    #[test]
    fn test_is_ready_requires_both_seals() {
        let mut d = doc();
        assert!(!d.is_ready());
        d.sealed_a = true;
        assert!(!d.is_ready());
        d.sealed_b = true;
        assert!(d.is_ready());
        d.sealed_a = false;
        assert!(!d.is_ready());
    }

    #[test]
    fn test_verdict_outside_resolved_is_corrupt() {
        let mut d = doc();
        d.verdict_text = "stray".into();
        assert!(d.check_invariants().is_err());
        d.status = CourtStatus::Resolved;
        assert!(d.check_invariants().is_ok());
    }

    #[test]
    fn test_failure_outside_failed_is_corrupt() {
        let mut d = doc();
        d.failure_reason = Some(FailureReason {
            kind: FailureKind::Unknown,
            message: "x".into(),
        });
        assert!(d.check_invariants().is_err());
        d.status = CourtStatus::Failed;
        assert!(d.check_invariants().is_ok());
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(doc()).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "sessionId",
            "statementA",
            "statementB",
            "sealedA",
            "sealedB",
            "status",
            "verdictText",
            "failureReason",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(json["status"], "IDLE");
        assert_eq!(json["sessionId"], "482913");
    }

    #[test]
    fn test_side_other() {
        assert_eq!(Side::A.other(), Side::B);
        assert_eq!(Side::B.other(), Side::A);
        assert_eq!(Side::B.to_string(), "B");
    }
}
