//! Per-side sealing protocol.
//!
//! A sealed statement is final for the current cycle. The functions here
//! validate an action against the caller's latest snapshot and return the
//! patch to stage; they never touch the store themselves.

use super::document::{CourtStatus, SessionDocument, Side};
use super::error::{SessionError, SessionResult};
use super::patch::DocumentPatch;

/// Stage a new statement text for `side`.
///
/// Rejected with `SealedField` when that side is sealed; the stored
/// statement stays unchanged.
pub fn stage_statement(
    doc: &SessionDocument,
    side: Side,
    text: impl Into<String>,
) -> SessionResult<DocumentPatch> {
    if doc.is_sealed(side) {
        return Err(SessionError::SealedField { side });
    }
    Ok(DocumentPatch::new().statement(side, text))
}

/// Flip the seal of `side`.
///
/// Sealing is always legal. Unsealing is only legal in `IDLE`, so a
/// statement cannot change once adjudication has read it.
pub fn stage_toggle_seal(doc: &SessionDocument, side: Side) -> SessionResult<DocumentPatch> {
    let sealed = doc.is_sealed(side);
    if sealed && doc.status != CourtStatus::Idle {
        return Err(SessionError::phase(doc.status, "unseal a statement"));
    }
    Ok(DocumentPatch::new().sealed(side, !sealed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionId;

    fn idle() -> SessionDocument {
        SessionDocument::new(SessionId::new("482913"))
    }

    #[test]
    fn test_stage_statement_on_unsealed_side() {
        let patch = stage_statement(&idle(), Side::A, "hello").unwrap();
        assert_eq!(patch.statement_a.as_deref(), Some("hello"));
        assert!(patch.statement_b.is_none());
    }

    #[test]
    fn test_stage_statement_on_sealed_side_is_rejected() {
        let mut doc = idle();
        doc.sealed_b = true;
        doc.statement_b = "final".into();

        for text in ["x", "", "final"] {
            let err = stage_statement(&doc, Side::B, text).unwrap_err();
            assert_eq!(err, SessionError::SealedField { side: Side::B });
        }
        assert_eq!(doc.statement_b, "final");
        // The other side stays editable.
        assert!(stage_statement(&doc, Side::A, "x").is_ok());
    }

    #[test]
    fn test_toggle_twice_from_idle_restores_seal() {
        let mut doc = idle();
        doc.statement_a = "he never does dishes".into();
        let before = doc.clone();

        stage_toggle_seal(&doc, Side::A).unwrap().apply_to(&mut doc);
        assert!(doc.sealed_a);
        stage_toggle_seal(&doc, Side::A).unwrap().apply_to(&mut doc);

        assert_eq!(doc, before);
    }

    #[test]
    fn test_unseal_outside_idle_is_invalid_phase() {
        for status in [
            CourtStatus::Adjudicating,
            CourtStatus::Resolved,
            CourtStatus::Failed,
        ] {
            let mut doc = idle();
            doc.sealed_a = true;
            doc.status = status;
            let err = stage_toggle_seal(&doc, Side::A).unwrap_err();
            assert!(matches!(err, SessionError::InvalidPhase { .. }));
        }
    }

    #[test]
    fn test_seal_is_legal_in_any_phase() {
        let mut doc = idle();
        doc.status = CourtStatus::Failed;
        let patch = stage_toggle_seal(&doc, Side::B).unwrap();
        assert_eq!(patch.sealed_b, Some(true));
    }
}
