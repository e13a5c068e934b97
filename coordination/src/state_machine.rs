//! Court State Machine — explicit states and legal transition guards.
//!
//! The document's `status` field is the state. Any subscribed client may
//! request a transition, but the stored document decides: every transition
//! is written conditionally on the status it expects to leave, and a request
//! against a document that has already moved on is dropped.
//!
//! ```text
//! Idle → Adjudicating            (both statements sealed)
//! Adjudicating → Resolved        (verdict delivered)
//! Adjudicating → Failed          (classified failure after retries)
//! Failed → Idle                  (retry; statements and seals kept)
//! Resolved → Idle                (new case; everything cleared)
//! ```

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::session::{
    CourtStatus, DocumentPatch, FailureReason, SessionDocument, SessionError, SessionResult, Side,
};
use crate::sync::WriteCondition;

fn is_legal_transition(from: CourtStatus, to: CourtStatus) -> bool {
    use CourtStatus::*;

    matches!(
        (from, to),
        (Idle, Adjudicating)
            | (Adjudicating, Resolved)
            | (Adjudicating, Failed)
            | (Failed, Idle)
            | (Resolved, Idle)
    )
}

/// A transition request issued by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourtAction {
    /// Both parties are sealed; start adjudication.
    OpenCourt,
    /// The adjudicator returned verdict text.
    DeliverVerdict(String),
    /// The adjudicator failed for good.
    RecordFailure(FailureReason),
    /// Back to `Idle` after a failure, keeping the sealed inputs.
    Retry,
    /// Back to `Idle` after a verdict, clearing everything.
    NewCase,
}

impl CourtAction {
    /// The status this action leaves.
    pub fn from_status(&self) -> CourtStatus {
        match self {
            Self::OpenCourt => CourtStatus::Idle,
            Self::DeliverVerdict(_) | Self::RecordFailure(_) => CourtStatus::Adjudicating,
            Self::Retry => CourtStatus::Failed,
            Self::NewCase => CourtStatus::Resolved,
        }
    }

    /// The status this action enters.
    pub fn to_status(&self) -> CourtStatus {
        match self {
            Self::OpenCourt => CourtStatus::Adjudicating,
            Self::DeliverVerdict(_) => CourtStatus::Resolved,
            Self::RecordFailure(_) => CourtStatus::Failed,
            Self::Retry | Self::NewCase => CourtStatus::Idle,
        }
    }

    /// What the stored document must still satisfy for this action to commit.
    ///
    /// Opening court re-checks both seals at the store, since either party
    /// may unseal between the local check and the write.
    pub fn write_condition(&self) -> WriteCondition {
        let condition = WriteCondition::status(self.from_status());
        match self {
            Self::OpenCourt => condition.ready(),
            _ => condition,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenCourt => "open court",
            Self::DeliverVerdict(_) => "deliver verdict",
            Self::RecordFailure(_) => "record failure",
            Self::Retry => "retry",
            Self::NewCase => "start a new case",
        }
    }
}

/// Validate `action` against `doc` and build the patch that performs it.
///
/// The patch always carries every field the transition owns, so subscribers
/// see the whole transition in one snapshot.
pub fn plan_transition(doc: &SessionDocument, action: &CourtAction) -> SessionResult<DocumentPatch> {
    let from = doc.status;
    let to = action.to_status();

    if from != action.from_status() {
        if is_legal_transition(from, to) {
            return Err(SessionError::phase(from, action.name()));
        }
        return Err(SessionError::IllegalTransition { from, to });
    }

    let patch = DocumentPatch::new().status(to);
    let patch = match action {
        CourtAction::OpenCourt => {
            if !doc.is_ready() {
                return Err(SessionError::NotReady);
            }
            patch.verdict("").clear_failure()
        }
        CourtAction::DeliverVerdict(text) => patch.verdict(text.clone()).clear_failure(),
        CourtAction::RecordFailure(reason) => patch.verdict("").failure(reason.clone()),
        CourtAction::Retry => patch.clear_failure(),
        CourtAction::NewCase => patch
            .statement(Side::A, "")
            .statement(Side::B, "")
            .sealed(Side::A, false)
            .sealed(Side::B, false)
            .verdict("")
            .clear_failure(),
    };
    Ok(patch)
}

/// A single recorded state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: CourtStatus,
    pub to: CourtStatus,
    /// Milliseconds since the log was created.
    pub elapsed_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Transitions this client committed, for diagnostics.
#[derive(Debug)]
pub struct TransitionLog {
    created_at: Instant,
    records: Vec<TransitionRecord>,
}

impl TransitionLog {
    pub fn new() -> Self {
        Self {
            created_at: Instant::now(),
            records: Vec::new(),
        }
    }

    pub fn record(&mut self, from: CourtStatus, to: CourtStatus, reason: Option<&str>) {
        tracing::debug!(from = %from, to = %to, "State transition");
        self.records.push(TransitionRecord {
            from,
            to,
            elapsed_ms: self.created_at.elapsed().as_millis() as u64,
            reason: reason.map(String::from),
        });
    }

    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    pub fn summary(&self) -> String {
        if self.records.is_empty() {
            return "no transitions".to_string();
        }
        let mut states = vec![self.records[0].from.to_string()];
        states.extend(self.records.iter().map(|r| r.to.to_string()));
        format!("{} ({} transitions)", states.join(" → "), self.records.len())
    }
}

impl Default for TransitionLog {
    fn default() -> Self {
        Self::new()
    }
}
