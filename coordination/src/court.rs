//! Court session client.
//!
//! One `CourtSession` per participant. It sees only its own pending writes
//! plus the last snapshot delivered by the sync channel, validates every
//! local action against that snapshot, and leaves arbitration of status
//! transitions to the stored document.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::adjudication::{AdjudicationError, Adjudicator, FailureKind};
use crate::session::{
    stage_statement, stage_toggle_seal, CourtStatus, FailureReason, SessionDocument, SessionError,
    SessionId, Side,
};
use crate::state_machine::{plan_transition, CourtAction, TransitionLog, TransitionRecord};
use crate::sync::{open_session, Subscription, SyncChannel, SyncError, WriteCondition};

/// Error type for court session operations
#[derive(Debug, Error)]
pub enum CourtError {
    /// Local contract violation, rejected before reaching the store.
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Result type for court session operations
pub type CourtResult<T> = Result<T, CourtError>;

pub struct CourtSession {
    channel: Arc<dyn SyncChannel>,
    session_id: SessionId,
    subscription: Subscription,
    snapshot: SessionDocument,
    /// Local editing view; never replicated.
    active_side: Option<Side>,
    log: TransitionLog,
}

impl CourtSession {
    /// Subscribe to `session_id`, creating the document if it does not exist.
    pub async fn join(channel: Arc<dyn SyncChannel>, session_id: SessionId) -> CourtResult<Self> {
        let (snapshot, subscription) = open_session(channel.as_ref(), &session_id).await?;
        info!(session = %session_id, status = %snapshot.status, "Joined court session");
        Ok(Self {
            channel,
            session_id,
            subscription,
            snapshot,
            active_side: None,
            log: TransitionLog::new(),
        })
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Last snapshot this client has observed.
    pub fn snapshot(&self) -> &SessionDocument {
        &self.snapshot
    }

    pub fn active_side(&self) -> Option<Side> {
        self.active_side
    }

    pub fn is_ready(&self) -> bool {
        self.snapshot.is_ready()
    }

    /// Transitions this client committed.
    pub fn transitions(&self) -> &[TransitionRecord] {
        self.log.records()
    }

    pub fn transition_summary(&self) -> String {
        self.log.summary()
    }

    /// Wait for the next snapshot from the channel.
    pub async fn next_snapshot(&mut self) -> CourtResult<&SessionDocument> {
        let doc = self.subscription.next().await?;
        self.observe(doc);
        Ok(&self.snapshot)
    }

    /// Apply every snapshot already delivered. Returns whether one arrived.
    pub fn sync_pending(&mut self) -> CourtResult<bool> {
        match self.subscription.latest()? {
            Some(doc) => {
                self.observe(doc);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn observe(&mut self, doc: SessionDocument) {
        if let Err(e) = doc.check_invariants() {
            warn!(session = %self.session_id, error = %e, "Snapshot violates invariants");
        }
        if let Some(side) = self.active_side {
            if doc.status != CourtStatus::Idle || doc.is_sealed(side) {
                self.active_side = None;
            }
        }
        self.snapshot = doc;
    }

    /// Open the private editing view for `side`.
    pub fn select_side(&mut self, side: Side) -> CourtResult<()> {
        if self.snapshot.status != CourtStatus::Idle {
            return Err(SessionError::phase(self.snapshot.status, "edit a statement").into());
        }
        if self.snapshot.is_sealed(side) {
            return Err(SessionError::SealedField { side }.into());
        }
        self.active_side = Some(side);
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.active_side = None;
    }

    /// Replace the statement of `side`. Rejected if that side is sealed,
    /// locally or by a seal that reached the store first.
    pub async fn set_statement(&mut self, side: Side, text: impl Into<String>) -> CourtResult<()> {
        self.sync_pending()?;
        let patch = stage_statement(&self.snapshot, side, text)?;
        match self
            .channel
            .mutate_if(&self.session_id, WriteCondition::unsealed(side), &patch)
            .await?
        {
            Some(doc) => {
                self.observe(doc);
                Ok(())
            }
            None => {
                self.refresh().await?;
                Err(SessionError::SealedField { side }.into())
            }
        }
    }

    /// Seal or unseal `side`. Sealing closes that side's editing view.
    ///
    /// Both directions only commit while the stored document is `Idle`.
    pub async fn toggle_seal(&mut self, side: Side) -> CourtResult<bool> {
        self.sync_pending()?;
        let patch = stage_toggle_seal(&self.snapshot, side)?;
        let sealed = patch.sealed_a.or(patch.sealed_b).unwrap_or(false);
        let Some(doc) = self
            .channel
            .mutate_if(&self.session_id, WriteCondition::status(CourtStatus::Idle), &patch)
            .await?
        else {
            self.refresh().await?;
            return Err(SessionError::phase(self.snapshot.status, "toggle a seal").into());
        };
        if sealed && self.active_side == Some(side) {
            self.active_side = None;
        }
        self.observe(doc);
        info!(session = %self.session_id, side = %side, sealed, "Seal toggled");
        Ok(sealed)
    }

    /// Replace the local snapshot with the stored document.
    async fn refresh(&mut self) -> CourtResult<()> {
        if let Some(doc) = self.channel.read(&self.session_id).await? {
            self.observe(doc);
        }
        Ok(())
    }

    /// Run one adjudication cycle and return the status this client ends on.
    ///
    /// If another client opened court first, or a side was unsealed before the
    /// write landed, the request is dropped and the adjudicator is not called.
    pub async fn open_court(&mut self, adjudicator: &dyn Adjudicator) -> CourtResult<CourtStatus> {
        self.sync_pending()?;
        let base = self.snapshot.clone();
        let Some(committed) = self.commit(&base, CourtAction::OpenCourt, None).await? else {
            return Ok(self.snapshot.status);
        };
        if !committed.is_ready() {
            // Only reachable over a backend without an atomic conditional write.
            warn!(session = %self.session_id, "Court opened on unsealed statements, aborting");
            let reason = FailureReason {
                kind: FailureKind::Unknown,
                message: "A statement was unsealed while court was opening. Please retry.".into(),
            };
            self.commit(&committed, CourtAction::RecordFailure(reason), Some("unsealed"))
                .await?;
            return Err(SessionError::NotReady.into());
        }

        info!(session = %self.session_id, "Court opened, requesting verdict");
        let outcome = adjudicator
            .adjudicate(&committed.statement_a, &committed.statement_b)
            .await
            .and_then(|verdict| {
                if verdict.trim().is_empty() {
                    Err(AdjudicationError::EmptyResponse)
                } else {
                    Ok(verdict)
                }
            });

        let (action, reason) = match outcome {
            Ok(verdict) => (CourtAction::DeliverVerdict(verdict), None),
            Err(e) => {
                error!(session = %self.session_id, kind = %e.kind(), error = %e, "Adjudication failed");
                (
                    CourtAction::RecordFailure(e.failure_reason()),
                    Some(e.kind().to_string()),
                )
            }
        };
        self.commit(&committed, action, reason.as_deref()).await?;
        Ok(self.snapshot.status)
    }

    /// `FAILED → IDLE`, keeping statements and seals for an immediate retry.
    pub async fn retry(&mut self) -> CourtResult<CourtStatus> {
        self.sync_pending()?;
        let base = self.snapshot.clone();
        self.commit(&base, CourtAction::Retry, None).await?;
        Ok(self.snapshot.status)
    }

    /// `RESOLVED → IDLE`, clearing statements, seals and verdict together.
    pub async fn new_case(&mut self) -> CourtResult<CourtStatus> {
        self.sync_pending()?;
        let base = self.snapshot.clone();
        if self.commit(&base, CourtAction::NewCase, None).await?.is_some() {
            self.active_side = None;
        }
        Ok(self.snapshot.status)
    }

    /// Plan `action` against `base` and write it conditionally.
    ///
    /// Returns `None` when the stored document no longer satisfies the
    /// action's write condition; the local snapshot is then refreshed from
    /// the store.
    async fn commit(
        &mut self,
        base: &SessionDocument,
        action: CourtAction,
        reason: Option<&str>,
    ) -> CourtResult<Option<SessionDocument>> {
        let from = action.from_status();
        let to = action.to_status();

        if base.status != from {
            info!(
                session = %self.session_id,
                action = action.name(),
                status = %base.status,
                "Session already left the expected status, ignoring"
            );
            return Ok(None);
        }
        let patch = plan_transition(base, &action)?;

        match self
            .channel
            .mutate_if(&self.session_id, action.write_condition(), &patch)
            .await?
        {
            Some(doc) => {
                self.log.record(from, to, reason);
                self.observe(doc.clone());
                Ok(Some(doc))
            }
            None => {
                info!(
                    session = %self.session_id,
                    action = action.name(),
                    expected = %from,
                    "Transition superseded by another client, ignoring"
                );
                self.refresh().await?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::InMemoryStore;

    async fn session() -> CourtSession {
        let store: Arc<dyn SyncChannel> = Arc::new(InMemoryStore::new());
        CourtSession::join(store, SessionId::new("482913"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_sealing_closes_active_view() {
        let mut court = session().await;
        court.select_side(Side::A).unwrap();
        court.set_statement(Side::A, "draft").await.unwrap();
        assert_eq!(court.active_side(), Some(Side::A));

        assert!(court.toggle_seal(Side::A).await.unwrap());
        assert_eq!(court.active_side(), None);
    }

    #[tokio::test]
    async fn test_select_sealed_side_is_rejected() {
        let mut court = session().await;
        court.toggle_seal(Side::B).await.unwrap();
        let err = court.select_side(Side::B).unwrap_err();
        assert!(matches!(
            err,
            CourtError::Session(SessionError::SealedField { side: Side::B })
        ));
    }

    #[tokio::test]
    async fn test_open_court_before_ready_is_rejected_locally() {
        struct Unreachable;
        #[async_trait::async_trait]
        impl Adjudicator for Unreachable {
            async fn adjudicate(&self, _a: &str, _b: &str) -> Result<String, AdjudicationError> {
                panic!("adjudicator must not be called");
            }
        }

        let mut court = session().await;
        court.toggle_seal(Side::A).await.unwrap();
        let err = court.open_court(&Unreachable).await.unwrap_err();
        assert!(matches!(err, CourtError::Session(SessionError::NotReady)));
        assert_eq!(court.snapshot().status, CourtStatus::Idle);
    }

    #[tokio::test]
    async fn test_blank_verdict_is_recorded_as_empty_response() {
        struct Blank;
        #[async_trait::async_trait]
        impl Adjudicator for Blank {
            async fn adjudicate(&self, _a: &str, _b: &str) -> Result<String, AdjudicationError> {
                Ok("  ".into())
            }
        }

        let mut court = session().await;
        court.toggle_seal(Side::A).await.unwrap();
        court.toggle_seal(Side::B).await.unwrap();
        let status = court.open_court(&Blank).await.unwrap();

        assert_eq!(status, CourtStatus::Failed);
        let reason = court.snapshot().failure_reason.clone().unwrap();
        assert_eq!(reason.kind, crate::adjudication::FailureKind::EmptyResponse);
    }
}
