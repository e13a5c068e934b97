//! The synchronization channel seam.
//!
//! Any pub/sub-capable key-value backend can carry sessions as long as it can
//! read a document, write it if absent, merge partial fields into it, and fan
//! full snapshots out to subscribers. No in-process owner of the document is
//! assumed: every client is just another writer.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::error::{SyncError, SyncResult};
use crate::session::{CourtStatus, DocumentPatch, SessionDocument, SessionId, Side};

/// Precondition of a conditional write, checked against the stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteCondition {
    pub status: Option<CourtStatus>,
    /// Both sides must be sealed.
    pub require_ready: bool,
    /// This side must still be unsealed.
    pub unsealed: Option<Side>,
}

impl WriteCondition {
    pub fn status(status: CourtStatus) -> Self {
        Self {
            status: Some(status),
            require_ready: false,
            unsealed: None,
        }
    }

    pub fn unsealed(side: Side) -> Self {
        Self {
            status: None,
            require_ready: false,
            unsealed: Some(side),
        }
    }

    pub fn ready(mut self) -> Self {
        self.require_ready = true;
        self
    }

    pub fn holds(&self, doc: &SessionDocument) -> bool {
        self.status.map_or(true, |status| doc.status == status)
            && (!self.require_ready || doc.is_ready())
            && self.unsealed.map_or(true, |side| !doc.is_sealed(side))
    }
}

/// Store path of a session document.
pub fn document_path(id: &SessionId) -> String {
    format!("sessions/{id}")
}

#[async_trait]
pub trait SyncChannel: Send + Sync {
    /// Current stored value, if any.
    async fn read(&self, id: &SessionId) -> SyncResult<Option<SessionDocument>>;

    /// Write `doc` only if nothing is stored yet.
    ///
    /// Returns whatever is stored afterwards, so racing initializers all end
    /// up holding the same document.
    async fn init_if_absent(&self, doc: SessionDocument) -> SyncResult<SessionDocument>;

    /// Shallow-merge `patch` into the stored document and fan out the result.
    ///
    /// Resolves once the store accepted the write, not once every
    /// subscriber has seen it.
    async fn mutate(&self, id: &SessionId, patch: &DocumentPatch) -> SyncResult<SessionDocument>;

    /// Merge `patch` only if the stored document still satisfies `condition`.
    ///
    /// Returns `None` when the document has moved on. The default is a
    /// read-then-write and is NOT atomic; backends with a native
    /// compare-and-swap override it.
    async fn mutate_if(
        &self,
        id: &SessionId,
        condition: WriteCondition,
        patch: &DocumentPatch,
    ) -> SyncResult<Option<SessionDocument>> {
        match self.read(id).await? {
            Some(doc) if condition.holds(&doc) => self.mutate(id, patch).await.map(Some),
            _ => Ok(None),
        }
    }

    /// Receive every future snapshot of the document, own writes included.
    async fn subscribe(&self, id: &SessionId) -> SyncResult<Subscription>;
}

/// A live feed of full snapshots for one session.
///
/// Snapshots arrive in store commit order. A subscriber that falls behind
/// skips straight to newer snapshots; since each one is complete, nothing
/// is lost but intermediate states.
pub struct Subscription {
    session_id: SessionId,
    receiver: broadcast::Receiver<SessionDocument>,
}

impl Subscription {
    pub fn new(session_id: SessionId, receiver: broadcast::Receiver<SessionDocument>) -> Self {
        Self {
            session_id,
            receiver,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Wait for the next snapshot.
    pub async fn next(&mut self) -> SyncResult<SessionDocument> {
        loop {
            match self.receiver.recv().await {
                Ok(doc) => return Ok(doc),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(session = %self.session_id, skipped, "Subscriber lagged, skipping to newer snapshot");
                }
                Err(broadcast::error::RecvError::Closed) => return Err(SyncError::ChannelClosed),
            }
        }
    }

    /// Next snapshot if one is already queued.
    pub fn try_next(&mut self) -> SyncResult<Option<SessionDocument>> {
        loop {
            match self.receiver.try_recv() {
                Ok(doc) => return Ok(Some(doc)),
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(session = %self.session_id, skipped, "Subscriber lagged, skipping to newer snapshot");
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SyncError::ChannelClosed)
                }
            }
        }
    }

    /// Drain queued snapshots and return the newest, if any.
    pub fn latest(&mut self) -> SyncResult<Option<SessionDocument>> {
        let mut newest = None;
        while let Some(doc) = self.try_next()? {
            newest = Some(doc);
        }
        Ok(newest)
    }
}

/// Subscribe to `id`, then read the document or initialize it if absent.
///
/// Subscribing first means no mutation committed after the read can be
/// missed. The returned snapshot is the canonical starting point.
pub async fn open_session<S>(
    channel: &S,
    id: &SessionId,
) -> SyncResult<(SessionDocument, Subscription)>
where
    S: SyncChannel + ?Sized,
{
    let subscription = channel.subscribe(id).await?;
    let doc = match channel.read(id).await? {
        Some(doc) => {
            debug!(session = %id, status = %doc.status, "Joined existing session");
            doc
        }
        None => {
            let doc = channel.init_if_absent(SessionDocument::new(id.clone())).await?;
            info!(session = %id, "Initialized session document");
            doc
        }
    };
    Ok((doc, subscription))
}
