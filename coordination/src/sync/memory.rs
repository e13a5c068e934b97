//! In-process realtime store.
//!
//! Documents are kept as JSON objects under their store path, the way a
//! realtime key-value database holds them, and merged field by field. Each
//! path owns a broadcast channel; commit and fan-out happen under one lock,
//! which gives every subscriber the per-document total order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::debug;

use super::channel::{document_path, Subscription, SyncChannel, WriteCondition};
use super::error::{SyncError, SyncResult};
use crate::session::{DocumentPatch, SessionDocument, SessionId};

/// Channel capacity for broadcast
const CHANNEL_CAPACITY: usize = 64;

struct Slot {
    value: Option<Map<String, Value>>,
    sender: broadcast::Sender<SessionDocument>,
}

impl Slot {
    fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            value: None,
            sender,
        }
    }
}

/// Shared reference to InMemoryStore
pub type SharedInMemoryStore = Arc<InMemoryStore>;

pub struct InMemoryStore {
    slots: Mutex<HashMap<String, Slot>>,
    capacity: usize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_capacity(CHANNEL_CAPACITY)
    }

    /// Store whose per-document fan-out buffers `capacity` snapshots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn shared(self) -> SharedInMemoryStore {
        Arc::new(self)
    }

    /// Number of live subscribers of a session.
    pub fn subscriber_count(&self, id: &SessionId) -> usize {
        self.slots
            .lock()
            .map(|slots| {
                slots
                    .get(&document_path(id))
                    .map_or(0, |slot| slot.sender.receiver_count())
            })
            .unwrap_or(0)
    }

    /// Raw stored JSON of a session.
    pub fn raw(&self, id: &SessionId) -> SyncResult<Option<Value>> {
        let slots = self.slots.lock().map_err(|_| SyncError::LockPoisoned)?;
        Ok(slots
            .get(&document_path(id))
            .and_then(|slot| slot.value.clone())
            .map(Value::Object))
    }

    /// Merge under the lock, decode, commit and fan out.
    fn commit(
        &self,
        id: &SessionId,
        condition: Option<WriteCondition>,
        patch: &DocumentPatch,
    ) -> SyncResult<Option<SessionDocument>> {
        let fields = patch.to_fields()?;
        let path = document_path(id);

        let mut slots = self.slots.lock().map_err(|_| SyncError::LockPoisoned)?;
        let slot = slots
            .get_mut(&path)
            .ok_or_else(|| SyncError::NotFound(path.clone()))?;
        let current = slot
            .value
            .as_ref()
            .ok_or_else(|| SyncError::NotFound(path.clone()))?;

        if let Some(condition) = condition {
            let stored: SessionDocument = serde_json::from_value(Value::Object(current.clone()))?;
            if !condition.holds(&stored) {
                debug!(
                    session = %id,
                    ?condition,
                    actual = %stored.status,
                    "Conditional write skipped"
                );
                return Ok(None);
            }
        }

        let mut merged = current.clone();
        merge_fields(&mut merged, fields);
        let doc: SessionDocument = serde_json::from_value(Value::Object(merged.clone()))?;

        slot.value = Some(merged);
        let receivers = slot.sender.send(doc.clone()).unwrap_or(0);
        debug!(session = %id, status = %doc.status, receivers, "Snapshot published");
        Ok(Some(doc))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Shallow merge; `null` deletes the field.
fn merge_fields(target: &mut Map<String, Value>, fields: Map<String, Value>) {
    for (key, value) in fields {
        if value.is_null() {
            target.remove(&key);
        } else {
            target.insert(key, value);
        }
    }
}

#[async_trait]
impl SyncChannel for InMemoryStore {
    async fn read(&self, id: &SessionId) -> SyncResult<Option<SessionDocument>> {
        match self.raw(id)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn init_if_absent(&self, doc: SessionDocument) -> SyncResult<SessionDocument> {
        let path = document_path(&doc.session_id);
        let mut slots = self.slots.lock().map_err(|_| SyncError::LockPoisoned)?;
        let slot = slots
            .entry(path)
            .or_insert_with(|| Slot::new(self.capacity));

        if let Some(existing) = &slot.value {
            return Ok(serde_json::from_value(Value::Object(existing.clone()))?);
        }

        let value = match serde_json::to_value(&doc)? {
            Value::Object(map) => map,
            other => {
                return Err(SyncError::Backend(format!(
                    "document serialized to non-object: {other}"
                )))
            }
        };
        slot.value = Some(value);
        let _ = slot.sender.send(doc.clone());
        Ok(doc)
    }

    async fn mutate(&self, id: &SessionId, patch: &DocumentPatch) -> SyncResult<SessionDocument> {
        self.commit(id, None, patch)?
            .ok_or_else(|| SyncError::NotFound(document_path(id)))
    }

    async fn mutate_if(
        &self,
        id: &SessionId,
        condition: WriteCondition,
        patch: &DocumentPatch,
    ) -> SyncResult<Option<SessionDocument>> {
        self.commit(id, Some(condition), patch)
    }

    async fn subscribe(&self, id: &SessionId) -> SyncResult<Subscription> {
        let mut slots = self.slots.lock().map_err(|_| SyncError::LockPoisoned)?;
        let slot = slots
            .entry(document_path(id))
            .or_insert_with(|| Slot::new(self.capacity));
        Ok(Subscription::new(id.clone(), slot.sender.subscribe()))
    }
}
