//! Synchronization channel: propagates session mutations to every subscriber
//! as full snapshots.

pub mod channel;
pub mod error;
pub mod memory;

pub use channel::{document_path, open_session, Subscription, SyncChannel, WriteCondition};
pub use error::{SyncError, SyncResult};
pub use memory::{InMemoryStore, SharedInMemoryStore};
