//! Court Coordination Library
//!
//! Two parties privately submit statements into a shared session, seal them,
//! trigger one adjudication and read a shared verdict. Clients share nothing
//! but a replicated session document.
//!
//! # Components
//!
//! - [`session`]: the replicated `SessionDocument`, partial-field patches and
//!   the per-side sealing protocol
//! - [`state_machine`]: legal `IDLE → ADJUDICATING → RESOLVED | FAILED`
//!   transitions and the patch each one writes
//! - [`sync`]: subscribe/mutate over any pub/sub key-value backend, plus an
//!   in-memory realtime store
//! - [`adjudication`]: the adjudicator seam and its failure taxonomy
//! - [`resilience`]: retry budget and exponential backoff
//! - [`court`]: the per-participant client tying the above together
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use court_coordination::{CourtSession, InMemoryStore, SessionId, Side};
//!
//! let store = Arc::new(InMemoryStore::new());
//! let mut court = CourtSession::join(store, SessionId::generate()).await?;
//! court.set_statement(Side::A, "he never does dishes").await?;
//! court.toggle_seal(Side::A).await?;
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod adjudication;
pub mod court;
pub mod resilience;
pub mod session;
pub mod state_machine;
pub mod sync;

pub use adjudication::{AdjudicationError, Adjudicator, FailureKind};
pub use court::{CourtError, CourtResult, CourtSession};
pub use resilience::RetryPolicy;
pub use session::{
    CourtStatus, DocumentPatch, FailureReason, SessionDocument, SessionError, SessionId, Side,
};
pub use state_machine::{plan_transition, CourtAction, TransitionLog, TransitionRecord};
pub use sync::{
    open_session, InMemoryStore, SharedInMemoryStore, Subscription, SyncChannel, SyncError,
    SyncResult, WriteCondition,
};
