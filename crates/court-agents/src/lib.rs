//! Remote adjudication for court sessions.
//!
//! Wraps a generative completion service behind the
//! [`court_coordination::Adjudicator`] seam: one [`backend`] request per
//! attempt, [`classify`] to map raw failures onto retry categories, and
//! [`adjudicator::RemoteAdjudicator`] to drive the bounded backoff loop.

pub mod adjudicator;
pub mod backend;
pub mod classify;
pub mod config;
pub mod prompts;

pub use adjudicator::RemoteAdjudicator;
pub use backend::{BackendError, CompletionBackend, GeminiBackend};
pub use classify::classify;
pub use config::{ConfigError, CourtConfig};
