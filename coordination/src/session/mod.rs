//! Session document, field-level invariants and the sealing protocol.

pub mod document;
pub mod error;
pub mod patch;
pub mod room_code;
pub mod sealing;

pub use document::{CourtStatus, FailureReason, SessionDocument, Side};
pub use error::{SessionError, SessionResult};
pub use patch::DocumentPatch;
pub use room_code::SessionId;
pub use sealing::{stage_statement, stage_toggle_seal};
