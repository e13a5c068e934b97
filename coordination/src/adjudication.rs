//! Adjudication error taxonomy and the adjudicator seam.
//!
//! Every failure of the remote call is classified into a [`FailureKind`].
//! Callers query `is_retriable()` instead of matching on messages.
//!
//! ## Kinds
//!
//! | Kind              | Retriable | Surfaced as                       |
//! |-------------------|-----------|-----------------------------------|
//! | Configuration     | no        | operator-facing config problem    |
//! | QuotaExceeded     | yes       | "try again later"                 |
//! | ServiceOverloaded | yes       | "try again later"                 |
//! | EmptyResponse     | yes       | "try again later"                 |
//! | Unknown           | no        | generic connectivity message      |

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::FailureReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Missing or rejected credentials.
    Configuration,
    /// Quota or rate limit hit upstream.
    QuotaExceeded,
    /// Upstream overloaded or unavailable.
    ServiceOverloaded,
    /// The call succeeded but returned no text.
    EmptyResponse,
    /// Anything not matched by the markers above.
    Unknown,
}

impl FailureKind {
    pub fn is_retriable(self) -> bool {
        matches!(
            self,
            Self::QuotaExceeded | Self::ServiceOverloaded | Self::EmptyResponse
        )
    }

    /// Final message shown to both parties once retries are exhausted.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::Configuration => "System configuration error: the API key is missing or invalid.",
            Self::QuotaExceeded => {
                "The judge is exhausted (API quota exceeded) and is still busy after retrying. Please try again later."
            }
            Self::ServiceOverloaded => {
                "The court is overloaded right now and is still busy after retrying. Please try again later."
            }
            Self::EmptyResponse => {
                "The judge could not reach a verdict this time. Please try again later."
            }
            Self::Unknown => "The judge cannot reach the court network right now. Please retry.",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::QuotaExceeded => write!(f, "quota_exceeded"),
            Self::ServiceOverloaded => write!(f, "service_overloaded"),
            Self::EmptyResponse => write!(f, "empty_response"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A classified adjudication failure carrying the raw upstream detail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdjudicationError {
    // ── Non-retriable ─────────────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Adjudication failed: {0}")]
    Unknown(String),

    // ── Retriable ─────────────────────────────────────────────────────────
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Service overloaded: {0}")]
    ServiceOverloaded(String),

    #[error("Empty response from adjudication service")]
    EmptyResponse,
}

impl AdjudicationError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Configuration(_) => FailureKind::Configuration,
            Self::QuotaExceeded(_) => FailureKind::QuotaExceeded,
            Self::ServiceOverloaded(_) => FailureKind::ServiceOverloaded,
            Self::EmptyResponse => FailureKind::EmptyResponse,
            Self::Unknown(_) => FailureKind::Unknown,
        }
    }

    pub fn is_retriable(&self) -> bool {
        self.kind().is_retriable()
    }

    pub fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }

    /// The reason written into the session document.
    pub fn failure_reason(&self) -> FailureReason {
        FailureReason {
            kind: self.kind(),
            message: self.user_message().to_string(),
        }
    }
}

/// Maps two sealed statements to verdict text.
///
/// Implementations own their retry policy; an `Err` is final for this call.
#[async_trait]
pub trait Adjudicator: Send + Sync {
    async fn adjudicate(
        &self,
        statement_a: &str,
        statement_b: &str,
    ) -> Result<String, AdjudicationError>;
}
