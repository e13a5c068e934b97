//! Map raw backend failures onto the adjudication taxonomy.
//!
//! Upstream errors are recognised by status code and message markers; the
//! service reports the same condition in several spellings.

use court_coordination::AdjudicationError;

use crate::backend::BackendError;

const AUTH_MARKERS: &[&str] = &[
    "api key",
    "api_key",
    "unauthenticated",
    "permission_denied",
];
const QUOTA_MARKERS: &[&str] = &["quota", "resource_exhausted", "rate limit", "too many requests"];
const OVERLOAD_MARKERS: &[&str] = &["overloaded", "unavailable"];

fn has_marker(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| text.contains(m))
}

/// Classify one failed backend call.
pub fn classify(err: &BackendError) -> AdjudicationError {
    let detail = err.to_string();
    let lower = detail.to_ascii_lowercase();

    match err {
        BackendError::MissingCredentials => AdjudicationError::Configuration(detail),
        BackendError::Http { status: 401 | 403, .. } => AdjudicationError::Configuration(detail),
        BackendError::Http { status: 429, .. } => AdjudicationError::QuotaExceeded(detail),
        BackendError::Http { status: 503, .. } => AdjudicationError::ServiceOverloaded(detail),
        _ if has_marker(&lower, AUTH_MARKERS) => AdjudicationError::Configuration(detail),
        _ if has_marker(&lower, QUOTA_MARKERS) || detail.contains("429") => {
            AdjudicationError::QuotaExceeded(detail)
        }
        _ if has_marker(&lower, OVERLOAD_MARKERS) || detail.contains("503") => {
            AdjudicationError::ServiceOverloaded(detail)
        }
        _ => AdjudicationError::Unknown(detail),
    }
}
