//! Partial-field mutations of a session document.
//!
//! A `DocumentPatch` is the unit of `mutate`: a shallow set of fields that
//! the store merges into the stored document. Fields left as `None` are not
//! touched. `failure_reason` is tri-state so a patch can explicitly clear it.

use serde::Serialize;
use serde_json::{Map, Value};

use super::document::{CourtStatus, FailureReason, SessionDocument, Side};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement_a: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement_b: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sealed_a: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sealed_b: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CourtStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict_text: Option<String>,
    /// `Some(None)` serializes as `null`, which clears the stored field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<Option<FailureReason>>,
}

impl DocumentPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statement(mut self, side: Side, text: impl Into<String>) -> Self {
        match side {
            Side::A => self.statement_a = Some(text.into()),
            Side::B => self.statement_b = Some(text.into()),
        }
        self
    }

    pub fn sealed(mut self, side: Side, sealed: bool) -> Self {
        match side {
            Side::A => self.sealed_a = Some(sealed),
            Side::B => self.sealed_b = Some(sealed),
        }
        self
    }

    pub fn status(mut self, status: CourtStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn verdict(mut self, text: impl Into<String>) -> Self {
        self.verdict_text = Some(text.into());
        self
    }

    pub fn failure(mut self, reason: FailureReason) -> Self {
        self.failure_reason = Some(Some(reason));
        self
    }

    pub fn clear_failure(mut self) -> Self {
        self.failure_reason = Some(None);
        self
    }

    /// Whether the patch touches no field at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The JSON object of touched fields, as sent to the store.
    pub fn to_fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            // A struct always serializes to an object.
            _ => Ok(Map::new()),
        }
    }

    /// Merge this patch into a typed document in place.
    pub fn apply_to(&self, doc: &mut SessionDocument) {
        if let Some(text) = &self.statement_a {
            doc.statement_a.clone_from(text);
        }
        if let Some(text) = &self.statement_b {
            doc.statement_b.clone_from(text);
        }
        if let Some(sealed) = self.sealed_a {
            doc.sealed_a = sealed;
        }
        if let Some(sealed) = self.sealed_b {
            doc.sealed_b = sealed;
        }
        if let Some(status) = self.status {
            doc.status = status;
        }
        if let Some(text) = &self.verdict_text {
            doc.verdict_text.clone_from(text);
        }
        if let Some(reason) = &self.failure_reason {
            doc.failure_reason.clone_from(reason);
        }
    }
}
