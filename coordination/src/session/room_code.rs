//! Session identifiers and the 6-digit room code users share.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::SessionError;

/// Smallest generated room code.
pub const ROOM_CODE_MIN: u32 = 100_000;
/// Largest generated room code.
pub const ROOM_CODE_MAX: u32 = 999_999;
/// Number of digits in a room code.
pub const ROOM_CODE_LEN: usize = 6;

/// Opaque session identifier. Immutable for the document's life.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an externally supplied id without validation.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Draw a fresh room code uniformly from `[100000, 999999]`.
    ///
    /// No uniqueness check is made; a collision joins the existing session.
    pub fn generate() -> Self {
        let code = rand::thread_rng().gen_range(ROOM_CODE_MIN..=ROOM_CODE_MAX);
        Self(code.to_string())
    }

    /// Parse a room code typed by a user.
    ///
    /// Non-digit characters are dropped first; exactly six digits must remain.
    pub fn parse_room_code(input: &str) -> Result<Self, SessionError> {
        let digits: String = input.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != ROOM_CODE_LEN {
            return Err(SessionError::InvalidRoomCode(input.to_string()));
        }
        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_are_six_digits_in_range() {
        for _ in 0..200 {
            let id = SessionId::generate();
            assert_eq!(id.as_str().len(), ROOM_CODE_LEN);
            let n: u32 = id.as_str().parse().unwrap();
            assert!((ROOM_CODE_MIN..=ROOM_CODE_MAX).contains(&n));
        }
    }

    #[test]
    fn test_parse_strips_non_digits() {
        let id = SessionId::parse_room_code(" 482-913 ").unwrap();
        assert_eq!(id.as_str(), "482913");
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(SessionId::parse_room_code("12345").is_err());
        assert!(SessionId::parse_room_code("1234567").is_err());
        assert!(SessionId::parse_room_code("abcdef").is_err());
    }

    #[test]
    fn test_leading_zero_code_accepted_when_joining() {
        // Generated codes never start with 0 but typed ones may.
        let id = SessionId::parse_room_code("012345").unwrap();
        assert_eq!(id.to_string(), "012345");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&SessionId::new("482913")).unwrap();
        assert_eq!(json, "\"482913\"");
    }
}
