//! # Notification Feed
//!
//! Decodes notification records from the feed server's JSON API.
//!
//! The response body arrives in a fixed-capacity, zero-filled buffer,
//! so decoding first strips the trailing NUL padding. The server
//! answers `null` when no notification falls inside its polling
//! window; that is a normal "nothing new" outcome, not an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One notification record as served by the feed
///
/// Unknown fields (the server's storage ids, for one) are ignored;
/// missing fields decode to their defaults so partial records still
/// yield an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Short name identifying the notification
    #[serde(default)]
    pub name: String,
    /// Notification text
    #[serde(default)]
    pub notification: String,
    /// Seconds since the Unix epoch, assigned by the server
    #[serde(default)]
    pub timestamp: u64,
}

/// Why a feed body could not be decoded
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeedError {
    /// The body was not valid JSON for a feed entry
    #[error("malformed feed entry: {reason}")]
    Malformed { reason: String },
}

/// Strips the trailing NUL padding of a fixed-capacity response buffer
pub fn trim_padding(body: &[u8]) -> &[u8] {
    let end = body
        .iter()
        .rposition(|&byte| byte != 0)
        .map_or(0, |index| index + 1);
    &body[..end]
}

/// Decodes a feed response body
///
/// Returns `Ok(None)` for an empty or `null` body (no new
/// notification) and `Err` only for bodies that claim to be an entry
/// but cannot be decoded as one.
pub fn parse_entry(body: &[u8]) -> Result<Option<FeedEntry>, FeedError> {
    let trimmed = trim_padding(body);
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(trimmed).map_err(|error| FeedError::Malformed {
        reason: error.to_string(),
    })
}
