//! Page token encoding
//!
//! A client page token is `<fingerprint>.<server cursor>`. The fingerprint
//! binds the token to the (event_sources, time window) of the query that
//! produced it; the server cursor is forwarded on the wire unchanged.
//! Page size is not bound and may change between pages.

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use contracts::{LoggingError, Result, TimeWindow};
use sha2::{Digest, Sha256};

const SEPARATOR: char = '.';
const FINGERPRINT_BYTES: usize = 8;

/// Source order and repetition do not change the query, so neither changes
/// the fingerprint.
fn fingerprint(event_sources: &[String], window: &TimeWindow) -> String {
    let sources: BTreeSet<&str> = event_sources.iter().map(String::as_str).collect();
    let mut hasher = Sha256::new();
    for source in sources {
        hasher.update(source.as_bytes());
        hasher.update([0u8]);
    }
    hasher.update([0xffu8]);
    hasher.update(bound(window.start).as_bytes());
    hasher.update([0u8]);
    hasher.update(bound(window.end).as_bytes());
    hex::encode(&hasher.finalize()[..FINGERPRINT_BYTES])
}

fn bound(t: Option<DateTime<Utc>>) -> String {
    t.map(|t| t.to_rfc3339_opts(SecondsFormat::Nanos, true))
        .unwrap_or_else(|| "-".to_string())
}

/// Wrap a server cursor. An empty cursor (last page) stays empty.
pub(crate) fn encode(server_cursor: &str, event_sources: &[String], window: &TimeWindow) -> String {
    if server_cursor.is_empty() {
        return String::new();
    }
    format!(
        "{}{SEPARATOR}{server_cursor}",
        fingerprint(event_sources, window)
    )
}

/// Unwrap a client page token into the server cursor to send.
///
/// `Ok(None)` for an empty token (first page).
///
/// # Errors
/// `InvalidArgument` if the token is malformed or was issued for a different
/// query.
pub(crate) fn decode(
    token: &str,
    event_sources: &[String],
    window: &TimeWindow,
) -> Result<Option<String>> {
    if token.is_empty() {
        return Ok(None);
    }

    let (tag, server_cursor) = token
        .split_once(SEPARATOR)
        .filter(|(tag, cursor)| tag.len() == FINGERPRINT_BYTES * 2 && !cursor.is_empty())
        .ok_or_else(|| LoggingError::invalid_argument("malformed page token"))?;

    if tag != fingerprint(event_sources, window) {
        return Err(LoggingError::invalid_argument(
            "page token was issued for a different query (event sources or time window changed)",
        ));
    }

    Ok(Some(server_cursor.to_string()))
}
