//! Keyset pagination over the loyalty ledger.
//!
//! History is listed newest first by entry id, which is the order that
//! chains `remaining_points`. A [`LedgerCursor`] holds the id of the last
//! entry a client received; the next page starts strictly below it.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use thiserror::Error;

/// Default page size for history requests.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 200;

const CURSOR_TAG: &str = "ledger";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("Invalid cursor encoding")]
    InvalidEncoding,
    #[error("Invalid cursor format")]
    InvalidFormat,
    #[error("Invalid entry id in cursor")]
    InvalidId,
}

/// Exclusive upper bound on entry ids for the next history page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerCursor {
    last_id: i64,
}

impl LedgerCursor {
    /// Cursor for the page following the entry `last_id`.
    pub fn after(last_id: i64) -> Self {
        Self { last_id }
    }

    pub fn last_id(&self) -> i64 {
        self.last_id
    }

    /// Whether entry `id` falls on a page after this cursor.
    pub fn admits(&self, id: i64) -> bool {
        id < self.last_id
    }

    /// Opaque, URL-safe form handed to clients.
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{}:{}", CURSOR_TAG, self.last_id))
    }

    pub fn decode(raw: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(raw)
            .map_err(|_| CursorError::InvalidEncoding)?;
        let text = String::from_utf8(bytes).map_err(|_| CursorError::InvalidFormat)?;

        let id = match text.split_once(':') {
            Some((CURSOR_TAG, id)) => id,
            _ => return Err(CursorError::InvalidFormat),
        };
        let last_id: i64 = id.parse().map_err(|_| CursorError::InvalidId)?;
        // Ledger ids start at 1.
        if last_id < 1 {
            return Err(CursorError::InvalidId);
        }

        Ok(Self { last_id })
    }
}

impl FromStr for LedgerCursor {
    type Err = CursorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl fmt::Display for LedgerCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Clamps a requested page size into `1..=MAX_PAGE_SIZE`.
pub fn clamp_limit(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE)
}

/// Cuts a page out of rows fetched with `limit + 1`.
///
/// The extra row only signals that another page exists. The returned cursor
/// points after the last row kept.
pub fn split_page<T>(
    mut rows: Vec<T>,
    limit: i64,
    cursor_of: impl Fn(&T) -> LedgerCursor,
) -> (Vec<T>, Option<LedgerCursor>) {
    let limit = usize::try_from(limit.max(1)).unwrap_or(usize::MAX);
    if rows.len() <= limit {
        return (rows, None);
    }

    rows.truncate(limit);
    let next = rows.last().map(cursor_of);
    (rows, next)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Newest-first page of `ledger` (ids ascending) the way the history
    /// query selects it.
    fn fetch(ledger: &[i64], cursor: Option<LedgerCursor>, limit: i64) -> Vec<i64> {
        ledger
            .iter()
            .rev()
            .copied()
            .filter(|id| cursor.map_or(true, |c| c.admits(*id)))
            .take(limit as usize + 1)
            .collect()
    }

    #[test]
    fn test_cursor_survives_query_string() {
        let cursor = LedgerCursor::after(4821);
        let encoded = cursor.to_string();

        assert!(encoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(encoded.parse::<LedgerCursor>().unwrap(), cursor);
        assert_eq!(LedgerCursor::decode(&encoded).unwrap().last_id(), 4821);
    }

    #[test]
    fn test_decode_rejects_malformed_cursors() {
        assert_eq!(
            LedgerCursor::decode("not base64!!"),
            Err(CursorError::InvalidEncoding)
        );
        assert_eq!(
            LedgerCursor::decode(&URL_SAFE_NO_PAD.encode("4821")),
            Err(CursorError::InvalidFormat)
        );
        assert_eq!(
            LedgerCursor::decode(&URL_SAFE_NO_PAD.encode("2024-01-15T10:30:00Z:4821")),
            Err(CursorError::InvalidFormat)
        );
        assert_eq!(
            LedgerCursor::decode(&URL_SAFE_NO_PAD.encode("ledger:abc")),
            Err(CursorError::InvalidId)
        );
        assert_eq!(
            LedgerCursor::decode(&URL_SAFE_NO_PAD.encode("ledger:0")),
            Err(CursorError::InvalidId)
        );
    }

    #[test]
    fn test_cursor_admits_only_older_entries() {
        let cursor = LedgerCursor::after(7);
        assert!(cursor.admits(6));
        assert!(!cursor.admits(7));
        assert!(!cursor.admits(8));
    }

    #[test]
    fn test_paging_walks_ledger_newest_first() {
        let ledger: Vec<i64> = (1..=7).collect();
        let mut seen = Vec::new();
        let mut cursor = None;
        let mut pages = 0;

        loop {
            let rows = fetch(&ledger, cursor, 3);
            let (page, next) = split_page(rows, 3, |id| LedgerCursor::after(*id));
            seen.extend(page);
            pages += 1;
            match next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        assert_eq!(pages, 3);
        assert_eq!(seen, vec![7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_exact_fit_has_no_next_page() {
        let (page, next) = split_page(vec![3, 2, 1], 3, |id| LedgerCursor::after(*id));
        assert_eq!(page, vec![3, 2, 1]);
        assert!(next.is_none());
    }

    #[test]
    fn test_entries_appended_mid_walk_stay_off_later_pages() {
        let mut ledger: Vec<i64> = (1..=4).collect();
        let (first, next) = split_page(fetch(&ledger, None, 2), 2, |id| LedgerCursor::after(*id));
        assert_eq!(first, vec![4, 3]);

        ledger.push(5);
        let (second, next) = split_page(fetch(&ledger, next, 2), 2, |id| LedgerCursor::after(*id));
        assert_eq!(second, vec![2, 1]);
        assert!(next.is_none());
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(-5)), 1);
        assert_eq!(clamp_limit(Some(25)), 25);
        assert_eq!(clamp_limit(Some(10_000)), MAX_PAGE_SIZE);
    }
}
