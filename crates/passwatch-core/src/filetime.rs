//! Windows FileTime conversion
//!
//! Active Directory stores `pwdLastSet` as a count of 100-nanosecond
//! intervals since 1601-01-01 UTC. A value of zero means the password was
//! never set (or must be changed at next logon) and maps to `None`.

use chrono::{DateTime, Utc};

/// Seconds between 1601-01-01 and the Unix epoch.
const EPOCH_OFFSET_SECS: i64 = 11_644_473_600;

/// FileTime ticks per second.
const TICKS_PER_SECOND: i64 = 10_000_000;

/// Convert a raw FileTime value to a UTC instant.
///
/// Returns `None` for zero and negative values (never set) and for values
/// that do not land on a representable datetime (malformed directory data
/// must not abort a scan).
pub fn filetime_to_datetime(filetime: i64) -> Option<DateTime<Utc>> {
    if filetime <= 0 {
        return None;
    }
    let secs = filetime / TICKS_PER_SECOND - EPOCH_OFFSET_SECS;
    let nanos = ((filetime % TICKS_PER_SECOND) * 100) as u32;
    DateTime::from_timestamp(secs, nanos)
}

/// Parse a FileTime from its decimal string form, as the directory returns
/// it, and convert it. Unparseable input maps to `None`.
pub fn parse_filetime(raw: &str) -> Option<DateTime<Utc>> {
    raw.trim().parse::<i64>().ok().and_then(filetime_to_datetime)
}
