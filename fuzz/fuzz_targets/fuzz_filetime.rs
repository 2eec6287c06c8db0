//! Fuzz target for FileTime parsing.
//!
//! Directory attribute values are untrusted input: parsing an arbitrary
//! pwdLastSet string must never panic, and whatever it accepts must
//! convert deterministically.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_filetime -- -max_total_time=600

#![no_main]

use libfuzzer_sys::fuzz_target;
use passwatch_core::filetime::parse_filetime;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        let parsed = parse_filetime(raw);

        // Parsing is deterministic.
        assert_eq!(parsed, parse_filetime(raw));

        // Zero and negative tick counts read as never set.
        if let Ok(ticks) = raw.trim().parse::<i64>() {
            if ticks <= 0 {
                assert_eq!(parsed, None);
            } else {
                // Positive tick counts always convert; chrono's range covers
                // the full i64 FileTime span.
                assert!(parsed.is_some());
            }
        }
    }
});
