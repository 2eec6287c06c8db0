//! Fuzz target for LDAP filter escaping.
//!
//! Whatever the input, the escaped form must contain no unescaped filter
//! metacharacter and every backslash must introduce a two-digit hex escape.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_filter_escape -- -max_total_time=600

#![no_main]

use libfuzzer_sys::fuzz_target;
use passwatch_ldap::escape_filter_value;

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = std::str::from_utf8(data) {
        let escaped = escape_filter_value(value);

        // No metacharacter survives unescaped.
        assert!(!escaped.contains('('));
        assert!(!escaped.contains(')'));
        assert!(!escaped.contains('*'));
        assert!(!escaped.contains('\0'));

        // Every backslash is followed by exactly two hex digits.
        let bytes = escaped.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'\\' {
                assert!(i + 2 < bytes.len());
                assert!(bytes[i + 1].is_ascii_hexdigit());
                assert!(bytes[i + 2].is_ascii_hexdigit());
                i += 3;
            } else {
                i += 1;
            }
        }

        // Escaping is deterministic.
        assert_eq!(escaped, escape_filter_value(value));
    }
});
