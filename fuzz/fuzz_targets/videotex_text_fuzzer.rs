//! Fuzz target for text::to_videotex
//!
//! This fuzzer feeds arbitrary Unicode through the transliteration table to
//! find:
//! - Panics on unusual code points or grapheme boundaries
//! - Unbounded expansion of the output buffer
//! - ASCII input picking up 8-bit bytes
//!
//! The fuzzer should NEVER panic. Untranslatable characters degrade or pass
//! through, they do not crash.

#![no_main]

use libfuzzer_sys::fuzz_target;
use teletel_proto::text::to_videotex;

fuzz_target!(|text: &str| {
    let out = to_videotex(text);

    // Worst case per character is an accent escape or a 4-byte UTF-8
    // passthrough.
    assert!(out.len() <= text.chars().count() * 4, "output grew past the per-char bound");

    // ASCII input must stay 7-bit clean; parity is the only bit-8 user.
    if text.is_ascii() {
        assert!(out.iter().all(|byte| *byte <= 0x7F), "8-bit byte from ASCII input");
    }
});
