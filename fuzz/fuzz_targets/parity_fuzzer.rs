//! Fuzz target for parity encode and strip
//!
//! This fuzzer runs arbitrary buffers through the even-parity codec to find:
//! - Bytes whose encoding ends up with odd population count
//! - Data bits lost or altered by the encode/strip pair
//! - Length changes in whole-buffer encoding
//!
//! The fuzzer should NEVER panic; every possible byte is encodable.

#![no_main]

use libfuzzer_sys::fuzz_target;
use teletel_proto::parity;

fuzz_target!(|data: &[u8]| {
    let encoded = parity::encode_all(data);
    assert_eq!(encoded.len(), data.len());

    for (&raw, &wire) in data.iter().zip(&encoded) {
        // Even parity over the full byte.
        assert_eq!(wire.count_ones() % 2, 0, "odd parity for {raw:#04x}");
        // Strip recovers the 7 data bits; the input's high bit never
        // survives.
        assert_eq!(parity::strip(wire), raw & 0x7F);
    }
});
