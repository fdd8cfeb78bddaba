//! Even-parity encode and strip.
//!
//! The terminal link carries 7 data bits plus one parity bit in the high
//! position, chosen so the set-bit count of the full byte is even. Encoding
//! masks the input to 7 bits first, so arbitrary (8-bit) input such as
//! screen-data blobs is normalized rather than corrupted.

/// Encode one byte with even parity.
///
/// The high bit of the input is ignored; the output's population count is
/// always even.
#[must_use]
pub fn encode(byte: u8) -> u8 {
    let data = byte & 0x7F;
    if data.count_ones() % 2 == 1 { data | 0x80 } else { data }
}

/// Strip the parity bit, returning the 7 data bits.
#[must_use]
pub fn strip(byte: u8) -> u8 {
    byte & 0x7F
}

/// Encode a whole buffer with even parity.
#[must_use]
pub fn encode_all(data: &[u8]) -> Vec<u8> {
    data.iter().map(|&b| encode(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_bytes_have_even_population_count() {
        for byte in 0..=u8::MAX {
            assert_eq!(encode(byte).count_ones() % 2, 0, "byte {byte:#04x}");
        }
    }

    #[test]
    fn strip_recovers_the_data_bits() {
        for byte in 0..=0x7F {
            assert_eq!(strip(encode(byte)), byte);
        }
    }

    #[test]
    fn high_bit_of_input_is_ignored() {
        assert_eq!(encode(0x80), 0x00);
        assert_eq!(encode(0xC1), encode(0x41));
    }

    #[test]
    fn encode_all_matches_per_byte_encoding() {
        let data = [0x00, 0x41, 0x7F, 0xFF];
        let encoded = encode_all(&data);
        for (raw, enc) in data.iter().zip(&encoded) {
            assert_eq!(*enc, encode(*raw));
        }
    }
}
