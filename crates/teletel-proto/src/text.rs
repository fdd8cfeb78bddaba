//! Text-to-videotex transliteration.
//!
//! Terminals render a 7-bit character set plus the accent escapes from
//! [`crate::accent`]. Outbound text is rewritten through a fixed
//! substitution table before hitting the wire. The table is protocol data;
//! its exact byte output is load-bearing for real hardware, quirks
//! included.

use crate::codes::ACCENT;

/// Rewrite a string into the byte sequence the terminal renders.
///
/// Lowercase accented characters become accent escape sequences, special
/// symbols become their dedicated escapes, and accented uppercase letters
/// degrade to plain ASCII since the terminal has no glyphs for them.
/// Characters outside the table pass through UTF-8 encoded.
#[must_use]
pub fn to_videotex(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            'à' => out.extend_from_slice(&[ACCENT, 0x41, b'a']),
            'â' => out.extend_from_slice(&[ACCENT, 0x43, b'a']),
            'ä' => out.extend_from_slice(&[ACCENT, 0x48, b'a']),
            'è' => out.extend_from_slice(&[ACCENT, 0x41, b'e']),
            'é' => out.extend_from_slice(&[ACCENT, 0x42, b'e']),
            'ê' => out.extend_from_slice(&[ACCENT, 0x43, b'e']),
            'ë' => out.extend_from_slice(&[ACCENT, 0x48, b'e']),
            'î' => out.extend_from_slice(&[ACCENT, 0x43, b'i']),
            'ï' => out.extend_from_slice(&[ACCENT, 0x48, b'i']),
            'ô' => out.extend_from_slice(&[ACCENT, 0x43, b'o']),
            'ö' => out.extend_from_slice(&[ACCENT, 0x48, b'o']),
            // Historical table sends the circumflex class for both.
            'ù' | 'û' => out.extend_from_slice(&[ACCENT, 0x43, b'u']),
            'ü' => out.extend_from_slice(&[ACCENT, 0x48, b'u']),
            'ç' => out.extend_from_slice(&[ACCENT, 0x4B, b'c']),
            '°' => out.extend_from_slice(&[ACCENT, 0x30]),
            '£' => out.extend_from_slice(&[ACCENT, 0x23]),
            'Œ' => out.extend_from_slice(&[ACCENT, 0x6A]),
            'œ' => out.extend_from_slice(&[ACCENT, 0x7A]),
            'ß' => out.extend_from_slice(&[ACCENT, 0x7B]),
            '¼' => out.extend_from_slice(&[ACCENT, 0x3C]),
            '½' => out.extend_from_slice(&[ACCENT, 0x3D]),
            '¾' => out.extend_from_slice(&[ACCENT, 0x3E]),
            '←' => out.extend_from_slice(&[ACCENT, 0x2C]),
            '↑' => out.extend_from_slice(&[ACCENT, 0x2D]),
            '→' => out.extend_from_slice(&[ACCENT, 0x2E]),
            '↓' => out.extend_from_slice(&[ACCENT, 0x2F]),
            '\u{0336}' => out.push(0x60),
            '|' => out.push(0x7C),
            '«' | '»' => out.push(b'"'),
            '’' => {}
            'À' | 'Â' | 'Ä' => out.push(b'A'),
            'È' | 'É' | 'Ê' | 'Ë' => out.push(b'E'),
            'Ï' | 'Î' => out.push(b'I'),
            'Ô' | 'Ö' => out.push(b'O'),
            'Ù' | 'Û' | 'Ü' => out.push(b'U'),
            'Ç' => out.push(b'C'),
            _ => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passes_through() {
        assert_eq!(to_videotex("HELLO 123"), b"HELLO 123");
    }

    #[test]
    fn lowercase_accents_become_escape_sequences() {
        assert_eq!(to_videotex("é"), vec![0x19, 0x42, b'e']);
        assert_eq!(to_videotex("à"), vec![0x19, 0x41, b'a']);
        assert_eq!(to_videotex("ç"), vec![0x19, 0x4B, b'c']);
    }

    #[test]
    fn u_grave_keeps_its_historical_encoding() {
        assert_eq!(to_videotex("ù"), vec![0x19, 0x43, b'u']);
        assert_eq!(to_videotex("û"), vec![0x19, 0x43, b'u']);
    }

    #[test]
    fn uppercase_accents_degrade_to_ascii() {
        assert_eq!(to_videotex("ÉTÉ"), b"ETE");
        assert_eq!(to_videotex("ÇA"), b"CA");
        assert_eq!(to_videotex("OÙ"), b"OU");
    }

    #[test]
    fn symbols_and_punctuation() {
        assert_eq!(to_videotex("°"), vec![0x19, 0x30]);
        assert_eq!(to_videotex("«x»"), b"\"x\"");
        assert_eq!(to_videotex("l’eau"), b"leau");
        assert_eq!(to_videotex("\u{0336}"), vec![0x60]);
    }

    #[test]
    fn mixed_text() {
        let bytes = to_videotex("déjà vu");
        assert_eq!(
            bytes,
            vec![b'd', 0x19, 0x42, b'e', b'j', 0x19, 0x41, b'a', b' ', b'v', b'u']
        );
    }
}
