//! Accent and special-character decoding.
//!
//! The byte [`crate::codes::ACCENT`] escapes into a small second character
//! set. A single follow-up byte either selects a special character directly
//! or names a diacritic class, in which case one more byte carries the base
//! vowel to compose with.

/// Look up a special character selected directly by the accent prefix.
///
/// Returns `None` when the code is not a special, in which case it may
/// still be a [`Diacritic`] class.
#[must_use]
pub fn special(code: u8) -> Option<char> {
    match code {
        0x23 => Some('£'),
        0x27 => Some('§'),
        0x2C => Some('←'),
        0x2D => Some('↑'),
        0x2E => Some('→'),
        0x2F => Some('↓'),
        0x30 => Some('°'),
        0x31 => Some('±'),
        0x3C => Some('¼'),
        0x3D => Some('½'),
        0x3E => Some('¾'),
        0x6A => Some('Œ'),
        0x7A => Some('œ'),
        0x7B => Some('ß'),
        _ => None,
    }
}

/// A diacritic class that composes with a base vowel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diacritic {
    /// Grave accent (à, è, ...).
    Grave,
    /// Acute accent (á, é, ...).
    Acute,
    /// Circumflex (â, ê, ...).
    Circumflex,
    /// Diaeresis (ä, ë, ...).
    Umlaut,
}

impl Diacritic {
    /// Decode the accent-class byte that follows the accent prefix.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x41 => Some(Self::Grave),
            0x42 => Some(Self::Acute),
            0x43 => Some(Self::Circumflex),
            0x48 => Some(Self::Umlaut),
            _ => None,
        }
    }

    /// Compose this diacritic with a base vowel.
    ///
    /// Returns `None` for bases that do not compose; callers fall back to
    /// the base character unchanged.
    #[must_use]
    pub fn compose(self, base: char) -> Option<char> {
        let composed = match (self, base) {
            (Self::Grave, 'a') => 'à',
            (Self::Grave, 'e') => 'è',
            (Self::Grave, 'i') => 'ì',
            (Self::Grave, 'o') => 'ò',
            (Self::Grave, 'u') => 'ù',
            (Self::Acute, 'a') => 'á',
            (Self::Acute, 'e') => 'é',
            (Self::Acute, 'i') => 'í',
            (Self::Acute, 'o') => 'ó',
            (Self::Acute, 'u') => 'ú',
            (Self::Circumflex, 'a') => 'â',
            (Self::Circumflex, 'e') => 'ê',
            (Self::Circumflex, 'i') => 'î',
            (Self::Circumflex, 'o') => 'ô',
            (Self::Circumflex, 'u') => 'û',
            (Self::Umlaut, 'a') => 'ä',
            (Self::Umlaut, 'e') => 'ë',
            (Self::Umlaut, 'i') => 'ï',
            (Self::Umlaut, 'o') => 'ö',
            (Self::Umlaut, 'u') => 'ü',
            _ => return None,
        };
        Some(composed)
    }
}
