//! Terminal function keys.

/// A function key on the terminal keypad.
///
/// Keys arrive on the wire as a two-byte frame: [`crate::codes::SEP`]
/// followed by `0x40 | code`. The discriminants are the key codes
/// themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FunctionKey {
    /// Submit the current input.
    Envoi = 1,
    /// Navigate back to the previous page.
    Retour = 2,
    /// Redraw the current page.
    Repetition = 3,
    /// Ask for contextual help.
    Guide = 4,
    /// Cancel the current input.
    Annulation = 5,
    /// Jump back to the service root page.
    Sommaire = 6,
    /// Erase the last character of the focused field.
    Correction = 7,
    /// Advance focus to the next field.
    Suite = 8,
    /// Hang up.
    ConnexionFin = 9,
}

impl FunctionKey {
    /// Decode the byte that follows [`crate::codes::SEP`] in a key frame.
    ///
    /// Returns `None` for bytes outside `0x41..=0x49`.
    #[must_use]
    pub fn from_sep(byte: u8) -> Option<Self> {
        match byte {
            0x41 => Some(Self::Envoi),
            0x42 => Some(Self::Retour),
            0x43 => Some(Self::Repetition),
            0x44 => Some(Self::Guide),
            0x45 => Some(Self::Annulation),
            0x46 => Some(Self::Sommaire),
            0x47 => Some(Self::Correction),
            0x48 => Some(Self::Suite),
            0x49 => Some(Self::ConnexionFin),
            _ => None,
        }
    }

    /// The numeric key code (1 through 9).
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}
