//! Videotex wire-protocol primitives.
//!
//! Everything a Minitel terminal puts on the wire is a 7-bit byte carried
//! under an even parity bit. This crate holds the pure, I/O-free half of the
//! protocol: control and attribute byte constants, parity math, the
//! function-key frame mapping, the accent/diacritic decode tables, and the
//! outbound transliteration of accented text into the terminal's escape
//! sequences.
//!
//! The I/O half (reading and writing these bytes over a connection, with
//! timeouts) lives in `teletel-terminal`; this crate is shared by the codec,
//! the server, and the fuzz targets.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod accent;
pub mod codes;
pub mod parity;
pub mod text;

mod key;

pub use key::FunctionKey;

/// Screen colour, as understood by the terminal's attribute sequences.
///
/// The wire code is the low three bits; it is combined with
/// [`codes::CHAR_COLOR`] or [`codes::BACK_COLOR`] after an escape byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    /// Black (wire code 0)
    Black = 0,
    /// Red (wire code 1)
    Red = 1,
    /// Green (wire code 2)
    Green = 2,
    /// Yellow (wire code 3)
    Yellow = 3,
    /// Blue (wire code 4)
    Blue = 4,
    /// Magenta (wire code 5)
    Magenta = 5,
    /// Cyan (wire code 6)
    Cyan = 6,
    /// White (wire code 7) - the terminal's default
    #[default]
    White = 7,
}

impl Color {
    /// Wire code for this colour (0..=7).
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Colour for a wire code. Codes above 7 are `None`.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Black),
            1 => Some(Self::Red),
            2 => Some(Self::Green),
            3 => Some(Self::Yellow),
            4 => Some(Self::Blue),
            5 => Some(Self::Magenta),
            6 => Some(Self::Cyan),
            7 => Some(Self::White),
            _ => None,
        }
    }
}
