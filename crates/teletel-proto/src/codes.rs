//! Control, attribute, and protocol byte constants.
//!
//! Three families share this module:
//!
//! - C0 control bytes (0x00..=0x1F) acting on their own: cursor movement,
//!   screen clearing, mode switches, and the lead bytes that open multi-byte
//!   frames (`SEP`, `ACCENT`, `ESC`, `CURSOR_MOVE`).
//! - Attribute bytes sent after `ESC`: colours, video modes, character
//!   sizes, underline, cursor blink.
//! - Protocol-class bytes sent after `ESC` in acknowledgement frames
//!   (`PRO1`/`PRO2`/`PRO3`), each announcing how many bytes follow.
//!
//! All values are 7-bit; parity is applied at the transport layer.

/// Audible bell.
pub const BELL: u8 = 0x07;
/// Move cursor one column left.
pub const CURSOR_LEFT: u8 = 0x08;
/// Move cursor one column right.
pub const CURSOR_RIGHT: u8 = 0x09;
/// Move cursor one row down.
pub const CURSOR_DOWN: u8 = 0x0A;
/// Move cursor one row up.
pub const CURSOR_UP: u8 = 0x0B;
/// Clear the whole screen (row 0 excepted) and home the cursor.
pub const CLEAR_SCREEN: u8 = 0x0C;
/// Move cursor to the start of the current row.
pub const START_LINE: u8 = 0x0D;
/// Switch to the semi-graphics (mosaic) character set.
pub const SEMIGRAPHICS_MODE: u8 = 0x0E;
/// Switch back to the text character set.
pub const TEXT_MODE: u8 = 0x0F;
/// Make the cursor visible.
pub const CURSOR_VISIBLE: u8 = 0x11;
/// Repeat the previous character; followed by `0x40 | (count - 1)`.
pub const CHAR_REPEAT: u8 = 0x12;
/// Function-key frame lead byte; followed by one key code.
pub const SEP: u8 = 0x13;
/// Make the cursor invisible.
pub const CURSOR_INVISIBLE: u8 = 0x14;
/// Clear from the cursor to the end of the row.
pub const CLEAR_EOL: u8 = 0x18;
/// Accent/special-character lead byte (G2 set); followed by a code byte.
pub const ACCENT: u8 = 0x19;
/// Escape: opens an attribute or protocol-acknowledgement frame.
pub const ESC: u8 = 0x1B;
/// Home the cursor to row 1, column 1.
pub const CURSOR_HOME: u8 = 0x1E;
/// Absolute cursor positioning; followed by `0x40|row`, `0x40|col`.
pub const CURSOR_MOVE: u8 = 0x1F;

/// Character (foreground) colour attribute base; OR the colour code in.
pub const CHAR_COLOR: u8 = 0x40;
/// Background colour attribute base; OR the colour code in.
pub const BACK_COLOR: u8 = 0x50;
/// Blinking cursor attribute.
pub const CURSOR_BLINK: u8 = 0x48;
/// Fixed (non-blinking) cursor attribute.
pub const CURSOR_FIXED: u8 = 0x49;
/// End incrustation attribute.
pub const END_INCRUSTATION: u8 = 0x4A;
/// Start incrustation attribute.
pub const START_INCRUSTATION: u8 = 0x4B;
/// Normal character size.
pub const NORMAL_SIZE: u8 = 0x4C;
/// Double-height characters.
pub const DOUBLE_HEIGHT: u8 = 0x4D;
/// Double-width characters.
pub const DOUBLE_WIDTH: u8 = 0x4E;
/// Double-height and double-width characters.
pub const DOUBLE_SIZE: u8 = 0x4F;
/// Start of line masking.
pub const START_LINE_MASK: u8 = 0x58;
/// Underline off.
pub const END_UNDERLINE: u8 = 0x59;
/// Underline on.
pub const START_UNDERLINE: u8 = 0x5A;
/// Normal (non-reversed) video.
pub const NORMAL_VIDEO: u8 = 0x5C;
/// Reverse video.
pub const REVERSE_VIDEO: u8 = 0x5D;
/// Transparent video.
pub const TRANSPARENCY_VIDEO: u8 = 0x5E;
/// End of line masking.
pub const END_LINE_MASK: u8 = 0x5F;

/// PRO1 protocol acknowledgement class: one byte follows.
pub const PRO1: u8 = 0x39;
/// PRO2 protocol acknowledgement class: two bytes follow.
pub const PRO2: u8 = 0x3A;
/// PRO3 protocol acknowledgement class: three bytes follow.
pub const PRO3: u8 = 0x3B;

/// Number of bytes that follow a protocol-acknowledgement class byte.
///
/// `None` for unrecognized classes; the decoder resynchronizes by flushing.
#[must_use]
pub fn proto_ack_length(class: u8) -> Option<usize> {
    match class {
        PRO1 => Some(1),
        PRO2 => Some(2),
        PRO3 => Some(3),
        _ => None,
    }
}
