//! Byte-level terminal codec.
//!
//! [`Terminal`] wraps exactly one connection and owns all I/O for a session.
//! Every outbound byte is parity-encoded before it reaches the transport;
//! every inbound byte is parity-stripped before interpretation. On top of
//! that invariant it offers the screen-control primitives (cursor, colours,
//! sizes, repeat compression) and the high-level input decode that
//! classifies function-key frames, protocol acknowledgements, and accent
//! sequences.
//!
//! All per-session I/O is single-threaded: one `Terminal` is driven by one
//! session task and is never shared.

use std::time::Duration;

use teletel_proto::{Color, FunctionKey, accent, codes, parity, text};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::sleep;
use tracing::{debug, trace, warn};

use crate::error::TerminalError;

/// How long the line must stay quiet before a new connection is considered
/// settled.
const CONNECT_WINDOW: Duration = Duration::from_millis(200);

/// Probe wait for the one-time first-read drain.
const FIRST_READ_PROBE: Duration = Duration::from_millis(100);

/// Flush window once first-read garbage has been seen.
const FIRST_READ_FLUSH: Duration = Duration::from_secs(5);

/// Gap allowed between bytes while flushing buffered input.
const FLUSH_FOLLOWUP: Duration = Duration::from_millis(200);

/// Inter-byte delay reproducing a 1200 baud 7E1 modem link.
pub const BAUD_1200_DELAY: Duration = Duration::from_micros(8300);

/// Byte stream a [`Terminal`] can drive.
///
/// Blanket-implemented for any async stream: sessions hand in a TCP stream,
/// tests hand in an in-memory duplex pipe.
pub trait Connection: AsyncRead + AsyncWrite + Unpin + Send {}

impl<S: AsyncRead + AsyncWrite + Unpin + Send> Connection for S {}

/// One decoded unit of user input.
///
/// Function keys and plain characters are the only values the decode loop
/// ever surfaces; acknowledgement frames and noise are absorbed internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserInput {
    /// A function key frame.
    Key(FunctionKey),
    /// A printable or accent-composed character.
    Char(char),
}

/// Codec over one terminal connection.
pub struct Terminal {
    stream: Box<dyn Connection>,
    first_read: bool,
    pacing: Option<Duration>,
}

impl Terminal {
    /// Wrap a connection. The terminal takes exclusive ownership.
    pub fn new<S: Connection + 'static>(stream: S) -> Self {
        Self { stream: Box::new(stream), first_read: true, pacing: None }
    }

    /// Delay each outbound byte, reproducing a slow modem link.
    ///
    /// `None` writes at full speed. [`BAUD_1200_DELAY`] matches the pace of
    /// real 1200 baud hardware.
    pub fn set_pacing(&mut self, delay: Option<Duration>) {
        self.pacing = delay;
    }

    // --- Write path -------------------------------------------------------

    /// Parity-encode and send raw bytes.
    ///
    /// This is the only write path to the transport; screen-data blobs are
    /// streamed through it verbatim.
    pub async fn write_bytes(&mut self, data: &[u8]) -> Result<(), TerminalError> {
        let encoded = parity::encode_all(data);
        trace!(len = encoded.len(), "write");
        if let Some(delay) = self.pacing {
            for byte in &encoded {
                self.stream.write_all(std::slice::from_ref(byte)).await?;
                self.stream.flush().await?;
                sleep(delay).await;
            }
        } else {
            self.stream.write_all(&encoded).await?;
            self.stream.flush().await?;
        }
        Ok(())
    }

    /// Send a single control byte.
    pub async fn write_code(&mut self, code: u8) -> Result<(), TerminalError> {
        self.write_bytes(&[code]).await
    }

    /// Transliterate text and send it.
    pub async fn print_text(&mut self, message: &str) -> Result<(), TerminalError> {
        self.write_bytes(&text::to_videotex(message)).await
    }

    /// Transliterate and send one character.
    pub async fn print_char(&mut self, ch: char) -> Result<(), TerminalError> {
        let mut buf = [0u8; 4];
        self.print_text(ch.encode_utf8(&mut buf)).await
    }

    /// Print a character `count` times, using repeat compression for runs
    /// longer than two. Printing zero characters sends nothing.
    pub async fn print_repeat(&mut self, ch: char, count: usize) -> Result<(), TerminalError> {
        if count == 0 {
            return Ok(());
        }
        self.print_char(ch).await?;
        if count > 2 {
            self.write_bytes(&[codes::CHAR_REPEAT, 0x40 | (count - 1) as u8]).await?;
        } else {
            for _ in 1..count {
                self.print_char(ch).await?;
            }
        }
        Ok(())
    }

    // --- Read path --------------------------------------------------------

    /// Read one parity-stripped byte, waiting up to `limit` if given.
    async fn read_byte(&mut self, limit: Option<Duration>) -> Result<u8, TerminalError> {
        let byte = match limit {
            Some(limit) => tokio::time::timeout(limit, self.stream.read_u8())
                .await
                .map_err(|_| TerminalError::Timeout)??,
            None => self.stream.read_u8().await?,
        };
        let byte = parity::strip(byte);
        trace!("read {byte:#04x}");
        Ok(byte)
    }

    /// Read exactly `n` parity-stripped bytes.
    ///
    /// The first byte waits up to `timeout` if given; follow-up bytes of
    /// the run are always waited for.
    pub async fn read_exact_n(
        &mut self,
        n: usize,
        timeout: Option<Duration>,
    ) -> Result<Vec<u8>, TerminalError> {
        let mut bytes = Vec::with_capacity(n);
        for _ in 0..n {
            let limit = if bytes.is_empty() { timeout } else { None };
            bytes.push(self.read_byte(limit).await?);
        }
        Ok(bytes)
    }

    /// Absorb the byte burst a terminal emits while the line comes up.
    ///
    /// Returns once the line has been quiet for the connection window.
    pub async fn wait_connection(&mut self) -> Result<(), TerminalError> {
        debug!("waiting out connection noise");
        loop {
            match self.read_byte(Some(CONNECT_WINDOW)).await {
                Ok(byte) => trace!("connection noise {byte:#04x}"),
                Err(err) if err.is_timeout() => return Ok(()),
                Err(err) => return Err(err),
            }
        }
    }

    /// Drain whatever is buffered on the line.
    ///
    /// The first read waits up to `first_timeout`; once bytes are flowing,
    /// a short follow-up window is allowed between them. Returns when the
    /// line goes quiet.
    pub async fn flush_input(&mut self, first_timeout: Duration) -> Result<(), TerminalError> {
        let mut window = first_timeout;
        loop {
            match self.read_byte(Some(window)).await {
                Ok(byte) => {
                    trace!("flushed {byte:#04x}");
                    window = FLUSH_FOLLOWUP;
                }
                Err(err) if err.is_timeout() => return Ok(()),
                Err(err) => return Err(err),
            }
        }
    }

    /// Wait for the next function key or character.
    ///
    /// Classifies the stream byte by byte: `SEP` frames become
    /// [`UserInput::Key`] when the key code is in range and are dropped as
    /// acknowledgements otherwise; `ESC` acknowledgement frames are absorbed
    /// whole and never surfaced; printable bytes and accent sequences become
    /// [`UserInput::Char`]; anything else is logged and skipped.
    ///
    /// The very first call on a fresh connection drains residual
    /// negotiation bytes once, so partial frames from the line coming up are
    /// not misread as input.
    ///
    /// With a `timeout`, a quiet line fails with [`TerminalError::Timeout`];
    /// follow-up bytes of an already-started frame are always waited for.
    pub async fn wait_input(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<UserInput, TerminalError> {
        if self.first_read {
            self.first_read = false;
            debug!("draining first-read garbage");
            match self.read_byte(Some(FIRST_READ_PROBE)).await {
                Ok(_) => self.flush_input(FIRST_READ_FLUSH).await?,
                Err(err) if err.is_timeout() => {}
                Err(err) => return Err(err),
            }
        }

        loop {
            let byte = self.read_byte(timeout).await?;
            match byte {
                codes::SEP => {
                    let code = self.read_byte(None).await?;
                    if let Some(key) = FunctionKey::from_sep(code) {
                        debug!(?key, "function key");
                        return Ok(UserInput::Key(key));
                    }
                    debug!("sep acknowledge {code:#04x}");
                }
                codes::ESC => {
                    let class = self.read_byte(None).await?;
                    if let Some(count) = codes::proto_ack_length(class) {
                        self.read_exact_n(count, None).await?;
                    } else {
                        warn!("unsupported protocol acknowledge {class:#04x}");
                        self.flush_input(Duration::ZERO).await?;
                    }
                }
                0x20..=0x7F => return Ok(UserInput::Char(char::from(byte))),
                codes::ACCENT => {
                    if let Some(input) = self.read_accented(timeout).await? {
                        return Ok(input);
                    }
                }
                other => warn!("out-of-range byte {other:#04x}"),
            }
        }
    }

    /// Decode the bytes following an accent lead byte.
    ///
    /// `None` means the code byte was unrecognized and the caller should
    /// keep reading.
    async fn read_accented(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<Option<UserInput>, TerminalError> {
        let code = self.read_byte(None).await?;
        if let Some(special) = accent::special(code) {
            return Ok(Some(UserInput::Char(special)));
        }
        if let Some(diacritic) = accent::Diacritic::from_code(code) {
            let base = char::from(self.read_byte(timeout).await?);
            let composed = diacritic.compose(base).unwrap_or(base);
            return Ok(Some(UserInput::Char(composed)));
        }
        debug!("unknown accent code {code:#04x}");
        Ok(None)
    }

    // --- Screen control ---------------------------------------------------

    /// Move the cursor to home (row 1, column 1).
    pub async fn home_cursor(&mut self) -> Result<(), TerminalError> {
        self.write_code(codes::CURSOR_HOME).await
    }

    /// Clear the screen and home the cursor. Row 0 is untouched.
    pub async fn clear_screen(&mut self) -> Result<(), TerminalError> {
        self.write_code(codes::CLEAR_SCREEN).await
    }

    /// Clear from the cursor to the end of the row.
    pub async fn clear_eol(&mut self) -> Result<(), TerminalError> {
        self.write_code(codes::CLEAR_EOL).await
    }

    /// Move the cursor to an absolute position. Row 0 is the status row;
    /// the page area starts at row 1.
    pub async fn move_cursor(&mut self, col: u8, row: u8) -> Result<(), TerminalError> {
        self.write_bytes(&[codes::CURSOR_MOVE, 0x40 | row, 0x40 | col]).await
    }

    /// Move the cursor one column left.
    pub async fn cursor_left(&mut self) -> Result<(), TerminalError> {
        self.write_code(codes::CURSOR_LEFT).await
    }

    /// Move the cursor one column right.
    pub async fn cursor_right(&mut self) -> Result<(), TerminalError> {
        self.write_code(codes::CURSOR_RIGHT).await
    }

    /// Move the cursor one row up.
    pub async fn cursor_up(&mut self) -> Result<(), TerminalError> {
        self.write_code(codes::CURSOR_UP).await
    }

    /// Move the cursor one row down.
    pub async fn cursor_down(&mut self) -> Result<(), TerminalError> {
        self.write_code(codes::CURSOR_DOWN).await
    }

    /// Move the cursor to the start of the current row.
    pub async fn cursor_line_start(&mut self) -> Result<(), TerminalError> {
        self.write_code(codes::START_LINE).await
    }

    /// Send an attribute byte behind an escape.
    async fn attribute(&mut self, code: u8) -> Result<(), TerminalError> {
        self.write_bytes(&[codes::ESC, code]).await
    }

    /// Select the text (foreground) colour.
    pub async fn text_color(&mut self, color: Color) -> Result<(), TerminalError> {
        self.attribute(color.code() | codes::CHAR_COLOR).await
    }

    /// Select the background colour.
    pub async fn background_color(&mut self, color: Color) -> Result<(), TerminalError> {
        self.attribute(color.code() | codes::BACK_COLOR).await
    }

    /// Switch to reverse video.
    pub async fn reverse_video(&mut self) -> Result<(), TerminalError> {
        self.attribute(codes::REVERSE_VIDEO).await
    }

    /// Switch back to normal video.
    pub async fn normal_video(&mut self) -> Result<(), TerminalError> {
        self.attribute(codes::NORMAL_VIDEO).await
    }

    /// Switch to transparent video.
    pub async fn transparent_video(&mut self) -> Result<(), TerminalError> {
        self.attribute(codes::TRANSPARENCY_VIDEO).await
    }

    /// Select a blinking or fixed cursor.
    pub async fn blink_cursor(&mut self, blink: bool) -> Result<(), TerminalError> {
        if blink {
            self.attribute(codes::CURSOR_BLINK).await
        } else {
            self.attribute(codes::CURSOR_FIXED).await
        }
    }

    /// Normal character size.
    pub async fn normal_size(&mut self) -> Result<(), TerminalError> {
        self.attribute(codes::NORMAL_SIZE).await
    }

    /// Double-height characters.
    pub async fn double_height(&mut self) -> Result<(), TerminalError> {
        self.attribute(codes::DOUBLE_HEIGHT).await
    }

    /// Double-width characters.
    pub async fn double_width(&mut self) -> Result<(), TerminalError> {
        self.attribute(codes::DOUBLE_WIDTH).await
    }

    /// Double-height and double-width characters.
    pub async fn double_size(&mut self) -> Result<(), TerminalError> {
        self.attribute(codes::DOUBLE_SIZE).await
    }

    /// Underline on or off.
    pub async fn underline(&mut self, on: bool) -> Result<(), TerminalError> {
        if on {
            self.attribute(codes::START_UNDERLINE).await
        } else {
            self.attribute(codes::END_UNDERLINE).await
        }
    }

    /// Ring the terminal bell.
    pub async fn bell(&mut self) -> Result<(), TerminalError> {
        self.write_code(codes::BELL).await
    }

    /// Switch to the semi-graphics character set.
    pub async fn semigraphics_mode(&mut self) -> Result<(), TerminalError> {
        self.write_code(codes::SEMIGRAPHICS_MODE).await
    }

    /// Switch back to the text character set.
    pub async fn text_mode(&mut self) -> Result<(), TerminalError> {
        self.write_code(codes::TEXT_MODE).await
    }

    /// Show or hide the cursor.
    pub async fn visible_cursor(&mut self, visible: bool) -> Result<(), TerminalError> {
        if visible {
            self.write_code(codes::CURSOR_VISIBLE).await
        } else {
            self.write_code(codes::CURSOR_INVISIBLE).await
        }
    }

    /// Flash a message on the status row, then overprint it with spaces.
    ///
    /// The cursor is hidden while the message shows; callers that need it
    /// back reposition and re-show it themselves.
    pub async fn show_message(
        &mut self,
        message: &str,
        duration: Duration,
    ) -> Result<(), TerminalError> {
        self.visible_cursor(false).await?;
        self.move_cursor(1, 0).await?;
        self.print_text(message).await?;
        sleep(duration).await;
        self.move_cursor(1, 0).await?;
        self.print_repeat(' ', message.chars().count()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pacing_constant_matches_modem_rate() {
        // 1200 baud, 10 bits per byte on the line.
        assert!(BAUD_1200_DELAY >= Duration::from_micros(8000));
        assert!(BAUD_1200_DELAY <= Duration::from_micros(8600));
    }
}
