//! Form fields and focus coordination.
//!
//! A [`FormField`] is one bounded, positioned text input drawn and edited
//! through the codec. A [`FieldSet`] owns the ordered fields of a page and
//! runs the focus cycle: `SUITE` advances to the next field (wrapping),
//! every other function key ends the wait and bubbles up to the caller.
//!
//! Field text is only mutated through the focus-editing loop or an explicit
//! reset, both of which keep `text length <= field length`.

use std::time::Duration;

use teletel_proto::{Color, FunctionKey};
use tracing::{debug, warn};

use crate::error::TerminalError;
use crate::terminal::{Terminal, UserInput};

/// One bounded text input at a fixed screen position.
#[derive(Debug, Clone)]
pub struct FormField {
    col: u8,
    row: u8,
    length: usize,
    text: String,
    color: Color,
    placeholder: char,
    initial_draw: bool,
}

impl FormField {
    /// A field at `(col, row)` holding at most `length` characters.
    ///
    /// Defaults: empty text, white, `'.'` placeholder, no initial draw.
    /// A zero-length field acts as a "press any key" prompt: it accepts no
    /// text and hides the cursor while focused.
    pub fn new(col: u8, row: u8, length: usize) -> Self {
        Self {
            col,
            row,
            length,
            text: String::new(),
            color: Color::White,
            placeholder: '.',
            initial_draw: false,
        }
    }

    /// Pre-fill the field, truncated to its length.
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.chars().take(self.length).collect();
        self
    }

    /// Display colour.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Placeholder character printed over empty cells.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: char) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Whether [`FormField::prepare`] draws the field once.
    #[must_use]
    pub fn with_initial_draw(mut self, draw: bool) -> Self {
        self.initial_draw = draw;
        self
    }

    /// The text currently held.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Empty the field and flag it for a redraw on the next prepare.
    ///
    /// Used by handlers that consume the text, like the chat page clearing
    /// its input line after a post.
    pub fn reset_text(&mut self) {
        self.text.clear();
        self.initial_draw = true;
    }

    /// Draw the field if it is flagged for an initial draw: current text in
    /// the field colour, remaining cells padded with the placeholder. The
    /// flag clears after the first call.
    pub async fn prepare(&mut self, term: &mut Terminal) -> Result<(), TerminalError> {
        if !self.initial_draw {
            return Ok(());
        }
        if self.length > 0 {
            term.move_cursor(self.col, self.row).await?;
            term.text_color(self.color).await?;
            term.print_text(&self.text).await?;
            let rem = self.length.saturating_sub(self.text.chars().count());
            if rem > 0 {
                term.print_repeat(self.placeholder, rem).await?;
            }
        }
        self.initial_draw = false;
        Ok(())
    }

    /// Edit this field until a function key ends the focus.
    ///
    /// `CORRECTION` erases the last character (bell when empty); printable
    /// characters append and echo, with the bell refusing input once the
    /// field is full; any other function key is returned to the caller.
    /// With `move_cursor`, the cursor is first placed just past the current
    /// text (backed off by one cell when the field is exactly full), or
    /// hidden entirely for zero-length fields.
    pub async fn grab_focus(
        &mut self,
        term: &mut Terminal,
        timeout: Option<Duration>,
        move_cursor: bool,
    ) -> Result<FunctionKey, TerminalError> {
        if move_cursor {
            if self.length > 0 {
                let mut offset = self.text.chars().count();
                if offset >= self.length {
                    offset = self.length.saturating_sub(1);
                }
                term.move_cursor(self.col.saturating_add(offset as u8), self.row).await?;
                term.text_color(self.color).await?;
                term.visible_cursor(true).await?;
            } else {
                term.visible_cursor(false).await?;
            }
        }
        loop {
            match term.wait_input(timeout).await? {
                UserInput::Key(FunctionKey::Correction) => {
                    if self.text.is_empty() {
                        term.bell().await?;
                    } else {
                        // At the full-length boundary the cursor already
                        // sits over the last cell.
                        if self.text.chars().count() < self.length {
                            term.cursor_left().await?;
                        }
                        term.print_char(self.placeholder).await?;
                        term.cursor_left().await?;
                        self.text.pop();
                    }
                }
                UserInput::Key(key) => return Ok(key),
                UserInput::Char(ch) => {
                    if self.text.chars().count() >= self.length {
                        term.bell().await?;
                    } else {
                        self.text.push(ch);
                        term.print_char(ch).await?;
                        if self.text.chars().count() >= self.length {
                            term.cursor_left().await?;
                        }
                    }
                }
            }
            debug!(text = %self.text, "field edited");
        }
    }
}

/// The ordered fields of one page, with focus coordination.
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    fields: Vec<FormField>,
    current: usize,
}

impl FieldSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Order is focus order.
    pub fn push(&mut self, field: FormField) {
        self.fields.push(field);
    }

    /// Drop all fields and reset focus.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.current = 0;
    }

    /// The fields in focus order.
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Mutable view of the fields, for resets between waits.
    pub fn fields_mut(&mut self) -> &mut [FormField] {
        &mut self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the set holds no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Wait until a function key other than `SUITE` ends the interaction.
    ///
    /// Prepares every field, then cycles focus starting at field 0: `SUITE`
    /// advances (wrapping past the last field), anything else is returned
    /// with the submitted text left in place on each field.
    ///
    /// `force_field` bypasses the cycle and keeps focus on one field. An
    /// empty set degrades to a bare function-key wait (characters are
    /// ignored). A `timeout` makes the wait fail with
    /// [`TerminalError::Timeout`] when the line stays quiet, which is how
    /// callers interleave input with reacting to external events.
    pub async fn wait(
        &mut self,
        term: &mut Terminal,
        timeout: Option<Duration>,
        move_cursor: bool,
        force_field: Option<usize>,
    ) -> Result<FunctionKey, TerminalError> {
        if let Some(index) = force_field {
            if let Some(field) = self.fields.get_mut(index) {
                field.prepare(term).await?;
                return field.grab_focus(term, timeout, move_cursor).await;
            }
            warn!(index, "forced field out of range, cycling instead");
        }

        for field in &mut self.fields {
            field.prepare(term).await?;
        }
        self.current = 0;

        if self.fields.is_empty() {
            loop {
                if let UserInput::Key(key) = term.wait_input(timeout).await? {
                    return Ok(key);
                }
            }
        }

        loop {
            let key = match self.fields.get_mut(self.current) {
                Some(field) => field.grab_focus(term, timeout, move_cursor).await?,
                None => {
                    self.current = 0;
                    continue;
                }
            };
            if key == FunctionKey::Suite {
                self.current = self.current.wrapping_add(1) % self.fields.len();
                debug!(field = self.current, "focus advanced");
            } else {
                return Ok(key);
            }
        }
    }
}
