//! Terminal I/O for Minitel sessions.
//!
//! Builds the interactive layer on top of `teletel-proto`'s byte tables:
//!
//! - [`Terminal`]: the codec over one connection. Parity on every byte,
//!   screen-control primitives, and the input decode that turns the raw
//!   stream into function keys and characters.
//! - [`FormField`] and [`FieldSet`]: bounded text inputs with the focus
//!   cycle that pages are built from.
//! - [`TerminalError`]: the two failure kinds, recoverable timeout and
//!   fatal disconnection.
//!
//! One terminal is owned by one session task; nothing here is shared.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod field;
pub mod terminal;

pub use error::TerminalError;
pub use field::{FieldSet, FormField};
pub use terminal::{BAUD_1200_DELAY, Connection, Terminal, UserInput};
