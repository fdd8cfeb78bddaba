//! Error types for terminal I/O.
//!
//! Two failure kinds, never conflated: a bounded wait that found nothing
//! ([`TerminalError::Timeout`], recoverable, drives polling loops) and a
//! transport that is gone ([`TerminalError::Disconnected`], fatal to the
//! owning session).
//!
//! We carry the transport failure as a message rather than the raw
//! `std::io::Error` so errors stay `Clone` and comparable in tests.

use std::io;

use thiserror::Error;

/// Errors surfaced by a [`crate::Terminal`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TerminalError {
    /// A bounded read found no byte within its deadline.
    ///
    /// Never logged as an error; callers retry, treat it as "no event",
    /// or use it as the tick of a polling loop.
    #[error("timed out waiting for terminal data")]
    Timeout,

    /// The transport is gone: end of stream, reset, or a failed write.
    #[error("terminal disconnected: {0}")]
    Disconnected(String),
}

impl TerminalError {
    /// Returns true if this error is a timeout that callers may retry.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns true if the transport is gone and the session must unwind.
    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected(_))
    }
}

/// Every transport-level I/O failure means the terminal is gone.
impl From<io::Error> for TerminalError {
    fn from(err: io::Error) -> Self {
        Self::Disconnected(err.to_string())
    }
}
