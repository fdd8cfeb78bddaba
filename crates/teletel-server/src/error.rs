//! Error taxonomy for sessions and the server front end.

use teletel_terminal::TerminalError;
use thiserror::Error;

/// Conditions that interrupt or end one session.
///
/// Terminal conditions pass through losslessly so handlers can keep
/// distinguishing a quiet line from a vanished peer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Transport condition reported by the terminal codec.
    #[error(transparent)]
    Terminal(#[from] TerminalError),

    /// The user pressed CONNEXION/FIN and the session must end.
    #[error("user ended the session")]
    UserTerminate,

    /// The page tree or handler registry is misconfigured.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SessionError {
    /// True when the peer vanished mid-session.
    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Terminal(err) if err.is_disconnected())
    }

    /// True for the recoverable read timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Terminal(err) if err.is_timeout())
    }

    /// True when the user asked to end the session.
    pub fn is_user_terminate(&self) -> bool {
        matches!(self, Self::UserTerminate)
    }
}

/// Startup and accept-side failures of the server itself.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Unusable configuration file or pages tree.
    #[error("configuration error: {0}")]
    Config(String),

    /// A service listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address the bind was attempted on.
        addr: String,
        /// Underlying socket error.
        #[source]
        source: std::io::Error,
    },
}
