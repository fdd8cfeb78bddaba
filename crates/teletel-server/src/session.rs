//! One connected terminal's walk through a service.
//!
//! Session lifecycle:
//!
//! ```text
//! WaitConnection ──► Active ──► Terminated
//! ```
//!
//! `WaitConnection` absorbs the byte burst a terminal emits while the line
//! comes up. `Active` is the render/await loop: resolve a handler for the
//! current page, run its three lifecycle calls, follow the context it
//! yields. `Terminated` is reached when the peer disconnects, the user
//! presses CONNEXION/FIN, or the page tree asks for a handler the registry
//! does not know.

use std::convert::Infallible;
use std::sync::Arc;

use teletel_terminal::Terminal;

use crate::context::NavigationContext;
use crate::error::SessionError;
use crate::page::Page;
use crate::server::ServerState;

/// Why a session ended normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user pressed CONNEXION/FIN.
    UserRequested,
    /// The peer vanished.
    Disconnected,
}

/// One terminal's session against one service.
pub struct Session {
    terminal: Terminal,
    service: u16,
    shared: Arc<ServerState>,
}

impl Session {
    /// Bind a terminal to a service.
    pub fn new(terminal: Terminal, service: u16, shared: Arc<ServerState>) -> Self {
        Self { terminal, service, shared }
    }

    /// Drive the session to completion.
    ///
    /// Disconnection and user termination are normal endings. Anything else
    /// (a handler the registry does not know, a timeout escaping a handler)
    /// is an error for the caller to log.
    pub async fn run(mut self) -> Result<SessionEnd, SessionError> {
        match self.drive().await {
            Err(SessionError::UserTerminate) => {
                tracing::info!(service = self.service, "user ended the session");
                Ok(SessionEnd::UserRequested)
            }
            Err(err) if err.is_disconnected() => {
                tracing::info!(service = self.service, "terminal disconnected");
                Ok(SessionEnd::Disconnected)
            }
            Err(err) => Err(err),
            Ok(never) => match never {},
        }
    }

    async fn drive(&mut self) -> Result<Infallible, SessionError> {
        self.terminal.wait_connection().await?;
        tracing::info!(service = self.service, "terminal connected");

        self.terminal.clear_screen().await?;
        self.terminal.home_cursor().await?;

        let root = Page::resolve(&self.shared.pages_root, self.service, None).await;
        let mut context = NavigationContext::root(root);

        loop {
            let mut handler = self.shared.handlers.resolve(context.page().handler_name())?;
            tracing::debug!(service = self.service, page = context.page().name(), "page visit");
            handler.before_rendering(&mut self.terminal, &context).await?;
            handler.render(&mut self.terminal, &context).await?;
            if let Some(next) = handler.after_rendering(&mut self.terminal, &context).await? {
                context = next;
            }
        }
    }
}
