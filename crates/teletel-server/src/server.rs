//! TCP front end: one listener per service, one task per connection.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use teletel_terminal::{BAUD_1200_DELAY, Terminal};
use tokio::net::{TcpListener, TcpStream};

use crate::chat::ChatRoom;
use crate::config::{ServerConfig, discover_services};
use crate::error::ServerError;
use crate::handler::HandlerRegistry;
use crate::session::Session;

/// State shared by every session task.
pub struct ServerState {
    /// Root of the pages tree.
    pub pages_root: PathBuf,
    /// Handler lookup table.
    pub handlers: HandlerRegistry,
    /// Process-wide chat room.
    pub chat: Arc<ChatRoom>,
    /// Per-byte write delay, when simulating a slow line.
    pub pacing: Option<Duration>,
}

/// The videotex server: one TCP listener per service directory.
///
/// A service numbered `3615` listens on port `3615`; the page tree decides
/// what exists, the network layer just follows it.
pub struct Server {
    listeners: Vec<(u16, TcpListener)>,
    addrs: Vec<(u16, SocketAddr)>,
    state: Arc<ServerState>,
}

impl Server {
    /// Discover services under the configured pages root and bind one
    /// listener per service.
    pub async fn bind(host: &str, config: &ServerConfig) -> Result<Self, ServerError> {
        let services = discover_services(&config.pages_dir)?;
        let chat = ChatRoom::new();
        let state = Arc::new(ServerState {
            pages_root: config.pages_dir.clone(),
            handlers: HandlerRegistry::builtin(Arc::clone(&chat)),
            chat,
            pacing: config.simulate_baud.then_some(BAUD_1200_DELAY),
        });

        let mut listeners = Vec::new();
        let mut addrs = Vec::new();
        for service in services {
            let addr = format!("{host}:{service}");
            let listener = TcpListener::bind(&addr)
                .await
                .map_err(|source| ServerError::Bind { addr: addr.clone(), source })?;
            let local = listener
                .local_addr()
                .map_err(|source| ServerError::Bind { addr: addr.clone(), source })?;
            tracing::info!(service, addr = %local, "service listening");
            listeners.push((service, listener));
            addrs.push((service, local));
        }

        Ok(Self { listeners, addrs, state })
    }

    /// Addresses actually bound, per service.
    pub fn local_addrs(&self) -> &[(u16, SocketAddr)] {
        &self.addrs
    }

    /// Shared state, mainly for tests poking at the chat room.
    pub fn state(&self) -> &Arc<ServerState> {
        &self.state
    }

    /// Accept connections on every service until shut down.
    pub async fn run(self) -> Result<(), ServerError> {
        let mut tasks = tokio::task::JoinSet::new();
        for (service, listener) in self.listeners {
            let state = Arc::clone(&self.state);
            tasks.spawn(accept_loop(service, listener, state));
        }
        while let Some(result) = tasks.join_next().await {
            if let Err(err) = result {
                tracing::error!(error = %err, "accept loop stopped unexpectedly");
            }
        }
        Ok(())
    }
}

async fn accept_loop(service: u16, listener: TcpListener, state: Arc<ServerState>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tracing::info!(service, %peer, "connection accepted");
                let state = Arc::clone(&state);
                tokio::spawn(handle_connection(stream, peer, service, state));
            }
            Err(err) => {
                tracing::error!(service, error = %err, "accept error");
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    service: u16,
    state: Arc<ServerState>,
) {
    if state.pacing.is_some() {
        // Paced output only works if bytes leave as they are written.
        if let Err(err) = stream.set_nodelay(true) {
            tracing::debug!(%peer, error = %err, "cannot disable Nagle");
        }
    }

    let mut terminal = Terminal::new(stream);
    terminal.set_pacing(state.pacing);

    match Session::new(terminal, service, state).run().await {
        Ok(end) => tracing::debug!(service, %peer, ?end, "session closed"),
        Err(err) => tracing::warn!(service, %peer, error = %err, "session failed"),
    }
}
