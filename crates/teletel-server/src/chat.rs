//! Broadcast chat: the shared room, per-client mailboxes and the chat page
//! handler.
//!
//! One [`ChatRoom`] is shared by every session. Posting never touches other
//! sessions directly: messages go through an unbounded queue drained by a
//! single broadcaster task, which fans each one out to every registered
//! client's mailbox under the room lock. The order the broadcaster dequeues
//! is therefore the order every mailbox sees. Sessions poll their own
//! mailbox between short input waits, so the broadcaster never blocks on a
//! slow terminal.

#![allow(clippy::expect_used, reason = "Mutex poisoning should cause a panic")]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use teletel_proto::FunctionKey;
use teletel_terminal::{FieldSet, Terminal};
use tokio::sync::mpsc;

use crate::context::NavigationContext;
use crate::error::SessionError;
use crate::handler::{PageHandler, build_fields, render_screen};

/// Mailbox depth per client; the oldest line drops first.
const MAILBOX_DEPTH: usize = 17;

/// How often an idle chat session looks at its mailbox.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Screen row of the online counter.
const COUNTER_ROW: u8 = 3;

/// Rows the message area cycles through.
const FIRST_MESSAGE_ROW: u8 = 5;
const LAST_MESSAGE_ROW: u8 = 19;

/// One chat line as delivered to mailboxes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Display name of the sender.
    pub author: String,
    /// Message text as typed.
    pub body: String,
}

struct RoomState {
    /// Client id to pending lines, oldest first.
    mailboxes: HashMap<u64, VecDeque<ChatMessage>>,
    next_id: u64,
}

/// Process-wide broadcast room.
///
/// Registration, deregistration and delivery all serialize on one lock;
/// none of them ever happens across an await point.
pub struct ChatRoom {
    state: Mutex<RoomState>,
    posts: mpsc::UnboundedSender<ChatMessage>,
}

impl ChatRoom {
    /// Create the room and spawn its broadcaster task.
    ///
    /// Must be called inside a Tokio runtime. The broadcaster holds only a
    /// weak reference and exits once the room is dropped.
    pub fn new() -> Arc<Self> {
        let (posts, mut feed) = mpsc::unbounded_channel();
        let room = Arc::new(Self {
            state: Mutex::new(RoomState { mailboxes: HashMap::new(), next_id: 1 }),
            posts,
        });

        let weak = Arc::downgrade(&room);
        tokio::spawn(async move {
            while let Some(message) = feed.recv().await {
                let Some(room) = weak.upgrade() else { break };
                room.deliver(message);
            }
            tracing::debug!("chat broadcaster stopped");
        });

        room
    }

    /// Join the room. Dropping the returned registration leaves it, so every
    /// session exit path deregisters.
    pub fn register(self: &Arc<Self>) -> ChatRegistration {
        let id = {
            let mut state = self.state.lock().expect("chat room lock poisoned");
            let id = state.next_id;
            state.next_id += 1;
            state.mailboxes.insert(id, VecDeque::new());
            id
        };
        tracing::debug!(client = id, "chat client joined");
        ChatRegistration { room: Arc::clone(self), id }
    }

    /// Queue a message for broadcast. Never blocks.
    pub fn post(&self, message: ChatMessage) {
        if self.posts.send(message).is_err() {
            tracing::warn!("chat broadcaster gone, dropping message");
        }
    }

    /// Number of clients currently registered.
    pub fn client_count(&self) -> usize {
        self.state.lock().expect("chat room lock poisoned").mailboxes.len()
    }

    fn deliver(&self, message: ChatMessage) {
        let mut state = self.state.lock().expect("chat room lock poisoned");
        for mailbox in state.mailboxes.values_mut() {
            mailbox.push_back(message.clone());
            if mailbox.len() > MAILBOX_DEPTH {
                mailbox.pop_front();
            }
        }
    }

    fn leave(&self, id: u64) {
        self.state.lock().expect("chat room lock poisoned").mailboxes.remove(&id);
        tracing::debug!(client = id, "chat client left");
    }
}

/// Membership handle for one client.
pub struct ChatRegistration {
    room: Arc<ChatRoom>,
    id: u64,
}

impl ChatRegistration {
    /// Stable client id, also used for generated visitor names.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Take everything currently queued in this client's mailbox.
    pub fn drain(&self) -> Vec<ChatMessage> {
        let mut state = self.room.state.lock().expect("chat room lock poisoned");
        state
            .mailboxes
            .get_mut(&self.id)
            .map(|mailbox| mailbox.drain(..).collect())
            .unwrap_or_default()
    }

    /// Post a line under `author`.
    pub fn post(&self, author: &str, body: &str) {
        self.room.post(ChatMessage { author: author.to_string(), body: body.to_string() });
    }
}

impl Drop for ChatRegistration {
    fn drop(&mut self) {
        self.room.leave(self.id);
    }
}

/// Handler for the shared chat page.
///
/// Renders the page blob plus an online counter, then alternates between
/// short input waits and mailbox drains: incoming lines paint into the
/// message area, ENVOI posts the input field and clears it.
pub struct ChatHandler {
    room: Arc<ChatRoom>,
    fields: FieldSet,
    registration: Option<ChatRegistration>,
    author: String,
    next_row: u8,
}

impl ChatHandler {
    /// Handler bound to the process-wide room.
    pub fn new(room: Arc<ChatRoom>) -> Self {
        Self {
            room,
            fields: FieldSet::new(),
            registration: None,
            author: String::new(),
            next_row: FIRST_MESSAGE_ROW,
        }
    }

    async fn draw_message(
        &mut self,
        terminal: &mut Terminal,
        message: &ChatMessage,
    ) -> Result<(), SessionError> {
        terminal.move_cursor(1, self.next_row).await?;
        terminal.clear_eol().await?;
        terminal.print_text(&format!("{}> {}", message.author, message.body)).await?;
        self.next_row =
            if self.next_row >= LAST_MESSAGE_ROW { FIRST_MESSAGE_ROW } else { self.next_row + 1 };
        Ok(())
    }
}

#[async_trait]
impl PageHandler for ChatHandler {
    async fn before_rendering(
        &mut self,
        _terminal: &mut Terminal,
        context: &Arc<NavigationContext>,
    ) -> Result<(), SessionError> {
        self.fields = build_fields(context.page());
        let registration = self.room.register();
        self.author = context
            .custom("username")
            .map(str::to_string)
            .unwrap_or_else(|| format!("visiteur{}", registration.id()));
        self.registration = Some(registration);
        Ok(())
    }

    async fn render(
        &mut self,
        terminal: &mut Terminal,
        context: &Arc<NavigationContext>,
    ) -> Result<(), SessionError> {
        render_screen(terminal, context.page()).await?;
        terminal.move_cursor(1, COUNTER_ROW).await?;
        terminal.clear_eol().await?;
        terminal
            .print_text(&format!("{} utilisateurs en ligne", self.room.client_count()))
            .await?;
        Ok(())
    }

    async fn after_rendering(
        &mut self,
        terminal: &mut Terminal,
        context: &Arc<NavigationContext>,
    ) -> Result<Option<Arc<NavigationContext>>, SessionError> {
        loop {
            match self.fields.wait(terminal, Some(POLL_INTERVAL), true, None).await {
                Ok(FunctionKey::Envoi) => {
                    let body = self
                        .fields
                        .fields()
                        .first()
                        .map(|field| field.text().trim().to_string())
                        .unwrap_or_default();
                    if !body.is_empty() {
                        if let Some(registration) = &self.registration {
                            registration.post(&self.author, &body);
                        }
                    }
                    if let Some(field) = self.fields.fields_mut().first_mut() {
                        field.reset_text();
                    }
                }
                Ok(FunctionKey::Retour) => return Ok(context.previous().cloned()),
                Ok(FunctionKey::ConnexionFin) => return Err(SessionError::UserTerminate),
                Ok(other) => tracing::debug!(?other, "chat ignores this key"),
                Err(err) if err.is_timeout() => {
                    let pending =
                        self.registration.as_ref().map(ChatRegistration::drain).unwrap_or_default();
                    for message in &pending {
                        self.draw_message(terminal, message).await?;
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
