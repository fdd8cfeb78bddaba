//! Videotex page server: services, sessions and navigation.
//!
//! # Architecture
//!
//! - [`Server`] discovers numbered service directories under the pages
//!   root, binds one TCP listener per service and spawns a [`Session`] task
//!   per connection.
//! - [`Session`] walks the user through [`Page`]s. Each page visit is
//!   driven by a [`PageHandler`] resolved from the [`HandlerRegistry`]; the
//!   descriptor-driven [`DefaultHandler`] covers pages without custom code.
//! - [`NavigationContext`] is the immutable history chain RETOUR walks
//!   back, accumulating submitted field texts along the way.
//! - [`ChatRoom`] is the process-wide broadcast component behind the chat
//!   page; sessions poll their mailboxes between short input waits.
//!
//! Terminal I/O itself lives in `teletel-terminal`; this crate only decides
//! what to draw and where to go next.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chat;
mod clock;
mod config;
mod context;
mod error;
mod handler;
mod page;
mod server;
mod session;
mod ulla;

pub use chat::{ChatHandler, ChatMessage, ChatRegistration, ChatRoom};
pub use clock::ClockHandler;
pub use config::{ServerConfig, discover_services};
pub use context::NavigationContext;
pub use error::{ServerError, SessionError};
pub use handler::{DefaultHandler, HandlerFactory, HandlerRegistry, PageHandler, render_screen};
pub use page::{FieldSpec, Page, PageDescriptor, TransitionRule};
pub use server::{Server, ServerState};
pub use session::{Session, SessionEnd};
pub use ulla::UllaHandler;
