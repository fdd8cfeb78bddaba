//! Page handlers and the registry that resolves them.
//!
//! A handler drives one page visit through three lifecycle calls:
//! `before_rendering` (field setup), `render` (emit the screen) and
//! `after_rendering` (watch the keyboard until the visit yields a new
//! context, `None` to re-render in place, or an error that ends the
//! session). The default handler covers every page whose descriptor names
//! no custom one; custom handlers are plain trait implementations picked
//! from the [`HandlerRegistry`], not subclasses of anything.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use teletel_proto::FunctionKey;
use teletel_terminal::{FieldSet, FormField, Terminal, UserInput};

use crate::chat::{ChatHandler, ChatRoom};
use crate::clock::ClockHandler;
use crate::context::NavigationContext;
use crate::error::SessionError;
use crate::page::Page;
use crate::ulla::UllaHandler;

/// Drives one page visit.
///
/// A fresh instance is created for every visit; state kept on the instance
/// lives exactly as long as the visit.
#[async_trait]
pub trait PageHandler: Send {
    /// Prepare handler state before anything is drawn.
    async fn before_rendering(
        &mut self,
        terminal: &mut Terminal,
        context: &Arc<NavigationContext>,
    ) -> Result<(), SessionError> {
        let _ = (terminal, context);
        Ok(())
    }

    /// Draw the page. The default streams the page's screen blob, if any.
    async fn render(
        &mut self,
        terminal: &mut Terminal,
        context: &Arc<NavigationContext>,
    ) -> Result<(), SessionError> {
        render_screen(terminal, context.page()).await
    }

    /// Watch input until the visit resolves.
    ///
    /// `Ok(Some(next))` navigates there, `Ok(None)` re-renders the same
    /// context, an error ends the session.
    async fn after_rendering(
        &mut self,
        terminal: &mut Terminal,
        context: &Arc<NavigationContext>,
    ) -> Result<Option<Arc<NavigationContext>>, SessionError>;
}

/// Stream a page's screen blob verbatim, if it has one.
pub async fn render_screen(terminal: &mut Terminal, page: &Page) -> Result<(), SessionError> {
    if let Some(blob) = page.screen_data().await {
        terminal.write_bytes(&blob).await?;
    }
    Ok(())
}

/// Build the editable field set a page's descriptor declares.
pub(crate) fn build_fields(page: &Page) -> FieldSet {
    let mut fields = FieldSet::new();
    for spec in page.forms() {
        let [row, col] = spec.location;
        fields.push(
            FormField::new(col, row, spec.length)
                .with_text(&spec.text)
                .with_color(spec.resolved_color())
                .with_initial_draw(true),
        );
    }
    fields
}

/// Evaluate transition rules over submitted fields, in descriptor order.
///
/// Each field's text is recorded up to and including the first field whose
/// rule matches; fields after the match are neither recorded nor tried.
pub(crate) fn evaluate_transitions(
    fields: &FieldSet,
    page: &Page,
) -> (BTreeMap<usize, String>, Option<String>) {
    let mut submitted = BTreeMap::new();
    for (index, (field, spec)) in fields.fields().iter().zip(page.forms()).enumerate() {
        submitted.insert(index, field.text().to_string());
        for rule in &spec.actions {
            if rule.matches(field.text()) {
                return (submitted, Some(rule.page.clone()));
            }
        }
    }
    (submitted, None)
}

/// Descriptor-driven handler used when a page names no custom one.
#[derive(Default)]
pub struct DefaultHandler {
    fields: FieldSet,
}

impl DefaultHandler {
    /// A handler with no fields yet; `before_rendering` builds them.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PageHandler for DefaultHandler {
    async fn before_rendering(
        &mut self,
        _terminal: &mut Terminal,
        context: &Arc<NavigationContext>,
    ) -> Result<(), SessionError> {
        self.fields = build_fields(context.page());
        Ok(())
    }

    async fn after_rendering(
        &mut self,
        terminal: &mut Terminal,
        context: &Arc<NavigationContext>,
    ) -> Result<Option<Arc<NavigationContext>>, SessionError> {
        if self.fields.is_empty() {
            // Static page: only RETOUR and CONNEXION/FIN mean anything.
            return match terminal.wait_input(None).await? {
                UserInput::Key(FunctionKey::Retour) => Ok(context.previous().cloned()),
                UserInput::Key(FunctionKey::ConnexionFin) => Err(SessionError::UserTerminate),
                other => {
                    tracing::debug!(?other, "input ignored on static page");
                    Ok(None)
                }
            };
        }

        let key = self.fields.wait(terminal, None, true, None).await?;
        tracing::debug!(?key, page = context.page().name(), "form released");

        let (submitted, target) = evaluate_transitions(&self.fields, context.page());
        match target {
            Some(name) => {
                let next = context.page().navigate(Some(&name)).await;
                tracing::debug!(from = context.page().name(), to = next.name(), "transition");
                Ok(Some(Arc::new(context.derive(submitted, next))))
            }
            None => Ok(None),
        }
    }
}

/// Factory producing one handler instance per page visit.
pub type HandlerFactory = Box<dyn Fn() -> Box<dyn PageHandler> + Send + Sync>;

/// Table mapping descriptor handler names to implementations.
pub struct HandlerRegistry {
    factories: HashMap<String, HandlerFactory>,
}

impl HandlerRegistry {
    /// An empty registry; pages without a handler name still resolve to the
    /// default handler.
    pub fn new() -> Self {
        Self { factories: HashMap::new() }
    }

    /// Registry with the built-in handlers: `ulla`, `chat` and `clock`.
    pub fn builtin(room: Arc<ChatRoom>) -> Self {
        let mut registry = Self::new();
        registry.register("ulla", Box::new(|| Box::new(UllaHandler::new())));
        registry
            .register("chat", Box::new(move || Box::new(ChatHandler::new(Arc::clone(&room)))));
        registry.register("clock", Box::new(|| Box::new(ClockHandler::new())));
        registry
    }

    /// Register a handler under its descriptor name.
    pub fn register(&mut self, name: impl Into<String>, factory: HandlerFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Instantiate the handler for `name`; `None` yields the default.
    ///
    /// A name the registry does not know is a configuration error: the
    /// descriptor asked for behaviour the server cannot provide.
    pub fn resolve(&self, name: Option<&str>) -> Result<Box<dyn PageHandler>, SessionError> {
        match name {
            None => Ok(Box::new(DefaultHandler::new())),
            Some(name) => match self.factories.get(name) {
                Some(factory) => Ok(factory()),
                None => Err(SessionError::Config(format!("unknown page handler '{name}'"))),
            },
        }
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
