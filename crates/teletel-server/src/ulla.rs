//! Username prompt in front of the chat page.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use teletel_proto::FunctionKey;
use teletel_terminal::{FieldSet, Terminal};

use crate::context::NavigationContext;
use crate::error::SessionError;
use crate::handler::{PageHandler, build_fields};

/// Asks for a username and hands it to the chat page via custom data.
///
/// ENVOI navigates to `ulla.chat`; an empty name is simply not recorded and
/// the chat page falls back to a generated visitor name.
#[derive(Default)]
pub struct UllaHandler {
    fields: FieldSet,
}

impl UllaHandler {
    /// A fresh username prompt handler.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PageHandler for UllaHandler {
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
        loop {
            match self.fields.wait(terminal, None, true, None).await? {
                FunctionKey::Envoi => {
                    let username = self
                        .fields
                        .fields()
                        .first()
                        .map(|field| field.text().trim().to_string())
                        .unwrap_or_default();

                    let mut submitted = BTreeMap::new();
                    for (index, field) in self.fields.fields().iter().enumerate() {
                        submitted.insert(index, field.text().to_string());
                    }

                    let next = context.page().navigate(Some("ulla.chat")).await;
                    let derived = context.derive(submitted, next);
                    let derived = if username.is_empty() {
                        derived
                    } else {
                        derived.with_custom("username", username)
                    };
                    return Ok(Some(Arc::new(derived)));
                }
                FunctionKey::Retour => return Ok(context.previous().cloned()),
                FunctionKey::ConnexionFin => return Err(SessionError::UserTerminate),
                other => tracing::debug!(?other, "username prompt ignores this key"),
            }
        }
    }
}
