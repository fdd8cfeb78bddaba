//! Wall-clock demo page: redraws the time once a second.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use teletel_proto::FunctionKey;
use teletel_terminal::{FieldSet, Terminal};

use crate::context::NavigationContext;
use crate::error::SessionError;
use crate::handler::{PageHandler, build_fields};

/// Cell where the time is printed, in double size.
const CLOCK_COL: u8 = 12;
const CLOCK_ROW: u8 = 9;

/// Redraw cadence.
const TICK: Duration = Duration::from_secs(1);

/// Shows a live `HH:MM:SS` clock until the user leaves.
///
/// RETOUR jumps back to the service's root page rather than one step back;
/// the clock is a leaf you bounce off, not a place history accumulates.
#[derive(Default)]
pub struct ClockHandler {
    fields: FieldSet,
}

impl ClockHandler {
    /// A fresh clock page handler.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PageHandler for ClockHandler {
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
            terminal.move_cursor(CLOCK_COL, CLOCK_ROW).await?;
            terminal.double_size().await?;
            terminal.print_text(&Local::now().format("%H:%M:%S").to_string()).await?;
            terminal.normal_size().await?;

            match self.fields.wait(terminal, Some(TICK), true, None).await {
                Ok(FunctionKey::Retour) => {
                    let root = context.page().navigate(None).await;
                    return Ok(Some(Arc::new(context.derive(std::collections::BTreeMap::new(), root))));
                }
                Ok(FunctionKey::ConnexionFin) => return Err(SessionError::UserTerminate),
                Ok(other) => tracing::debug!(?other, "clock ignores this key"),
                Err(err) if err.is_timeout() => {}
                Err(err) => return Err(err.into()),
            }
        }
    }
}
