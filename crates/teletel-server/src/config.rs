//! Server configuration and service discovery.
//!
//! Configuration comes from an optional TOML file plus command-line
//! overrides. Services are not configured explicitly: every directory under
//! the pages root whose name is a number is one service, listening on the
//! port of the same number.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ServerError;

/// Settings read from `teletel.toml`.
///
/// Unknown keys are ignored so a newer config file still loads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Root directory holding one subdirectory per service number.
    pub pages_dir: PathBuf,
    /// Pace every outbound byte like a 1200 baud line.
    pub simulate_baud: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { pages_dir: PathBuf::from("pages"), simulate_baud: false }
    }
}

impl ServerConfig {
    /// Load settings from a TOML file.
    ///
    /// A missing file yields the defaults; a file that exists but does not
    /// parse is a startup error, not something to silently ignore.
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no configuration file, using defaults");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(ServerError::Config(format!("cannot read {}: {err}", path.display())));
            }
        };
        toml::from_str(&raw)
            .map_err(|err| ServerError::Config(format!("cannot parse {}: {err}", path.display())))
    }
}

/// Enumerate the service numbers under the pages root.
///
/// Only directories with fully numeric names count; anything else in the
/// tree is ignored. An empty result is a configuration error because the
/// server would have nothing to listen on.
pub fn discover_services(pages_dir: &Path) -> Result<Vec<u16>, ServerError> {
    let entries = std::fs::read_dir(pages_dir).map_err(|err| {
        ServerError::Config(format!("cannot read pages directory {}: {err}", pages_dir.display()))
    })?;

    let mut services = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            ServerError::Config(format!(
                "cannot read pages directory {}: {err}",
                pages_dir.display()
            ))
        })?;
        if !entry.file_type().is_ok_and(|kind| kind.is_dir()) {
            continue;
        }
        if let Some(service) = entry.file_name().to_str().and_then(|name| name.parse::<u16>().ok())
        {
            services.push(service);
        } else {
            tracing::debug!(name = ?entry.file_name(), "skipping non-service directory");
        }
    }
    services.sort_unstable();

    if services.is_empty() {
        return Err(ServerError::Config(format!(
            "no service directories under {}",
            pages_dir.display()
        )));
    }
    Ok(services)
}
