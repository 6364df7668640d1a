// packages/routing/src/utils/config.rs
//! Routing settings
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. `config/routing.{toml,yaml,json}` (or an explicit file)
//! 3. Environment variables prefixed `APIX_ROUTING_`, `__` between nested
//!    keys (e.g. `APIX_ROUTING_TEMPLATES__SERVICE_MARKER`)

use crate::routing::configuration::{EndpointTemplates, RoutingConfiguration};
use crate::utils::errors::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Default settings file, resolved relative to the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "config/routing";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "APIX_ROUTING";

/// Top-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingSettings {
    /// Base URI of the repository's native namespace
    pub native_root: String,

    /// Base URI of the intercept namespace
    pub proxy_root: String,

    /// Endpoint path segments
    #[serde(default)]
    pub templates: EndpointTemplates,

    /// Logging
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,

    /// Emit JSON log lines
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl RoutingSettings {
    /// Load settings from the default file and the environment
    pub fn load() -> Result<Self> {
        Self::load_with(None)
    }

    /// Load settings from an explicit file and the environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(Some(path.as_ref()))
    }

    fn load_with(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => {
                debug!("Loading routing settings from {:?}", path);
                File::from(path).required(true)
            }
            None => File::with_name(DEFAULT_SETTINGS_FILE).required(false),
        };

        let templates = EndpointTemplates::default();
        let logging = LoggingSettings::default();

        let settings = Config::builder()
            .set_default("native_root", "")?
            .set_default("proxy_root", "")?
            .set_default("templates.resource_segment", templates.resource_segment)?
            .set_default("templates.global_segment", templates.global_segment)?
            .set_default("templates.service_marker", templates.service_marker)?
            .set_default("templates.service_doc_segment", templates.service_doc_segment)?
            .set_default("logging.level", logging.level)?
            .set_default("logging.json", logging.json)?
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Validate the settings into a routing configuration
    pub fn into_configuration(self) -> Result<RoutingConfiguration> {
        RoutingConfiguration::with_templates(&self.native_root, &self.proxy_root, self.templates)
    }
}
