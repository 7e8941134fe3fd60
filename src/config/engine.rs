//! Engine configuration.
//!
//! [`EngineConfig`] holds the options fixed for the lifetime of an
//! [`Engine`](crate::engine::Engine). It can be built in code or loaded from a
//! TOML file:
//!
//! ```toml
//! # Extension appended to names that have none
//! extname = ".hbs"
//!
//! # Directory that view names and the default layout are resolved against
//! views = "/srv/app/views"
//!
//! # Layout used when a view has no directive and the render sets no layout
//! default_layout = "layouts/main"
//!
//! # Directory read by the filesystem provider for partials
//! partials_path = "/srv/app/views/partials"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::core::ConfigError;

/// Extension used when none is configured.
pub const DEFAULT_EXTNAME: &str = ".hbs";

fn default_extname() -> String {
    DEFAULT_EXTNAME.to_string()
}

/// Options fixed at configuration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Extension appended to template and layout names without one.
    #[serde(default = "default_extname")]
    pub extname: String,

    /// Name of the layout applied when neither a directive nor the render
    /// options choose one. Resolved against [`views`](Self::views).
    #[serde(alias = "defaultLayout", skip_serializing_if = "Option::is_none")]
    pub default_layout: Option<String>,

    /// Location hint for the default filesystem provider's partials.
    #[serde(
        alias = "partialsPath",
        alias = "partials_dir",
        alias = "partialsDir",
        skip_serializing_if = "Option::is_none"
    )]
    pub partials_path: Option<PathBuf>,

    /// Base directory (or key prefix) for relative view names.
    pub views: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            extname: default_extname(),
            default_layout: None,
            partials_path: None,
            views: String::new(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extname(mut self, extname: impl Into<String>) -> Self {
        self.extname = extname.into();
        self
    }

    pub fn with_default_layout(mut self, layout: impl Into<String>) -> Self {
        self.default_layout = Some(layout.into());
        self
    }

    pub fn with_partials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.partials_path = Some(path.into());
        self
    }

    pub fn with_views(mut self, views: impl Into<String>) -> Self {
        self.views = views.into();
        self
    }

    /// Parse a configuration from TOML text. The result is not validated.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read,
    /// [`ConfigError::Parse`] for invalid TOML and any error from
    /// [`validate`](Self::validate).
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).await.map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        config.validate()?;
        tracing::debug!("Loaded engine configuration from {}", path.display());
        Ok(config)
    }

    /// Check option values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.extname.starts_with('.') || self.extname.len() < 2 {
            return Err(ConfigError::InvalidOption {
                field: "extname",
                reason: format!("expected an extension like \".hbs\", got {:?}", self.extname),
            });
        }
        if self.default_layout.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(ConfigError::InvalidOption {
                field: "default_layout",
                reason: "must not be blank".to_string(),
            });
        }
        Ok(())
    }
}
