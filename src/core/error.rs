//! Error types for the rendering pipeline.
//!
//! The error system mirrors the stages of a render:
//! - [`ProviderError`] - a template or partial source could not be fetched
//! - [`CompileError`] - a template, layout or partial source is malformed
//! - [`ConfigError`] - the engine was configured with an invalid option or provider
//! - [`AsyncHelperError`] - an asynchronous helper failed (never reaches the caller)
//! - [`RenderError`] - the error handed back by [`Engine::render`](crate::engine::Engine::render)
//!
//! Provider and compile failures abort the render they occur in. Configuration
//! failures can only happen while building an engine. Async helper failures are
//! logged and replaced with empty output by the
//! [`Waiter`](crate::templating::waiter::Waiter).

use std::path::PathBuf;

use thiserror::Error;

use crate::templating::identity::TemplateId;

/// Failure reported by a [`SourceProvider`](crate::provider::SourceProvider).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested template or partial set does not exist.
    #[error("template source not found: {id}")]
    NotFound {
        /// Identity (or location hint) that was looked up
        id: String,
    },

    /// The backing storage failed while looking up the source.
    #[error("failed to read template source '{id}': {source}")]
    Storage {
        /// Identity (or location hint) that was looked up
        id: String,
        /// Underlying storage error
        #[source]
        source: anyhow::Error,
    },
}

impl ProviderError {
    /// Build a [`ProviderError::NotFound`] for `id`.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            id: id.into(),
        }
    }

    /// Build a [`ProviderError::Storage`] for `id` wrapping `source`.
    pub fn storage(id: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Storage {
            id: id.into(),
            source: source.into(),
        }
    }

    /// Map an I/O error, keeping `NotFound` distinguishable from other failures.
    pub fn from_io(id: impl Into<String>, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::not_found(id)
        } else {
            Self::storage(id, err)
        }
    }

    /// Returns `true` when the source simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound { .. })
    }
}

/// A template, layout or partial failed to compile.
#[derive(Debug, Error)]
#[error("failed to compile template '{name}': {source}")]
pub struct CompileError {
    /// Template identity or partial name
    pub name: String,
    /// Parser error from Handlebars
    #[source]
    pub source: handlebars::TemplateError,
}

impl CompileError {
    pub fn new(name: impl Into<String>, source: handlebars::TemplateError) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}

/// Invalid engine configuration, raised before any render runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The source provider failed its capability check.
    #[error("invalid template provider: {0}")]
    InvalidProvider(String),

    /// An option holds a value the engine cannot work with.
    #[error("invalid value for '{field}': {reason}")]
    InvalidOption {
        field: &'static str,
        reason: String,
    },

    /// The configuration file is not valid TOML for [`EngineConfig`](crate::config::EngineConfig).
    #[error("failed to parse engine configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration file could not be read.
    #[error("failed to read engine configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A helper or partial registered at build time was rejected.
    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Failure of a deferred helper computation.
///
/// These never propagate out of a render; see [`Waiter::done`](crate::templating::waiter::Waiter::done).
#[derive(Debug, Error)]
pub enum AsyncHelperError {
    #[error("async helper failed: {0}")]
    Failed(#[from] anyhow::Error),

    #[error("async helper task did not complete: {0}")]
    Aborted(String),
}

/// Error returned by [`Engine::render`](crate::engine::Engine::render).
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Handlebars failed while evaluating a compiled template.
    #[error("failed to render '{id}': {source}")]
    Template {
        id: TemplateId,
        #[source]
        source: handlebars::RenderError,
    },
}

impl RenderError {
    /// Returns `true` when the render failed because a source was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RenderError::Provider(e) if e.is_not_found())
    }
}
