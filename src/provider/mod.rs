//! Template source providers.
//!
//! The engine never reads template text itself. It asks a [`SourceProvider`]
//! for a template by resolved identity and for the full set of partials. Three
//! interchangeable variants ship with the crate:
//!
//! - [`FileProvider`] - templates are files, partials are the files of one directory
//! - [`KeyValueProvider`] - templates and partials are prefixed keys in a
//!   [`KeyValueStore`] (`hbst:` and `hbsp:` by default)
//! - [`DocumentProvider`] - templates and partials are documents in a
//!   [`DocumentStore`], partials flagged with `is_partial`
//!
//! # Not found versus failure
//!
//! Providers return [`ProviderError::NotFound`] when a source simply does not
//! exist and [`ProviderError::Storage`] when the backing store failed. The
//! pipeline treats a missing partial set as empty and every other error as
//! fatal for the render.
//!
//! # Validation
//!
//! [`SourceProvider::validate`] runs once when an engine is built, never per
//! render.
//!
//! # Example
//!
//! ```rust,no_run
//! use hbs_render::provider::{KeyValueProvider, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.set("hbst:index.hbs", "<h1>Front page</h1>");
//! store.set("hbsp:scripts", r#"<script src="app.js"></script>"#);
//!
//! let provider = KeyValueProvider::new(store);
//! ```

pub mod document;
pub mod file;
pub mod kv;

pub use document::{DocumentProvider, DocumentStore, MemoryDocumentStore, TemplateDocument};
pub use file::FileProvider;
pub use kv::{KeyValueProvider, KeyValueStore, MemoryStore};

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::core::{ConfigError, ProviderError};
use crate::templating::identity::TemplateId;

/// Partial name to partial source.
pub type Partials = HashMap<String, String>;

/// Capability interface for anything that can supply template sources.
pub trait SourceProvider: Send + Sync {
    /// Fetch the source of the template (or layout) identified by `id`.
    fn get_template<'a>(&'a self, id: &'a TemplateId) -> BoxFuture<'a, Result<String, ProviderError>>;

    /// Fetch every partial, keyed by the name templates use in `{{> name}}`.
    fn get_partials(&self) -> BoxFuture<'_, Result<Partials, ProviderError>>;

    /// Check that the provider is usable. Called once at configuration time.
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

impl<P: SourceProvider + ?Sized> SourceProvider for Arc<P> {
    fn get_template<'a>(&'a self, id: &'a TemplateId) -> BoxFuture<'a, Result<String, ProviderError>> {
        (**self).get_template(id)
    }

    fn get_partials(&self) -> BoxFuture<'_, Result<Partials, ProviderError>> {
        (**self).get_partials()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        (**self).validate()
    }
}
