//! Test utilities for hbs-render
//!
//! This module provides an in-memory [`SourceProvider`] that counts how often
//! it is consulted, plus a one-time tracing setup for tests. It is compiled
//! for unit tests and, behind the `test-utils` feature, for the integration
//! test suite.
//!
//! # Example
//!
//! ```rust,no_run
//! use hbs_render::test_utils::{CountingProvider, init_test_logging};
//!
//! init_test_logging(None);
//! let provider = CountingProvider::new()
//!     .with_template("views/index.hbs", "<h1>{{title}}</h1>")
//!     .with_partial("nav", "<nav></nav>");
//! assert_eq!(provider.template_fetches("views/index.hbs"), 0);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, Once, PoisonError, RwLock};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::core::ProviderError;
use crate::provider::{Partials, SourceProvider};
use crate::templating::identity::TemplateId;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. The provided level wins over
/// `RUST_LOG`; with neither set, no subscriber is installed.
///
/// ```bash
/// RUST_LOG=hbs_render=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// In-memory provider that records every fetch.
///
/// Templates are keyed by their resolved identity string. Sources can be
/// swapped with [`set_template`](Self::set_template) while an engine holds the
/// provider, which is how cache behavior is observed.
#[derive(Debug, Default)]
pub struct CountingProvider {
    templates: RwLock<HashMap<String, String>>,
    partials: RwLock<Partials>,
    partials_missing: AtomicBool,
    storage_failure: AtomicBool,
    latency: Option<Duration>,
    template_fetches: Mutex<HashMap<String, usize>>,
    partial_fetches: AtomicUsize,
}

impl CountingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(self, id: &str, source: &str) -> Self {
        self.set_template(id, source);
        self
    }

    pub fn with_partial(self, name: &str, source: &str) -> Self {
        self.set_partial(name, source);
        self
    }

    /// Report the partial set as not found instead of empty.
    pub fn without_partials(self) -> Self {
        self.partials_missing.store(true, Ordering::SeqCst);
        self
    }

    /// Sleep this long before answering any fetch.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn set_template(&self, id: &str, source: &str) {
        self.templates
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string(), source.to_string());
    }

    pub fn set_partial(&self, name: &str, source: &str) {
        self.partials
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), source.to_string());
    }

    /// Make every fetch fail with a storage error.
    pub fn set_storage_failure(&self, failing: bool) {
        self.storage_failure.store(failing, Ordering::SeqCst);
    }

    /// How many times the template `id` has been fetched.
    pub fn template_fetches(&self, id: &str) -> usize {
        self.template_fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .copied()
            .unwrap_or(0)
    }

    /// Fetches across all templates.
    pub fn total_template_fetches(&self) -> usize {
        self.template_fetches.lock().unwrap_or_else(PoisonError::into_inner).values().sum()
    }

    pub fn partial_fetches(&self) -> usize {
        self.partial_fetches.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    async fn fetch_template(&self, id: &TemplateId) -> Result<String, ProviderError> {
        *self
            .template_fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id.as_str().to_string())
            .or_default() += 1;
        self.wait().await;

        if self.storage_failure.load(Ordering::SeqCst) {
            return Err(ProviderError::storage(id.as_str(), anyhow::anyhow!("store unavailable")));
        }
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| ProviderError::not_found(id.as_str()))
    }

    async fn fetch_partials(&self) -> Result<Partials, ProviderError> {
        self.partial_fetches.fetch_add(1, Ordering::SeqCst);
        self.wait().await;

        if self.storage_failure.load(Ordering::SeqCst) {
            return Err(ProviderError::storage("partials", anyhow::anyhow!("store unavailable")));
        }
        if self.partials_missing.load(Ordering::SeqCst) {
            return Err(ProviderError::not_found("partials"));
        }
        Ok(self.partials.read().unwrap_or_else(PoisonError::into_inner).clone())
    }
}

impl SourceProvider for CountingProvider {
    fn get_template<'a>(&'a self, id: &'a TemplateId) -> BoxFuture<'a, Result<String, ProviderError>> {
        self.fetch_template(id).boxed()
    }

    fn get_partials(&self) -> BoxFuture<'_, Result<Partials, ProviderError>> {
        self.fetch_partials().boxed()
    }
}
