//! Key-value store template provider.
//!
//! Templates live under `template_prefix + identity` and partials under
//! `partial_prefix + name`, Redis style:
//!
//! ```text
//! hbsp:scripts        -> {{> scripts}}
//! hbst:mainLayout.hbs -> layout "mainLayout"
//! hbst:index.hbs      -> view "index"
//! ```

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use futures::FutureExt;
use futures::future::BoxFuture;

use super::{Partials, SourceProvider};
use crate::core::{ConfigError, ProviderError};
use crate::templating::identity::TemplateId;

pub const DEFAULT_TEMPLATE_PREFIX: &str = "hbst:";
pub const DEFAULT_PARTIAL_PREFIX: &str = "hbsp:";

/// Minimal async key-value interface the provider needs.
pub trait KeyValueStore: Send + Sync {
    /// Value stored at `key`, or `None` when the key is absent.
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, anyhow::Result<Option<String>>>;

    /// All keys starting with `prefix`.
    fn keys<'a>(&'a self, prefix: &'a str) -> BoxFuture<'a, anyhow::Result<Vec<String>>>;
}

/// In-process [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).remove(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, anyhow::Result<Option<String>>> {
        let value = self.entries.read().unwrap_or_else(PoisonError::into_inner).get(key).cloned();
        futures::future::ready(Ok(value)).boxed()
    }

    fn keys<'a>(&'a self, prefix: &'a str) -> BoxFuture<'a, anyhow::Result<Vec<String>>> {
        let keys: Vec<String> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        futures::future::ready(Ok(keys)).boxed()
    }
}

/// Provider backed by a [`KeyValueStore`].
#[derive(Debug)]
pub struct KeyValueProvider<S> {
    store: S,
    template_prefix: String,
    partial_prefix: String,
}

impl<S: KeyValueStore> KeyValueProvider<S> {
    /// Provider with the default `hbst:` / `hbsp:` prefixes.
    pub fn new(store: S) -> Self {
        Self {
            store,
            template_prefix: DEFAULT_TEMPLATE_PREFIX.to_string(),
            partial_prefix: DEFAULT_PARTIAL_PREFIX.to_string(),
        }
    }

    pub fn with_template_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.template_prefix = prefix.into();
        self
    }

    pub fn with_partial_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.partial_prefix = prefix.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn fetch_template(&self, id: &TemplateId) -> Result<String, ProviderError> {
        let key = format!("{}{}", self.template_prefix, id);
        match self.store.get(&key).await {
            Ok(Some(source)) => Ok(source),
            Ok(None) => Err(ProviderError::not_found(key)),
            Err(e) => Err(ProviderError::storage(key, e)),
        }
    }

    async fn fetch_partials(&self) -> Result<Partials, ProviderError> {
        let prefix = self.partial_prefix.as_str();
        let keys = self
            .store
            .keys(prefix)
            .await
            .map_err(|e| ProviderError::storage(format!("{prefix}*"), e))?;

        let mut partials = Partials::new();
        for key in keys {
            // A key can disappear between listing and reading.
            let Some(source) =
                self.store.get(&key).await.map_err(|e| ProviderError::storage(&key, e))?
            else {
                continue;
            };
            let name = key.strip_prefix(prefix).unwrap_or(&key).to_string();
            partials.insert(name, source);
        }
        Ok(partials)
    }
}

impl<S: KeyValueStore> SourceProvider for KeyValueProvider<S> {
    fn get_template<'a>(&'a self, id: &'a TemplateId) -> BoxFuture<'a, Result<String, ProviderError>> {
        self.fetch_template(id).boxed()
    }

    fn get_partials(&self) -> BoxFuture<'_, Result<Partials, ProviderError>> {
        self.fetch_partials().boxed()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.template_prefix.is_empty() || self.partial_prefix.is_empty() {
            return Err(ConfigError::InvalidProvider(
                "key-value provider prefixes must not be empty".to_string(),
            ));
        }
        if self.template_prefix == self.partial_prefix {
            return Err(ConfigError::InvalidProvider(format!(
                "template and partial prefixes must differ (both '{}')",
                self.template_prefix
            )));
        }
        Ok(())
    }
}
