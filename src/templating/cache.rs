//! Compiled template cache.
//!
//! Compiled templates are memoized per resolved [`TemplateId`] so that a
//! template is fetched from its provider and parsed only once per engine.
//! Every lookup takes a `use_cache` flag: when it is `false` the cache is
//! neither read nor written, which is what development-mode hot reload relies
//! on.
//!
//! Layout files are stored as ordinary entries under their own identity. A
//! template's entry additionally remembers the layout named by its
//! `{{!< ...}}` directive so a cache hit does not need to rescan the source.

use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;

use super::compiled::CompiledTemplate;
use super::identity::TemplateId;
use crate::core::RenderError;
use crate::provider::SourceProvider;

/// One cached template.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub template: CompiledTemplate,
    /// Layout named by the template's own directive, once resolved.
    pub layout: Option<CompiledTemplate>,
}

/// Cache of compiled templates keyed by resolved identity.
///
/// Concurrent renders may race to populate the same entry; both compile the
/// same source and the last write wins, which is harmless.
#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: DashMap<TemplateId, CacheEntry>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the compiled template for `id`, fetching and compiling it on a miss.
    ///
    /// # Arguments
    ///
    /// * `id` - Resolved template identity
    /// * `provider` - Source provider consulted on a miss
    /// * `use_cache` - When `false`, always fetch and compile, and store nothing
    ///
    /// # Errors
    ///
    /// Provider failures and compile failures are returned as-is. A template
    /// that fails to compile is never cached.
    pub async fn get_or_compile(
        &self,
        id: &TemplateId,
        provider: &dyn SourceProvider,
        use_cache: bool,
    ) -> Result<CompiledTemplate, RenderError> {
        if use_cache {
            if let Some(entry) = self.entries.get(id) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Template cache hit for {}", id);
                return Ok(entry.template.clone());
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Fetching template source for {} (cache: {})", id, use_cache);

        let source = provider.get_template(id).await?;
        let template = CompiledTemplate::compile(id.clone(), source)?;

        if use_cache {
            self.entries.insert(
                id.clone(),
                CacheEntry {
                    template: template.clone(),
                    layout: None,
                },
            );
        }

        Ok(template)
    }

    /// Cached directive layout for the template `id`, if one was recorded.
    pub fn directive_layout(&self, id: &TemplateId) -> Option<CompiledTemplate> {
        self.entries.get(id).and_then(|entry| entry.layout.clone())
    }

    /// Remember the directive layout of a cached template.
    ///
    /// Has no effect when `id` is not cached.
    pub fn set_directive_layout(&self, id: &TemplateId, layout: CompiledTemplate) {
        if let Some(mut entry) = self.entries.get_mut(id) {
            entry.layout = Some(layout);
        }
    }

    pub fn get(&self, id: &TemplateId) -> Option<CacheEntry> {
        self.entries.get(id).map(|entry| entry.clone())
    }

    pub fn contains(&self, id: &TemplateId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries and reset statistics.
    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// `(hits, misses)` since creation or the last [`clear`](Self::clear).
    pub fn stats(&self) -> (usize, usize) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }

    /// Hit rate as a percentage.
    pub fn hit_rate(&self) -> f64 {
        let (hits, misses) = self.stats();
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}
