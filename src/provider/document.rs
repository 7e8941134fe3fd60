//! Document store template provider.
//!
//! Each template is a document `{ name, is_partial, text }`. View identities
//! are mapped to document names by stripping the configured view path, so with
//! `view_path = "views"` the identity `views/pages/home.hbs` is looked up as
//! `pages/home.hbs`.

use std::sync::{PoisonError, RwLock};

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use super::{Partials, SourceProvider};
use crate::core::ProviderError;
use crate::templating::identity::TemplateId;

/// A stored template or partial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDocument {
    pub name: String,
    #[serde(default)]
    pub is_partial: bool,
    pub text: String,
}

impl TemplateDocument {
    pub fn template(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_partial: false,
            text: text.into(),
        }
    }

    pub fn partial(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_partial: true,
            text: text.into(),
        }
    }
}

/// Query interface the provider needs from a document database.
pub trait DocumentStore: Send + Sync {
    fn find_by_name<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<Option<TemplateDocument>>>;

    fn find_partials(&self) -> BoxFuture<'_, anyhow::Result<Vec<TemplateDocument>>>;
}

/// In-process [`DocumentStore`]. Inserting a document with an existing name replaces it.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<Vec<TemplateDocument>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, document: TemplateDocument) {
        let mut documents = self.documents.write().unwrap_or_else(PoisonError::into_inner);
        documents.retain(|existing| existing.name != document.name);
        documents.push(document);
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn find_by_name<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<Option<TemplateDocument>>> {
        let found = self
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|doc| doc.name == name)
            .cloned();
        futures::future::ready(Ok(found)).boxed()
    }

    fn find_partials(&self) -> BoxFuture<'_, anyhow::Result<Vec<TemplateDocument>>> {
        let partials: Vec<TemplateDocument> = self
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|doc| doc.is_partial)
            .cloned()
            .collect();
        futures::future::ready(Ok(partials)).boxed()
    }
}

/// Provider backed by a [`DocumentStore`].
#[derive(Debug)]
pub struct DocumentProvider<S> {
    store: S,
    view_path: String,
}

impl<S: DocumentStore> DocumentProvider<S> {
    pub fn new(store: S, view_path: impl Into<String>) -> Self {
        Self {
            store,
            view_path: view_path.into(),
        }
    }

    /// Document name for a view identity.
    pub fn document_name<'a>(&self, id: &'a TemplateId) -> &'a str {
        let view_path = self.view_path.trim_end_matches('/');
        if view_path.is_empty() {
            return id.as_str();
        }
        id.as_str()
            .strip_prefix(view_path)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(id.as_str())
    }

    async fn fetch_template(&self, id: &TemplateId) -> Result<String, ProviderError> {
        let name = self.document_name(id);
        match self.store.find_by_name(name).await {
            Ok(Some(document)) => Ok(document.text),
            Ok(None) => Err(ProviderError::not_found(id.as_str())),
            Err(e) => Err(ProviderError::storage(id.as_str(), e)),
        }
    }

    async fn fetch_partials(&self) -> Result<Partials, ProviderError> {
        let documents =
            self.store.find_partials().await.map_err(|e| ProviderError::storage("partials", e))?;
        Ok(documents.into_iter().map(|doc| (doc.name, doc.text)).collect())
    }
}

impl<S: DocumentStore> SourceProvider for DocumentProvider<S> {
    fn get_template<'a>(&'a self, id: &'a TemplateId) -> BoxFuture<'a, Result<String, ProviderError>> {
        self.fetch_template(id).boxed()
    }

    fn get_partials(&self) -> BoxFuture<'_, Result<Partials, ProviderError>> {
        self.fetch_partials().boxed()
    }
}
