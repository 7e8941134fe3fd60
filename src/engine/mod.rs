//! The view engine and its render pipeline.
//!
//! An [`Engine`] is configured once and then renders views on demand. Each
//! [`Engine::render`] call runs these steps in order, stopping at the first
//! failure:
//!
//! 1. **Load partials** from the provider, once per engine while caching is
//!    enabled, on every render otherwise.
//! 2. **Load the default layout**, if one is configured.
//! 3. **Resolve and compile** the view through the [`TemplateCache`] and pick
//!    its layout (see [`templating::layout`](crate::templating::layout)).
//! 4. **Render the body** with the caller's data. Async helpers leave
//!    placeholder tokens behind.
//! 5. **Substitute the body**: wait for the async helpers and replace their
//!    tokens. Without a layout this is the result.
//! 6. **Render the layout** with the body stored under `body`.
//! 7. **Substitute the layout**: a second wait-and-replace pass for helpers the
//!    layout itself invoked.
//!
//! Steps 4 to 7 share one [`RenderScope`], which is how `contentFor` in a view
//! reaches `block` in its layout. Scopes are never shared between renders.
//!
//! # Example
//!
//! ```rust,no_run
//! use hbs_render::config::EngineConfig;
//! use hbs_render::engine::{Engine, RenderOptions};
//! use hbs_render::provider::{KeyValueProvider, MemoryStore};
//! use serde_json::json;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = MemoryStore::new();
//! store.set("hbst:index.hbs", "<h1>Front page</h1>");
//! store.set("hbst:mainLayout.hbs", "<html><title>{{title}}</title>{{{body}}}</html>");
//!
//! let engine = Engine::builder()
//!     .config(EngineConfig::new().with_default_layout("mainLayout"))
//!     .provider(KeyValueProvider::new(store))
//!     .build()?;
//!
//! let html = engine
//!     .render("index", RenderOptions::new(json!({"title": "redis example"})).with_cache(true))
//!     .await?;
//! assert_eq!(html, "<html><title>redis example</title><h1>Front page</h1></html>");
//! # Ok(())
//! # }
//! ```

pub mod options;

pub use options::RenderOptions;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::future::BoxFuture;
use handlebars::{Context, Handlebars, HelperDef};
use serde_json::Value;

use crate::config::EngineConfig;
use crate::core::{CompileError, ConfigError, RenderError};
use crate::provider::{FileProvider, Partials, SourceProvider};
use crate::templating::cache::TemplateCache;
use crate::templating::compiled::CompiledTemplate;
use crate::templating::helpers::{self, AsyncHelper, HelperArgs};
use crate::templating::identity::TemplateId;
use crate::templating::layout::{self, LayoutChoice};
use crate::templating::scope::RenderScope;
use crate::templating::waiter::{has_placeholders, substitute};
use options::with_body;

/// Handlebars view engine with layouts, content blocks and async helpers.
pub struct Engine {
    config: EngineConfig,
    provider: Arc<dyn SourceProvider>,
    registry: RwLock<Handlebars<'static>>,
    cache: TemplateCache,
    default_layout: RwLock<Option<CompiledTemplate>>,
    partials_loaded: AtomicBool,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .field("partials_loaded", &self.partials_loaded)
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Engine with `config` and the default filesystem provider.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::builder().config(config).build()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    /// Identity a view name resolves to.
    pub fn resolve_view(&self, name: &str) -> TemplateId {
        TemplateId::resolve(&self.config.views, name, &self.config.extname)
    }

    /// Render the view `name`.
    ///
    /// # Arguments
    ///
    /// * `name` - View name, resolved against the configured `views` directory
    ///   with the configured extension appended when missing
    /// * `options` - Cache flag, layout request and template data
    ///
    /// # Errors
    ///
    /// Returns an error when a source cannot be fetched, a source does not
    /// compile or Handlebars fails while rendering. Failing async helpers are
    /// not errors; their output is empty.
    pub async fn render(&self, name: &str, options: RenderOptions) -> Result<String, RenderError> {
        let id = self.resolve_view(name);
        tracing::debug!(
            "Rendering {} (cache: {}, layout: {:?})",
            id,
            options.cache,
            options.layout
        );

        self.load_partials(options.cache).await?;
        let default_layout = self.load_default_layout(options.cache).await?;
        let template = self.cache.get_or_compile(&id, &*self.provider, options.cache).await?;
        let layout = self.resolve_layout(&template, &options, default_layout).await?;

        let scope = RenderScope::new();
        let raw = self.render_pass(&template, &options.data, &scope)?;
        let mut values = scope.waiter().done().await;
        let body = substitute(&raw, &values);

        let Some(layout) = layout else {
            return Ok(body);
        };

        tracing::debug!("Applying layout {} to {}", layout.id(), id);
        let data = with_body(&options.data, body);
        let raw = self.render_pass(&layout, &data, &scope)?;
        // Block fragments captured in the body pass still hold body-pass tokens.
        values.extend(scope.waiter().done().await);
        let html = substitute(&raw, &values);
        if has_placeholders(&html) {
            tracing::warn!("Unresolved async helper placeholder left in {}", id);
        }
        Ok(html)
    }

    /// Render with web-framework style locals; see [`RenderOptions::from_locals`].
    pub async fn render_locals(&self, name: &str, locals: Value) -> Result<String, RenderError> {
        self.render(name, RenderOptions::from_locals(locals)).await
    }

    /// Register a synchronous Handlebars helper.
    pub fn register_helper(&self, name: &str, helper: Box<dyn HelperDef + Send + Sync + 'static>) {
        self.registry_mut().register_helper(name, helper);
    }

    /// Register a helper whose value is computed asynchronously.
    ///
    /// The helper emits a placeholder during the synchronous render pass; the
    /// placeholder is replaced once the future settles. A failed future
    /// renders as an empty string.
    pub fn register_async_helper<F>(&self, name: &str, f: F)
    where
        F: Fn(HelperArgs) -> BoxFuture<'static, anyhow::Result<String>> + Send + Sync + 'static,
    {
        self.register_helper(name, Box::new(AsyncHelper::new(f)));
    }

    /// Register a partial in addition to the provider's partials.
    pub fn register_partial(&self, name: &str, source: &str) -> Result<(), CompileError> {
        self.registry_mut().register_partial(name, source).map_err(|e| CompileError::new(name, e))
    }

    /// Forget compiled templates, the default layout and loaded partials so
    /// the next render reads everything from the provider again.
    pub fn clear_cache(&self) {
        self.cache.clear();
        *self.default_layout.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.partials_loaded.store(false, Ordering::Release);
        tracing::debug!("Cleared template cache");
    }

    async fn load_partials(&self, use_cache: bool) -> Result<(), RenderError> {
        if use_cache && self.partials_loaded.load(Ordering::Acquire) {
            return Ok(());
        }

        let partials = match self.provider.get_partials().await {
            Ok(partials) => partials,
            Err(e) if e.is_not_found() => {
                tracing::debug!("No partials available: {}", e);
                Partials::new()
            }
            Err(e) => return Err(e.into()),
        };

        {
            let mut registry = self.registry_mut();
            for (name, source) in &partials {
                registry
                    .register_partial(name, source)
                    .map_err(|e| CompileError::new(name.as_str(), e))?;
            }
        }
        tracing::debug!("Registered {} partial(s)", partials.len());

        if use_cache {
            self.partials_loaded.store(true, Ordering::Release);
        }
        Ok(())
    }

    async fn load_default_layout(
        &self,
        use_cache: bool,
    ) -> Result<Option<CompiledTemplate>, RenderError> {
        let Some(name) = self.config.default_layout.as_deref() else {
            return Ok(None);
        };

        if use_cache {
            let loaded = self.default_layout.read().unwrap_or_else(PoisonError::into_inner).clone();
            if loaded.is_some() {
                return Ok(loaded);
            }
        }

        let id = self.resolve_view(name);
        let layout = self.cache.get_or_compile(&id, &*self.provider, use_cache).await?;
        *self.default_layout.write().unwrap_or_else(PoisonError::into_inner) = Some(layout.clone());
        Ok(Some(layout))
    }

    async fn resolve_layout(
        &self,
        template: &CompiledTemplate,
        options: &RenderOptions,
        default_layout: Option<CompiledTemplate>,
    ) -> Result<Option<CompiledTemplate>, RenderError> {
        if options.cache {
            if let Some(layout) = self.cache.directive_layout(template.id()) {
                return Ok(Some(layout));
            }
        }

        match layout::choose(template.source(), &options.layout, default_layout.is_some()) {
            LayoutChoice::Directive(name) => {
                let layout = self.load_layout(template.id(), name, options.cache).await?;
                if options.cache {
                    self.cache.set_directive_layout(template.id(), layout.clone());
                }
                Ok(Some(layout))
            }
            LayoutChoice::Named(name) => {
                self.load_layout(template.id(), name, options.cache).await.map(Some)
            }
            LayoutChoice::Default => Ok(default_layout),
            LayoutChoice::None => Ok(None),
        }
    }

    /// Load a layout named relative to the directory of `template_id`.
    async fn load_layout(
        &self,
        template_id: &TemplateId,
        name: &str,
        use_cache: bool,
    ) -> Result<CompiledTemplate, RenderError> {
        let id = TemplateId::resolve(template_id.dir(), name, &self.config.extname);
        self.cache.get_or_compile(&id, &*self.provider, use_cache).await
    }

    fn render_pass(
        &self,
        template: &CompiledTemplate,
        data: &Value,
        scope: &Arc<RenderScope>,
    ) -> Result<String, RenderError> {
        let ctx = Context::from(data.clone());
        let registry = self.registry();
        scope.enter(|| template.render(&registry, &ctx)).map_err(|source| RenderError::Template {
            id: template.id().clone(),
            source,
        })
    }

    fn registry(&self) -> RwLockReadGuard<'_, Handlebars<'static>> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn registry_mut(&self) -> RwLockWriteGuard<'_, Handlebars<'static>> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Builder for [`Engine`]. Everything is validated in [`build`](Self::build).
#[derive(Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    provider: Option<Arc<dyn SourceProvider>>,
    registry: Option<Handlebars<'static>>,
    helpers: Vec<(String, Box<dyn HelperDef + Send + Sync + 'static>)>,
    partials: Vec<(String, String)>,
}

impl EngineBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Source provider. Defaults to a [`FileProvider`] reading partials from
    /// the configured `partials_path`.
    pub fn provider(self, provider: impl SourceProvider + 'static) -> Self {
        self.shared_provider(Arc::new(provider))
    }

    pub fn shared_provider(mut self, provider: Arc<dyn SourceProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Start from an existing Handlebars instance instead of a fresh one.
    ///
    /// Its helpers, partials and settings are kept. `contentFor` and `block`
    /// are registered on top, as are helpers and partials added to this builder.
    pub fn registry(mut self, registry: Handlebars<'static>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn helper(mut self, name: &str, helper: impl HelperDef + Send + Sync + 'static) -> Self {
        self.helpers.push((name.to_string(), Box::new(helper)));
        self
    }

    pub fn async_helper<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(HelperArgs) -> BoxFuture<'static, anyhow::Result<String>> + Send + Sync + 'static,
    {
        self.helper(name, AsyncHelper::new(f))
    }

    pub fn partial(mut self, name: &str, source: impl Into<String>) -> Self {
        self.partials.push((name.to_string(), source.into()));
        self
    }

    /// Validate the configuration and provider and build the engine.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for invalid options, a provider that fails its
    /// [`validate`](SourceProvider::validate) check, or a partial that does
    /// not compile.
    pub fn build(self) -> Result<Engine, ConfigError> {
        self.config.validate()?;

        let provider = match self.provider {
            Some(provider) => provider,
            None => Arc::new(FileProvider::new(self.config.partials_path.clone())),
        };
        provider.validate()?;

        let mut registry = self.registry.unwrap_or_default();
        helpers::register_builtins(&mut registry);
        for (name, helper) in self.helpers {
            registry.register_helper(&name, helper);
        }
        for (name, source) in &self.partials {
            registry.register_partial(name, source).map_err(|e| CompileError::new(name.as_str(), e))?;
        }

        tracing::debug!(
            "Built view engine (extname: {}, default layout: {:?})",
            self.config.extname,
            self.config.default_layout
        );

        Ok(Engine {
            config: self.config,
            provider,
            registry: RwLock::new(registry),
            cache: TemplateCache::new(),
            default_layout: RwLock::new(None),
            partials_loaded: AtomicBool::new(false),
        })
    }
}
