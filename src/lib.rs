//! hbs-render - Handlebars view rendering with layouts, blocks and async helpers
//!
//! A view engine that renders named Handlebars templates the way web
//! frameworks expect: a view is wrapped in a layout, views push content into
//! named blocks of their layout, and helpers may compute their values
//! asynchronously. Template sources come from a pluggable provider.
//!
//! # Architecture Overview
//!
//! - An [`Engine`] is configured once from an [`EngineConfig`] and a
//!   [`SourceProvider`], then renders views on demand
//! - Compiled templates and layouts are cached per resolved identity, and the
//!   cache can be bypassed per render for development reloads
//! - Each render runs in its own scope holding content blocks and pending
//!   async helper results
//!
//! ## Key Features
//!
//! - **Layouts**: `{{!< layout}}` directives, per-render layouts and a default layout
//! - **Blocks**: `{{#contentFor "name"}}` in views, `{{{block "name"}}}` in layouts
//! - **Async helpers**: placeholder tokens replaced once futures resolve
//! - **Providers**: filesystem, key-value store and document store sources
//!
//! # Core Modules
//!
//! - [`engine`] - The view engine, its builder and the render pipeline
//! - [`templating`] - Identities, compiled templates, cache, layouts, blocks, async helpers
//! - [`provider`] - Template source providers
//! - [`config`] - Engine configuration and TOML loading
//! - [`core`] - Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use hbs_render::{Engine, EngineConfig, RenderOptions};
//! use serde_json::json;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let engine = Engine::new(
//!     EngineConfig::new()
//!         .with_views("views")
//!         .with_partials_path("views/partials")
//!         .with_default_layout("layouts/main"),
//! )?;
//!
//! let html = engine
//!     .render_locals("index", json!({"title": "Home", "cache": true}))
//!     .await?;
//! println!("{html}");
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File
//!
//! ```toml
//! extname = ".hbs"
//! views = "views"
//! default_layout = "layouts/main"
//! partials_path = "views/partials"
//! ```

pub mod config;
pub mod core;
pub mod engine;
pub mod provider;
pub mod templating;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::EngineConfig;
pub use core::{AsyncHelperError, CompileError, ConfigError, ProviderError, RenderError};
pub use engine::{Engine, EngineBuilder, RenderOptions};
pub use provider::{DocumentProvider, FileProvider, KeyValueProvider, SourceProvider};
pub use templating::{HelperArgs, LayoutOption, TemplateId};
