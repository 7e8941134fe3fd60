//! Handlebars templating building blocks for the render pipeline.
//!
//! This module holds everything the [`Engine`](crate::engine::Engine) composes
//! into a render: template identities, compiled templates and their cache,
//! layout selection, content blocks and asynchronous helpers.
//!
//! # Overview
//!
//! A view is rendered in up to two passes. The body pass renders the view
//! itself; the layout pass renders a wrapping template with the body available
//! as `{{{body}}}`. Between the passes, and after the second one, pending
//! async helper results are substituted into the output.
//!
//! # Template Identity
//!
//! Views and layouts are addressed by a [`TemplateId`]: the lexically resolved
//! path of `name` joined onto a base directory, with the configured extension
//! appended when `name` has none. Layouts named by a view resolve relative to
//! the directory of that view, the default layout relative to the views
//! directory.
//!
//! # Layouts
//!
//! A layout is chosen in this order (see [`layout::choose`]):
//!
//! 1. A `{{!< name}}` directive in the template source
//! 2. A layout named in the render options
//! 3. The configured default layout, unless layouts were disabled
//!
//! The directive wins even when the caller disabled layouts.
//!
//! # Built-in Helpers
//!
//! - `{{#contentFor "name"}}...{{/contentFor}}` appends its rendered body to a
//!   named block and emits nothing
//! - `{{{block "name"}}}` emits the block's fragments joined by newlines and
//!   empties it
//!
//! ```handlebars
//! {{!< layout}}
//! {{#contentFor "pageScripts"}}<script src="/page.js"></script>{{/contentFor}}
//! <h1>{{title}}</h1>
//! ```
//!
//! ```handlebars
//! <html><body>{{{body}}}{{{block "pageScripts"}}}</body></html>
//! ```
//!
//! # Async Helpers
//!
//! Handlebars renders synchronously. An [`AsyncHelper`] therefore starts its
//! computation on the [`Waiter`] of the current render and writes a unique
//! placeholder token in its place. Once the pass finishes the pipeline awaits
//! every computation and replaces the tokens with the results. A computation
//! that fails is logged and replaced with an empty string.
//!
//! # Render Scope
//!
//! Blocks and pending computations belong to one render. They live in a
//! [`RenderScope`] that the pipeline installs around each pass, so concurrent
//! renders never observe each other's blocks or results.

pub mod blocks;
pub mod cache;
pub mod compiled;
pub mod helpers;
pub mod identity;
pub mod layout;
pub mod scope;
pub mod waiter;

pub use blocks::BlockRegistry;
pub use cache::{CacheEntry, TemplateCache};
pub use compiled::CompiledTemplate;
pub use helpers::{AsyncHelper, HelperArgs};
pub use identity::TemplateId;
pub use layout::LayoutOption;
pub use scope::RenderScope;
pub use waiter::Waiter;
