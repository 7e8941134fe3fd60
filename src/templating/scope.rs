//! Per-render state shared between the pipeline and helpers.
//!
//! Handlebars helpers are registered once on a registry shared by every
//! render, so they cannot own render-specific state. The pipeline creates one
//! [`RenderScope`] per render and publishes it with a tokio task-local while a
//! synchronous Handlebars pass runs; helpers pick it up with [`current`]. Both
//! passes of a render (body, then layout) run in the same scope, which is how
//! `contentFor` in a template reaches `block` in its layout without leaking
//! into concurrent renders.

use std::sync::Arc;

use super::blocks::BlockRegistry;
use super::waiter::Waiter;

tokio::task_local! {
    static CURRENT: Arc<RenderScope>;
}

#[derive(Debug, Default)]
pub struct RenderScope {
    blocks: BlockRegistry,
    waiter: Waiter,
}

impl RenderScope {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn blocks(&self) -> &BlockRegistry {
        &self.blocks
    }

    pub fn waiter(&self) -> &Waiter {
        &self.waiter
    }

    /// Run `f` with this scope visible to helpers.
    pub fn enter<R>(self: &Arc<Self>, f: impl FnOnce() -> R) -> R {
        CURRENT.sync_scope(Arc::clone(self), f)
    }
}

/// The scope of the render currently being evaluated, if any.
pub fn current() -> Option<Arc<RenderScope>> {
    CURRENT.try_with(Arc::clone).ok()
}
