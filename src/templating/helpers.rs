//! Built-in helpers and the asynchronous helper adapter.
//!
//! - `{{#contentFor "name"}}...{{/contentFor}}` renders its body in the current
//!   context, appends it to the named block and emits nothing.
//! - `{{{block "name"}}}` emits the named block's fragments joined by newlines
//!   and clears the block.
//! - [`AsyncHelper`] wraps a future-returning function so that it emits a
//!   placeholder token which the pipeline later replaces with the resolved
//!   value. Resolved values are inserted verbatim (no HTML escaping).
//!
//! All three need the [`RenderScope`](super::scope::RenderScope) of the render
//! in progress and fail when evaluated outside
//! [`Engine::render`](crate::engine::Engine::render).

use std::sync::Arc;

use futures::future::BoxFuture;
use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext,
    RenderErrorReason, Renderable, StringOutput,
};
use serde_json::{Map, Value};

use super::scope::{self, RenderScope};

/// Signature of an asynchronous helper.
pub type AsyncHelperFn =
    dyn Fn(HelperArgs) -> BoxFuture<'static, anyhow::Result<String>> + Send + Sync;

/// Owned snapshot of a helper invocation's arguments.
///
/// Async helpers outlive the synchronous render pass, so they receive copies
/// of their positional and hash arguments instead of borrowed Handlebars values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HelperArgs {
    /// Name the helper was invoked under
    pub name: String,
    /// Positional parameters, in order
    pub params: Vec<Value>,
    /// `key=value` hash arguments
    pub hash: Map<String, Value>,
}

impl HelperArgs {
    fn from_helper(h: &Helper<'_>) -> Self {
        Self {
            name: h.name().to_string(),
            params: h.params().iter().map(|p| p.value().clone()).collect(),
            hash: h.hash().iter().map(|(k, v)| ((*k).to_string(), v.value().clone())).collect(),
        }
    }

    pub fn param(&self, index: usize) -> Option<&Value> {
        self.params.get(index)
    }

    pub fn param_str(&self, index: usize) -> Option<&str> {
        self.param(index).and_then(Value::as_str)
    }

    pub fn hash_str(&self, key: &str) -> Option<&str> {
        self.hash.get(key).and_then(Value::as_str)
    }
}

/// `{{#contentFor "name"}}...{{/contentFor}}`
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentForHelper;

impl HelperDef for ContentForHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        _out: &mut dyn Output,
    ) -> HelperResult {
        let name = block_name(h, "contentFor")?;
        let scope = require_scope("contentFor")?;

        let fragment = match h.template() {
            Some(body) => {
                let mut buf = StringOutput::new();
                body.render(r, ctx, rc, &mut buf)?;
                buf.into_string().map_err(|e| {
                    RenderErrorReason::Other(format!("contentFor produced invalid UTF-8: {e}"))
                })?
            }
            None => String::new(),
        };

        tracing::debug!("contentFor '{}' captured {} bytes", name, fragment.len());
        scope.blocks().content_for(name, fragment);
        Ok(())
    }
}

/// `{{{block "name"}}}`
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockHelper;

impl HelperDef for BlockHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let name = block_name(h, "block")?;
        let scope = require_scope("block")?;
        out.write(&scope.blocks().block(name))?;
        Ok(())
    }
}

/// Adapter routing an asynchronous helper through the render's
/// [`Waiter`](super::waiter::Waiter).
#[derive(Clone)]
pub struct AsyncHelper {
    f: Arc<AsyncHelperFn>,
}

impl AsyncHelper {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(HelperArgs) -> BoxFuture<'static, anyhow::Result<String>> + Send + Sync + 'static,
    {
        Self {
            f: Arc::new(f),
        }
    }
}

impl std::fmt::Debug for AsyncHelper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncHelper").finish_non_exhaustive()
    }
}

impl HelperDef for AsyncHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let scope = require_scope(h.name())?;
        let token = scope.waiter().resolve((self.f)(HelperArgs::from_helper(h)));
        out.write(&token)?;
        Ok(())
    }
}

/// Register `contentFor` and `block` on `registry`.
pub fn register_builtins(registry: &mut Handlebars<'_>) {
    registry.register_helper("contentFor", Box::new(ContentForHelper));
    registry.register_helper("block", Box::new(BlockHelper));
}

fn block_name<'a>(h: &'a Helper<'_>, helper: &'static str) -> Result<&'a str, RenderErrorReason> {
    let param = h.param(0).ok_or(RenderErrorReason::ParamNotFoundForIndex(helper, 0))?;
    param
        .value()
        .as_str()
        .ok_or_else(|| RenderErrorReason::Other(format!("{helper}: block name must be a string")))
}

fn require_scope(helper: &str) -> Result<Arc<RenderScope>, RenderErrorReason> {
    scope::current().ok_or_else(|| {
        RenderErrorReason::Other(format!("'{helper}' can only be used while rendering a view"))
    })
}
