//! Compiled templates.

use std::sync::Arc;

use handlebars::{Context, Handlebars, RenderContext, Renderable, StringOutput, Template};

use super::identity::TemplateId;
use crate::core::CompileError;

/// A Handlebars template compiled from a single source.
///
/// Cloning is cheap; the parsed template and its source are shared.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    id: TemplateId,
    source: String,
    template: Template,
}

impl CompiledTemplate {
    /// Compile `source` for the template identified by `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] when the source is not valid Handlebars.
    pub fn compile(id: TemplateId, source: String) -> Result<Self, CompileError> {
        let template =
            Template::compile(&source).map_err(|e| CompileError::new(id.as_str(), e))?;
        Ok(Self {
            inner: Arc::new(Inner {
                id,
                source,
                template,
            }),
        })
    }

    pub fn id(&self) -> &TemplateId {
        &self.inner.id
    }

    /// Raw source the template was compiled from.
    pub fn source(&self) -> &str {
        &self.inner.source
    }

    /// Evaluate the template against `ctx` using the helpers and partials of
    /// `registry`.
    pub fn render(
        &self,
        registry: &Handlebars<'_>,
        ctx: &Context,
    ) -> Result<String, handlebars::RenderError> {
        let mut out = StringOutput::new();
        let mut rc = RenderContext::new(None);
        self.inner.template.render(registry, ctx, &mut rc, &mut out)?;
        out.into_string().map_err(|e| {
            handlebars::RenderErrorReason::Other(format!("template produced invalid UTF-8: {e}"))
                .into()
        })
    }
}
