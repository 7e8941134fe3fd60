//! Layout selection.
//!
//! A layout wraps a template's rendered output through the reserved `body`
//! key. The layout for a render comes from the first of these that applies:
//!
//! 1. A `{{!< name}}` directive in the template source. The directive is a
//!    Handlebars comment, so it renders as nothing.
//! 2. The render's [`LayoutOption`]. [`LayoutOption::Disabled`] turns layouts
//!    off for the render, including the configured default.
//! 3. The engine's configured default layout.
//!
//! A directive wins even over [`LayoutOption::Disabled`].
//!
//! Valid directives:
//!
//! ```text
//! {{!< foo}}                      foo.hbs next to the template
//! {{!< ../layouts/default}}       default.hbs in a sibling layouts directory
//! {{!< ../layouts/default.html}}  explicit extension
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static LAYOUT_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{!<\s+([A-Za-z0-9._\-/]+)\s*\}\}").expect("layout directive pattern is valid")
});

/// Per-render layout request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutOption {
    /// No preference; fall back to the default layout.
    #[default]
    Unset,
    /// Render without any layout, suppressing the default.
    Disabled,
    /// Use this layout, resolved relative to the template's directory.
    Named(String),
}

/// Which source supplies the layout for a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutChoice<'a> {
    Directive(&'a str),
    Named(&'a str),
    Default,
    None,
}

/// Extract the layout name from the first `{{!< name}}` directive in `source`.
pub fn find_directive(source: &str) -> Option<&str> {
    LAYOUT_DIRECTIVE
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Apply the layout priority rules to a template source and a render option.
///
/// `has_default` tells whether the engine has a default layout configured.
pub fn choose<'a>(source: &'a str, option: &'a LayoutOption, has_default: bool) -> LayoutChoice<'a> {
    if let Some(name) = find_directive(source) {
        return LayoutChoice::Directive(name);
    }

    match option {
        LayoutOption::Named(name) => LayoutChoice::Named(name),
        LayoutOption::Disabled => LayoutChoice::None,
        LayoutOption::Unset if has_default => LayoutChoice::Default,
        LayoutOption::Unset => LayoutChoice::None,
    }
}
