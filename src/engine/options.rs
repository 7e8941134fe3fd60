//! Per-render options.

use serde_json::{Map, Value};

use crate::templating::layout::LayoutOption;

/// Options for a single [`Engine::render`](super::Engine::render) call.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Use the template cache and load partials only once.
    pub cache: bool,
    /// Layout requested for this render.
    pub layout: LayoutOption,
    /// Data passed to the template. `body` is overwritten when a layout is applied.
    pub data: Value,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            cache: false,
            layout: LayoutOption::Unset,
            data: Value::Object(Map::new()),
        }
    }
}

impl RenderOptions {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = LayoutOption::Named(layout.into());
        self
    }

    /// Render without a layout unless the template names one itself.
    pub fn without_layout(mut self) -> Self {
        self.layout = LayoutOption::Disabled;
        self
    }

    /// Split web-framework style locals into options and template data.
    ///
    /// `cache` and `layout` are read as options and stay in the data, so
    /// templates can still reference them. `layout: false`, `null` or `""`
    /// disables layouts, a string names one. Non-object locals are passed
    /// through as data unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use hbs_render::engine::RenderOptions;
    /// use hbs_render::templating::LayoutOption;
    /// use serde_json::json;
    ///
    /// let options = RenderOptions::from_locals(json!({
    ///     "fruit": "orange",
    ///     "layout": "fruitLayout",
    ///     "cache": true
    /// }));
    /// assert!(options.cache);
    /// assert_eq!(options.layout, LayoutOption::Named("fruitLayout".into()));
    /// assert_eq!(options.data["fruit"], "orange");
    /// assert_eq!(options.data["layout"], "fruitLayout");
    /// ```
    pub fn from_locals(locals: Value) -> Self {
        let Value::Object(map) = &locals else {
            return Self::new(locals);
        };

        let cache = map.get("cache").is_some_and(is_truthy);
        let layout = match map.get("layout") {
            None => LayoutOption::Unset,
            Some(Value::String(name)) if !name.is_empty() => LayoutOption::Named(name.clone()),
            Some(value) if is_truthy(value) => {
                tracing::warn!("Ignoring non-string layout option {}", value);
                LayoutOption::Unset
            }
            Some(_) => LayoutOption::Disabled,
        };

        Self {
            cache,
            layout,
            data: locals,
        }
    }
}

/// JavaScript-style truthiness, which is how locals have always been read.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Data for the layout pass: the caller's data with `body` set.
pub(crate) fn with_body(data: &Value, body: String) -> Value {
    let mut map = match data {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    map.insert("body".to_string(), Value::String(body));
    Value::Object(map)
}
