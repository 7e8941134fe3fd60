//! Template identities.
//!
//! Every template and layout is keyed by a fully resolved, `/`-separated
//! identity. Resolution is purely lexical: `.` and `..` segments are collapsed
//! without touching the filesystem, so the same rules apply to filesystem paths
//! and to key-value or document-store keys.

use std::fmt;

/// Fully resolved identity of a template or layout source.
///
/// Two spellings that resolve to the same location produce equal identities,
/// which is what the [`TemplateCache`](super::cache::TemplateCache) keys on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(String);

impl TemplateId {
    /// Resolve `name` against `base_dir`, appending `extname` when `name` has
    /// no extension.
    ///
    /// An absolute `name` (leading `/`) ignores `base_dir`. Backslashes are
    /// treated as separators.
    ///
    /// # Examples
    ///
    /// ```
    /// use hbs_render::templating::TemplateId;
    ///
    /// let id = TemplateId::resolve("/srv/views/pages", "../layouts/main", ".hbs");
    /// assert_eq!(id.as_str(), "/srv/views/layouts/main.hbs");
    ///
    /// let id = TemplateId::resolve("", "index.html", ".hbs");
    /// assert_eq!(id.as_str(), "index.html");
    /// ```
    pub fn resolve(base_dir: &str, name: &str, extname: &str) -> Self {
        let name = name.replace('\\', "/");
        let joined = if name.starts_with('/') || base_dir.is_empty() {
            name
        } else {
            format!("{}/{}", base_dir.replace('\\', "/"), name)
        };

        let mut normalized = normalize(&joined);
        if extension_of(&normalized).is_none() && !extname.is_empty() {
            normalized.push_str(extname);
        }
        Self(normalized)
    }

    /// Wrap an already resolved identity without normalizing it.
    pub fn from_resolved(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory part of the identity, `""` for a bare name.
    pub fn dir(&self) -> &str {
        match self.0.rfind('/') {
            Some(0) => "/",
            Some(idx) => &self.0[..idx],
            None => "",
        }
    }

    /// Final segment of the identity.
    pub fn file_name(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// Extension including the leading dot, if any.
    pub fn extension(&self) -> Option<&str> {
        extension_of(&self.0)
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TemplateId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                // `..` above the root of an absolute path stays at the root
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Same rules as Node's `path.extname`: a leading dot alone is not an extension.
fn extension_of(path: &str) -> Option<&str> {
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rfind('.') {
        Some(0) | None => None,
        Some(idx) if idx + 1 == file.len() => None,
        Some(idx) => Some(&file[idx..]),
    }
}
