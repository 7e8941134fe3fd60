//! Filesystem template provider.

use std::path::{Path, PathBuf};

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::fs;

use super::{Partials, SourceProvider};
use crate::core::{ConfigError, ProviderError};
use crate::templating::identity::TemplateId;

/// Reads templates from disk.
///
/// Template identities are used as paths directly. Partials are the regular
/// files directly inside `partials_path`, each named by its file stem, so
/// `partials/scripts.hbs` is available as `{{> scripts}}`. Subdirectories are
/// not searched.
#[derive(Debug, Clone, Default)]
pub struct FileProvider {
    partials_path: Option<PathBuf>,
}

impl FileProvider {
    pub fn new(partials_path: Option<PathBuf>) -> Self {
        Self {
            partials_path,
        }
    }

    pub fn partials_path(&self) -> Option<&Path> {
        self.partials_path.as_deref()
    }

    async fn read_partials(dir: &Path) -> Result<Partials, ProviderError> {
        let location = dir.display().to_string();
        let mut entries =
            fs::read_dir(dir).await.map_err(|e| ProviderError::from_io(&location, e))?;

        let mut partials = Partials::new();
        while let Some(entry) =
            entries.next_entry().await.map_err(|e| ProviderError::storage(&location, e))?
        {
            let path = entry.path();
            let file_type =
                entry.file_type().await.map_err(|e| ProviderError::storage(&location, e))?;
            if !file_type.is_file() {
                continue;
            }

            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                tracing::warn!("Skipping partial with non UTF-8 name: {}", path.display());
                continue;
            };
            let source = fs::read_to_string(&path)
                .await
                .map_err(|e| ProviderError::storage(path.display().to_string(), e))?;
            partials.insert(name.to_string(), source);
        }

        tracing::debug!("Read {} partial(s) from {}", partials.len(), location);
        Ok(partials)
    }
}

impl SourceProvider for FileProvider {
    fn get_template<'a>(&'a self, id: &'a TemplateId) -> BoxFuture<'a, Result<String, ProviderError>> {
        async move {
            fs::read_to_string(Path::new(id.as_str()))
                .await
                .map_err(|e| ProviderError::from_io(id.as_str(), e))
        }
        .boxed()
    }

    fn get_partials(&self) -> BoxFuture<'_, Result<Partials, ProviderError>> {
        async move {
            match &self.partials_path {
                Some(dir) => Self::read_partials(dir).await,
                None => Err(ProviderError::not_found("<partials path not configured>")),
            }
        }
        .boxed()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match &self.partials_path {
            Some(dir) if dir.exists() && !dir.is_dir() => Err(ConfigError::InvalidProvider(
                format!("partials path {} is not a directory", dir.display()),
            )),
            _ => Ok(()),
        }
    }
}
