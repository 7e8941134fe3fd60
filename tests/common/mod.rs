//! Common test utilities and fixtures for hbs-render integration tests
//!
//! This module consolidates the view trees and engines the scenarios share.

// Allow dead code because these utilities are used across different test files
// and not all utilities are used in every test file
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use hbs_render::provider::{KeyValueProvider, MemoryStore};
use hbs_render::test_utils::{CountingProvider, init_test_logging};
use hbs_render::{Engine, EngineConfig};
use tempfile::TempDir;
use tokio::fs;

/// A views directory on disk, removed when dropped.
pub struct TestViews {
    _temp_dir: TempDir,
    root: PathBuf,
}

impl TestViews {
    pub async fn new() -> Result<Self> {
        init_test_logging(None);
        let temp_dir = TempDir::new().context("Failed to create temp dir")?;
        let root = temp_dir.path().join("views");
        fs::create_dir_all(&root).await?;
        Ok(Self {
            _temp_dir: temp_dir,
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn partials_dir(&self) -> PathBuf {
        self.root.join("partials")
    }

    /// Write `content` to `relative` below the views root, creating parents.
    pub async fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub async fn write_partial(&self, name: &str, content: &str) -> Result<PathBuf> {
        self.write(&format!("partials/{name}.hbs"), content).await
    }

    /// Config rooted at this views directory with its partials directory.
    pub fn config(&self) -> EngineConfig {
        EngineConfig::new()
            .with_views(self.root.display().to_string())
            .with_partials_path(self.partials_dir())
    }

    pub fn engine(&self, config: EngineConfig) -> Result<Engine> {
        Ok(Engine::new(config)?)
    }
}

/// Key-value store seeded the way a Redis-backed deployment stores templates.
pub fn redis_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.set("hbsp:scripts", r#"<script src="jquery.js"></script>"#);
    store.set("hbst:mainLayout.hbs", "<html><title>{{title}}</title>{{{body}}}</html>");
    store.set(
        "hbst:fruitLayout.hbs",
        r#"<html>{{{block "fruit"}}}{{{body}}}{{> scripts}}</html>"#,
    );
    store.set("hbst:index.hbs", "<h1>Front page</h1>");
    store.set(
        "hbst:fruit.hbs",
        r#"{{#contentFor "fruit"}}<h2>{{fruit}}</h2>{{/contentFor}}<p>fruit page</p>"#,
    );
    store
}

pub fn redis_engine(config: EngineConfig) -> Result<Engine> {
    init_test_logging(None);
    Ok(Engine::builder().config(config).provider(KeyValueProvider::new(redis_store())).build()?)
}

/// Engine over a shared [`CountingProvider`] so tests can inspect fetch counts.
pub fn counting_engine(provider: &Arc<CountingProvider>, config: EngineConfig) -> Result<Engine> {
    init_test_logging(None);
    Ok(Engine::builder().config(config).shared_provider(provider.clone()).build()?)
}
