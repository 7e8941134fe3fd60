//! Template cache and partial reload behavior

use std::sync::Arc;

use anyhow::Result;
use hbs_render::test_utils::CountingProvider;
use hbs_render::{EngineConfig, RenderOptions};
use serde_json::json;

use crate::common::counting_engine;

fn provider() -> Arc<CountingProvider> {
    Arc::new(
        CountingProvider::new()
            .with_template("views/index.hbs", "<h1>{{title}}</h1>{{> footer}}")
            .with_template("views/main.hbs", "<body>{{{body}}}</body>")
            .with_template("views/page.hbs", "{{!< side}}page")
            .with_template("views/side.hbs", "<aside>{{{body}}}</aside>")
            .with_partial("footer", "<footer/>"),
    )
}

fn config() -> EngineConfig {
    EngineConfig::new().with_views("views").with_default_layout("main")
}

#[tokio::test]
async fn test_cached_renders_fetch_once() -> Result<()> {
    let provider = provider();
    let engine = counting_engine(&provider, config())?;
    let options = RenderOptions::new(json!({"title": "Home"})).with_cache(true);

    let first = engine.render("index", options.clone()).await?;
    let second = engine.render("index", options).await?;

    assert_eq!(first, "<body><h1>Home</h1><footer/></body>");
    assert_eq!(first, second);
    assert_eq!(provider.template_fetches("views/index.hbs"), 1);
    assert_eq!(provider.template_fetches("views/main.hbs"), 1);
    assert_eq!(provider.partial_fetches(), 1);
    Ok(())
}

#[tokio::test]
async fn test_uncached_renders_fetch_every_time() -> Result<()> {
    let provider = provider();
    let engine = counting_engine(&provider, config())?;

    engine.render("index", RenderOptions::default()).await?;
    provider.set_template("views/index.hbs", "<h2>{{title}}</h2>{{> footer}}");
    provider.set_partial("footer", "<footer>v2</footer>");
    let html = engine.render("index", RenderOptions::new(json!({"title": "Fresh"}))).await?;

    assert_eq!(html, "<body><h2>Fresh</h2><footer>v2</footer></body>");
    assert_eq!(provider.template_fetches("views/index.hbs"), 2);
    assert_eq!(provider.template_fetches("views/main.hbs"), 2);
    assert_eq!(provider.partial_fetches(), 2);
    assert!(engine.cache().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_cached_source_survives_provider_change() -> Result<()> {
    let provider = provider();
    let engine = counting_engine(&provider, config())?;
    let cached = RenderOptions::new(json!({"title": "T"})).with_cache(true);

    engine.render("index", cached.clone()).await?;
    provider.set_template("views/index.hbs", "changed");

    assert_eq!(engine.render("index", cached).await?, "<body><h1>T</h1><footer/></body>");
    Ok(())
}

#[tokio::test]
async fn test_directive_layout_is_memoized() -> Result<()> {
    let provider = provider();
    let engine = counting_engine(&provider, config())?;
    let cached = RenderOptions::default().with_cache(true);

    assert_eq!(engine.render("page", cached.clone()).await?, "<aside>page</aside>");
    assert_eq!(engine.render("page", cached).await?, "<aside>page</aside>");

    assert_eq!(provider.template_fetches("views/side.hbs"), 1);
    let id = engine.resolve_view("page");
    assert!(engine.cache().directive_layout(&id).is_some());
    Ok(())
}

#[tokio::test]
async fn test_clear_cache_reloads_everything() -> Result<()> {
    let provider = provider();
    let engine = counting_engine(&provider, config())?;
    let cached = RenderOptions::new(json!({"title": "T"})).with_cache(true);

    engine.render("index", cached.clone()).await?;
    provider.set_template("views/main.hbs", "<main>{{{body}}}</main>");
    engine.clear_cache();

    assert_eq!(engine.render("index", cached).await?, "<main><h1>T</h1><footer/></main>");
    assert_eq!(provider.partial_fetches(), 2);
    Ok(())
}

#[tokio::test]
async fn test_cache_stats_track_hits() -> Result<()> {
    let provider = provider();
    let engine = counting_engine(&provider, config().with_default_layout("main"))?;
    let cached = RenderOptions::default().with_cache(true).without_layout();

    engine.render("index", cached.clone()).await?;
    engine.render("index", cached).await?;

    let (hits, misses) = engine.cache().stats();
    assert!(hits >= 1);
    assert!(misses >= 1);
    assert!(engine.cache().contains(&engine.resolve_view("index")));
    Ok(())
}
