//! Content blocks shared between a view and its layout

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use hbs_render::test_utils::CountingProvider;
use hbs_render::{EngineConfig, RenderOptions};
use serde_json::json;

use crate::common::{counting_engine, redis_engine};

#[tokio::test]
async fn test_fruit_block_and_partial_in_layout() -> Result<()> {
    let engine = redis_engine(EngineConfig::new())?;

    let html = engine
        .render_locals("fruit", json!({"fruit": "orange", "layout": "fruitLayout"}))
        .await?;

    assert_eq!(
        html,
        r#"<html><h2>orange</h2><p>fruit page</p><script src="jquery.js"></script></html>"#
    );
    Ok(())
}

#[tokio::test]
async fn test_fragments_join_with_newlines() -> Result<()> {
    let provider = Arc::new(
        CountingProvider::new()
            .with_template(
                "page.hbs",
                r#"{{!< layout}}{{#contentFor "css"}}a.css{{/contentFor}}{{#contentFor "css"}}b.css{{/contentFor}}page"#,
            )
            .with_template("layout.hbs", r#"{{{block "css"}}}|{{{body}}}"#),
    );
    let engine = counting_engine(&provider, EngineConfig::new())?;

    assert_eq!(engine.render("page", RenderOptions::default()).await?, "a.css\nb.css|page");
    Ok(())
}

#[tokio::test]
async fn test_block_is_drained_after_use() -> Result<()> {
    let provider = Arc::new(
        CountingProvider::new()
            .with_template("page.hbs", r#"{{!< layout}}{{#contentFor "x"}}one{{/contentFor}}"#)
            .with_template("layout.hbs", r#"[{{{block "x"}}}][{{{block "x"}}}]"#),
    );
    let engine = counting_engine(&provider, EngineConfig::new())?;

    assert_eq!(engine.render("page", RenderOptions::default()).await?, "[one][]");
    Ok(())
}

#[tokio::test]
async fn test_unknown_block_renders_empty() -> Result<()> {
    let provider = Arc::new(
        CountingProvider::new()
            .with_template("page.hbs", "{{!< layout}}p")
            .with_template("layout.hbs", r#"<{{{block "missing"}}}>{{{body}}}"#),
    );
    let engine = counting_engine(&provider, EngineConfig::new())?;

    assert_eq!(engine.render("page", RenderOptions::default()).await?, "<>p");
    Ok(())
}

#[tokio::test]
async fn test_blocks_do_not_leak_between_renders() -> Result<()> {
    let provider = Arc::new(
        CountingProvider::new()
            .with_template("first.hbs", r#"{{!< layout}}{{#contentFor "side"}}left{{/contentFor}}1"#)
            .with_template("second.hbs", "{{!< layout}}2")
            .with_template("layout.hbs", r#"{{{block "side"}}}:{{{body}}}"#),
    );
    let engine = counting_engine(&provider, EngineConfig::new())?;

    assert_eq!(engine.render("first", RenderOptions::default()).await?, "left:1");
    assert_eq!(engine.render("second", RenderOptions::default()).await?, ":2");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_renders_keep_their_own_blocks() -> Result<()> {
    let mut provider = CountingProvider::new()
        .with_template("layout.hbs", r#"{{{block "side"}}}:{{{body}}}"#)
        .with_latency(Duration::from_millis(5));
    for i in 0..8 {
        provider = provider.with_template(
            &format!("view{i}.hbs"),
            &format!(r#"{{{{!< layout}}}}{{{{#contentFor "side"}}}}side{i}{{{{/contentFor}}}}body{i}"#),
        );
    }
    let engine = Arc::new(counting_engine(&Arc::new(provider), EngineConfig::new())?);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move {
                engine.render(&format!("view{i}"), RenderOptions::default().with_cache(true)).await
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await??, format!("side{i}:body{i}"));
    }
    Ok(())
}
