//! Failure propagation from providers, compilation and rendering

use std::sync::Arc;

use anyhow::Result;
use hbs_render::test_utils::CountingProvider;
use hbs_render::{EngineConfig, RenderError, RenderOptions};

use crate::common::counting_engine;

#[tokio::test]
async fn test_missing_view_is_not_found() -> Result<()> {
    let provider = Arc::new(CountingProvider::new());
    let engine = counting_engine(&provider, EngineConfig::new())?;

    let err = engine.render("nowhere", RenderOptions::default()).await.expect_err("missing view");
    assert!(err.is_not_found());
    assert!(matches!(err, RenderError::Provider(_)));
    Ok(())
}

#[tokio::test]
async fn test_missing_named_layout_fails_render() -> Result<()> {
    let provider = Arc::new(CountingProvider::new().with_template("page.hbs", "p"));
    let engine = counting_engine(&provider, EngineConfig::new())?;

    let err = engine
        .render("page", RenderOptions::default().with_layout("ghost"))
        .await
        .expect_err("missing layout");
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn test_storage_failure_is_not_swallowed() -> Result<()> {
    let provider = Arc::new(CountingProvider::new().with_template("page.hbs", "p"));
    provider.set_storage_failure(true);
    let engine = counting_engine(&provider, EngineConfig::new())?;

    let err = engine.render("page", RenderOptions::default()).await.expect_err("storage down");
    assert!(matches!(err, RenderError::Provider(_)));
    assert!(!err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn test_missing_partial_set_is_empty() -> Result<()> {
    let provider = Arc::new(CountingProvider::new().with_template("page.hbs", "ok").without_partials());
    let engine = counting_engine(&provider, EngineConfig::new())?;

    assert_eq!(engine.render("page", RenderOptions::default()).await?, "ok");
    Ok(())
}

#[tokio::test]
async fn test_compile_error_names_template() -> Result<()> {
    let provider = Arc::new(CountingProvider::new().with_template("broken.hbs", "{{#if x}}open"));
    let engine = counting_engine(&provider, EngineConfig::new())?;

    let err = engine.render("broken", RenderOptions::default()).await.expect_err("unclosed block");
    assert!(matches!(err, RenderError::Compile(_)));
    assert!(err.to_string().contains("broken.hbs"));
    Ok(())
}

#[tokio::test]
async fn test_broken_partial_fails_render() -> Result<()> {
    let provider = Arc::new(
        CountingProvider::new().with_template("page.hbs", "ok").with_partial("bad", "{{#each}}"),
    );
    let engine = counting_engine(&provider, EngineConfig::new())?;

    let err = engine.render("page", RenderOptions::default()).await.expect_err("bad partial");
    assert!(matches!(err, RenderError::Compile(_)));
    Ok(())
}

#[tokio::test]
async fn test_layout_render_failure_returns_no_output() -> Result<()> {
    let provider = Arc::new(
        CountingProvider::new()
            .with_template("page.hbs", "{{!< layout}}p")
            .with_template("layout.hbs", "{{> nope}}{{{body}}}"),
    );
    let engine = counting_engine(&provider, EngineConfig::new())?;

    let err = engine.render("page", RenderOptions::default()).await.expect_err("missing partial");
    match err {
        RenderError::Template { id, .. } => assert_eq!(id.as_str(), "layout.hbs"),
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}
