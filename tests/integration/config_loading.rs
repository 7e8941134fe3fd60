//! Engine configuration loaded from TOML

use anyhow::Result;
use hbs_render::{ConfigError, Engine, EngineConfig, RenderOptions};
use serde_json::json;

use crate::common::TestViews;

#[tokio::test]
async fn test_config_file_drives_rendering() -> Result<()> {
    let views = TestViews::new().await?;
    views.write("main.hbs", "<main>{{{body}}}</main>").await?;
    views.write("hello.hbs", "Hello {{name}}{{> bang}}").await?;
    views.write_partial("bang", "!").await?;

    let config_path = views.write(
        "engine.toml",
        &format!(
            "views = {:?}\ndefaultLayout = \"main\"\npartials_dir = {:?}\n",
            views.root().display().to_string(),
            views.partials_dir().display().to_string()
        ),
    )
    .await?;

    let config = EngineConfig::load(&config_path).await?;
    assert_eq!(config.extname, ".hbs");
    assert_eq!(config.default_layout.as_deref(), Some("main"));

    let engine = Engine::new(config)?;
    let html = engine.render("hello", RenderOptions::new(json!({"name": "Ann"}))).await?;
    assert_eq!(html, "<main>Hello Ann!</main>");
    Ok(())
}

#[tokio::test]
async fn test_invalid_config_file_is_rejected() -> Result<()> {
    let views = TestViews::new().await?;
    let bad_ext = views.write("bad-ext.toml", "extname = \"hbs\"\n").await?;
    let bad_toml = views.write("bad.toml", "extname = [\n").await?;

    assert!(matches!(
        EngineConfig::load(&bad_ext).await,
        Err(ConfigError::InvalidOption { field: "extname", .. })
    ));
    assert!(matches!(EngineConfig::load(&bad_toml).await, Err(ConfigError::Parse(_))));
    assert!(matches!(
        EngineConfig::load(&views.root().join("missing.toml")).await,
        Err(ConfigError::Io { .. })
    ));
    Ok(())
}

#[test]
fn test_blank_default_layout_fails_build() {
    let result = Engine::new(EngineConfig::new().with_default_layout("  "));
    assert!(matches!(result, Err(ConfigError::InvalidOption { field: "default_layout", .. })));
}
