//! Integration test suite for hbs-render
//!
//! End-to-end tests that drive [`Engine::render`](hbs_render::Engine::render)
//! through real providers and check the final HTML.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! cargo nextest run --test integration
//! ```
//!
//! # Test Organization
//!
//! - **async_helpers**: Placeholder substitution in body and layout passes
//! - **blocks**: `contentFor` / `block` across view and layout
//! - **caching**: Fetch counts with the cache enabled and disabled
//! - **config_loading**: TOML configuration and build-time validation
//! - **errors**: Provider, compile and render failures
//! - **layouts**: Layout precedence and resolution
//! - **providers**: Filesystem, key-value and document providers end to end

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod blocks;
mod caching;
mod config_loading;
mod errors;
