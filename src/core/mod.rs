//! Core types shared across the crate.

pub mod error;

pub use error::{AsyncHelperError, CompileError, ConfigError, ProviderError, RenderError};
