//! Configuration for the view engine.
//!
//! - [`EngineConfig`] - options fixed for the lifetime of an engine

pub mod engine;

pub use engine::{DEFAULT_EXTNAME, EngineConfig};
