//! Configuration for sigexpr expression engines.
//!
//! Loads and saves [`EngineConfig`] as TOML, validates it, and builds a
//! ready-to-run [`Engine`] (store, renderer, diagnostic receiver).
//!
//! # Example
//!
//! ```rust,no_run
//! use sigexpr_config::EngineConfig;
//!
//! let config = EngineConfig::load("engine.toml").unwrap();
//! let mut engine = config.build().unwrap();
//!
//! engine.store.set("0.5 * (v0 + v1)").unwrap();
//! let left = [0.2; 64];
//! let right = [0.4; 64];
//! let channels: [&[f64]; 2] = [&left, &right];
//! let out = engine.renderer.render_block(&channels, 64);
//! assert_eq!(out.len(), 64);
//!
//! config.save("engine.toml").unwrap();
//! ```

mod engine_config;
mod error;

/// Engine configuration validation.
pub mod validation;

pub use engine_config::{Engine, EngineConfig};
pub use error::ConfigError;
pub use validation::{
    MAX_FLOAT_PRECISION, MAX_INPUT_CHANNELS, ValidationError, ValidationResult, validate_config,
    validate_default_expression,
};
