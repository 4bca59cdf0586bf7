//! Engine configuration file format and construction helpers.

use serde::{Deserialize, Serialize};
use std::path::Path;

use sigexpr_core::{
    Atom, DEFAULT_DIAGNOSTIC_CAPACITY, DEFAULT_EXPRESSION, DEFAULT_FLOAT_PRECISION,
    DEFAULT_INPUT_CHANNELS, DEFAULT_MAX_EXPRESSION_LEN, DiagnosticReceiver, DiagnosticSink,
    ExprRenderer, ExpressionStore, diagnostic_channel,
};

use crate::error::ConfigError;
use crate::validation::{ValidationResult, validate_config};

/// Settings for one expression engine.
///
/// Every field has a default, so an empty file is a valid configuration.
///
/// # TOML Format
///
/// ```toml
/// max_expression_len = 255
/// input_channels = 4
/// float_precision = 2
/// default_expression = "v0"
/// diagnostic_capacity = 64
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Longest accepted expression in bytes.
    pub max_expression_len: usize,

    /// Number of signal inputs, bound to `v0`..`v<n-1>`.
    pub input_channels: usize,

    /// Digits after the decimal point when float tokens become text.
    pub float_precision: usize,

    /// Expression active before the first replacement.
    pub default_expression: String,

    /// Pending diagnostics held before new ones are dropped.
    pub diagnostic_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_expression_len: DEFAULT_MAX_EXPRESSION_LEN,
            input_channels: DEFAULT_INPUT_CHANNELS,
            float_precision: DEFAULT_FLOAT_PRECISION,
            default_expression: DEFAULT_EXPRESSION.to_string(),
            diagnostic_capacity: DEFAULT_DIAGNOSTIC_CAPACITY,
        }
    }
}

/// A store, a renderer reading it, and the diagnostics they report to.
#[derive(Debug)]
pub struct Engine {
    /// Control-thread handle for replacing the expression.
    pub store: ExpressionStore,
    /// Audio-thread renderer bound to `store`.
    pub renderer: ExprRenderer,
    /// Receiving end of the diagnostic channel.
    pub diagnostics: DiagnosticReceiver,
}

impl EngineConfig {
    /// Set the number of inputs.
    pub fn with_input_channels(mut self, input_channels: usize) -> Self {
        self.input_channels = input_channels;
        self
    }

    /// Set the expression active at construction.
    pub fn with_default_expression(mut self, expression: impl Into<String>) -> Self {
        self.default_expression = expression.into();
        self
    }

    /// Set the maximum expression length.
    pub fn with_max_expression_len(mut self, max_expression_len: usize) -> Self {
        self.max_expression_len = max_expression_len;
        self
    }

    /// Set the float formatting precision for control tokens.
    pub fn with_float_precision(mut self, float_precision: usize) -> Self {
        self.float_precision = float_precision;
        self
    }

    /// Set the diagnostic channel capacity.
    pub fn with_diagnostic_capacity(mut self, diagnostic_capacity: usize) -> Self {
        self.diagnostic_capacity = diagnostic_capacity;
        self
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every setting; see [`validate_config`].
    pub fn validate(&self) -> ValidationResult<()> {
        validate_config(self)
    }

    /// Diagnostic channel sized by `diagnostic_capacity`.
    pub fn diagnostic_channel(&self) -> (DiagnosticSink, DiagnosticReceiver) {
        diagnostic_channel(self.diagnostic_capacity)
    }

    /// Store holding the default expression under the configured limit.
    ///
    /// # Errors
    ///
    /// Fails if the configuration does not validate.
    pub fn build_store(&self, diagnostics: DiagnosticSink) -> Result<ExpressionStore, ConfigError> {
        self.validate()?;
        Ok(ExpressionStore::with_limit(
            &self.default_expression,
            self.max_expression_len,
            diagnostics,
        )?)
    }

    /// Validate, then wire a store and renderer to a fresh diagnostic channel.
    pub fn build(&self) -> Result<Engine, ConfigError> {
        let (sink, diagnostics) = self.diagnostic_channel();
        let store = self.build_store(sink.clone())?;
        let renderer = ExprRenderer::new(store.clone(), sink);
        Ok(Engine {
            store,
            renderer,
            diagnostics,
        })
    }

    /// Replace `store`'s expression from control tokens, formatting floats
    /// with `float_precision` digits.
    pub fn set_atoms(&self, store: &ExpressionStore, atoms: &[Atom]) -> Result<(), ConfigError> {
        Ok(store.set_atoms(atoms, self.float_precision)?)
    }
}
