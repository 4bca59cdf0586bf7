//! Engine configuration validation.
//!
//! Checks every field of an [`EngineConfig`](crate::EngineConfig) and
//! collects all problems instead of stopping at the first.
//!
//! # Example
//!
//! ```rust
//! use sigexpr_config::{EngineConfig, ValidationError};
//!
//! let config = EngineConfig::default().with_input_channels(2);
//! assert!(config.validate().is_ok());
//!
//! let bad = EngineConfig::default().with_default_expression("v3");
//! let bad = bad.with_input_channels(2);
//! assert!(matches!(
//!     bad.validate(),
//!     Err(ValidationError::ChannelOutOfRange { channel: 3, inputs: 2 })
//! ));
//! ```

use sigexpr_core::{MAX_EXPRESSION_LEN, Program, channel_index};
use thiserror::Error;

use crate::EngineConfig;

/// Largest number of inputs addressable by a one-digit variable name.
pub const MAX_INPUT_CHANNELS: usize = 10;

/// Largest digit count accepted for float formatting.
pub const MAX_FLOAT_PRECISION: usize = 17;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Numeric setting outside its allowed range.
    #[error("'{field}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the setting.
        field: &'static str,
        /// The value that was out of range.
        value: usize,
        /// Minimum allowed value.
        min: usize,
        /// Maximum allowed value.
        max: usize,
    },

    /// Default expression longer than the configured limit.
    #[error("default expression is {len} bytes, limit is {max}")]
    DefaultTooLong {
        /// Length of the default expression in bytes.
        len: usize,
        /// Configured `max_expression_len`.
        max: usize,
    },

    /// Default expression does not parse.
    #[error("default expression '{expression}' does not parse: {reason}")]
    InvalidDefault {
        /// The configured text.
        expression: String,
        /// Parser message.
        reason: String,
    },

    /// Default expression reads an input the engine will not have.
    #[error("default expression reads v{channel} but only {inputs} inputs are configured")]
    ChannelOutOfRange {
        /// Channel index named by the expression.
        channel: usize,
        /// Configured `input_channels`.
        inputs: usize,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn check_range(
    errors: &mut Vec<ValidationError>,
    field: &'static str,
    value: usize,
    min: usize,
    max: usize,
) {
    if !(min..=max).contains(&value) {
        errors.push(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
}

/// Validate every field of `config`.
///
/// # Errors
///
/// Returns the single failing check, or [`ValidationError::Multiple`] when
/// more than one fails.
pub fn validate_config(config: &EngineConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();

    check_range(
        &mut errors,
        "max_expression_len",
        config.max_expression_len,
        1,
        MAX_EXPRESSION_LEN,
    );
    check_range(
        &mut errors,
        "input_channels",
        config.input_channels,
        1,
        MAX_INPUT_CHANNELS,
    );
    check_range(
        &mut errors,
        "float_precision",
        config.float_precision,
        0,
        MAX_FLOAT_PRECISION,
    );
    check_range(
        &mut errors,
        "diagnostic_capacity",
        config.diagnostic_capacity,
        1,
        1 << 16,
    );

    errors.extend(validate_default_expression(config).err());

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

/// Check the default expression against the length limit and input count.
///
/// # Errors
///
/// Returns the first problem found with the default expression.
pub fn validate_default_expression(config: &EngineConfig) -> ValidationResult<()> {
    let text = config.default_expression.as_str();
    if text.len() > config.max_expression_len {
        return Err(ValidationError::DefaultTooLong {
            len: text.len(),
            max: config.max_expression_len,
        });
    }

    let program = Program::compile(text).map_err(|e| ValidationError::InvalidDefault {
        expression: text.to_string(),
        reason: e.to_string(),
    })?;

    match program
        .variables()
        .filter_map(channel_index)
        .find(|&channel| channel >= config.input_channels)
    {
        Some(channel) => Err(ValidationError::ChannelOutOfRange {
            channel,
            inputs: config.input_channels,
        }),
        None => Ok(()),
    }
}
