//! Shared CLI helpers used across multiple commands.

use sigexpr_config::EngineConfig;
use sigexpr_core::channel_index;
use std::path::Path;

/// Parse a `name=value` binding for clap's `value_parser`.
pub fn parse_binding(s: &str) -> Result<(String, f64), String> {
    let Some((name, value)) = s.split_once('=') else {
        return Err(format!("Invalid binding: '{s}' (expected name=value)"));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("Invalid binding: '{s}' (empty name)"));
    }
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("Invalid value in '{s}': {e}"))?;
    Ok((name.to_string(), value))
}

/// Load and validate the engine configuration, or use defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let config = match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            EngineConfig::load(path)?
        }
        None => EngineConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Reject text longer than the configured limit before it reaches a store.
pub fn check_length(expression: &str, config: &EngineConfig) -> anyhow::Result<()> {
    if expression.len() > config.max_expression_len {
        anyhow::bail!(
            "Expression is {} bytes, limit is {}",
            expression.len(),
            config.max_expression_len
        );
    }
    Ok(())
}

/// Channel variables in `variables` that no configured input backs.
pub fn unbacked_channels<'a>(
    variables: impl IntoIterator<Item = &'a str>,
    inputs: usize,
) -> Vec<&'a str> {
    variables
        .into_iter()
        .filter(|name| channel_index(name).is_some_and(|i| i >= inputs))
        .collect()
}
