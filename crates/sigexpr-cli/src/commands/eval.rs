//! One-shot evaluation command.

use crate::commands::common::{check_length, load_config, parse_binding};
use clap::Args;
use sigexpr_core::{MapResolver, NoFunctions, evaluate};
use std::path::PathBuf;

#[derive(Args)]
pub struct EvalArgs {
    /// Expression to evaluate
    #[arg(value_name = "EXPRESSION", allow_hyphen_values = true)]
    expression: String,

    /// Variable bindings (e.g., "v0=0.5 v1=-1")
    #[arg(value_name = "NAME=VALUE", value_parser = parse_binding)]
    bindings: Vec<(String, f64)>,

    /// Engine configuration file (TOML), for the length limit
    #[arg(short, long)]
    config: Option<PathBuf>,
}

pub fn run(args: EvalArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    check_length(&args.expression, &config)?;

    let variables: MapResolver = args.bindings.into_iter().collect();
    let result = evaluate(&args.expression, &variables, &NoFunctions);

    println!("{}", result.value);
    match result.error {
        Some(error) => anyhow::bail!("{error}"),
        None => Ok(()),
    }
}
