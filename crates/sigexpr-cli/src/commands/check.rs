//! Expression check command.

use crate::commands::common::{check_length, load_config, unbacked_channels};
use clap::Args;
use sigexpr_core::Program;
use std::path::PathBuf;

#[derive(Args)]
pub struct CheckArgs {
    /// Expression to check
    #[arg(value_name = "EXPRESSION", allow_hyphen_values = true)]
    expression: String,

    /// Engine configuration file (TOML), for the length limit and input count
    #[arg(short, long)]
    config: Option<PathBuf>,
}

pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    check_length(&args.expression, &config)?;

    let program = Program::compile(&args.expression)
        .map_err(|e| anyhow::anyhow!("Invalid expression '{}': {e}", args.expression))?;

    println!("OK: {}", args.expression);
    println!("  variables:   {}", join_or_none(program.variables()));
    println!("  functions:   {}", join_or_none(program.functions()));
    println!("  stack depth: {}", program.max_depth());
    if program.is_constant() {
        println!("  constant");
    }

    let unbacked = unbacked_channels(program.variables(), config.input_channels);
    if !unbacked.is_empty() {
        println!(
            "  warning: {} not backed by the {} configured input(s)",
            unbacked.join(", "),
            config.input_channels
        );
    }

    Ok(())
}

fn join_or_none<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let names: Vec<&str> = names.collect();
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}
