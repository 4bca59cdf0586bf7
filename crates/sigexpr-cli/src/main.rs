//! sigexpr CLI - render audio through per-sample arithmetic expressions.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sigexpr")]
#[command(author, version, about = "Per-sample expression renderer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a WAV file through an expression over its channels
    Render(commands::render::RenderArgs),

    /// Evaluate an expression once with explicit variable bindings
    Eval(commands::eval::EvalArgs),

    /// Parse an expression and list what it references
    Check(commands::check::CheckArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Eval(args) => commands::eval::run(args),
        Commands::Check(args) => commands::check::run(args),
    }
}
