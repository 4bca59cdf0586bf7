//! Offline render command: WAV channels in, expression output out.

use crate::commands::common::{check_length, load_config, unbacked_channels};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use sigexpr_io::{WavSpec, read_wav_channels, write_wav};
use std::path::PathBuf;

#[derive(Args)]
pub struct RenderArgs {
    /// Input WAV file; channel n drives variable vn
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file (mono)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Expression to render (defaults to the configured default expression).
    /// One that does not parse stops the render before any output is written
    #[arg(short, long)]
    expr: Option<String>,

    /// Engine configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Processing block size
    #[arg(long, default_value = "512")]
    block_size: usize,

    /// Output bit depth (8, 16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    if args.block_size == 0 {
        anyhow::bail!("Block size must be at least 1");
    }
    let config = load_config(args.config.as_deref())?;

    println!("Reading {}...", args.input.display());
    let (mut channels, spec) = read_wav_channels(&args.input)?;
    let frames = channels.first().map_or(0, Vec::len);
    println!(
        "  {} channel(s), {} samples, {} Hz, {:.2}s",
        channels.len(),
        frames,
        spec.sample_rate,
        frames as f64 / f64::from(spec.sample_rate)
    );

    if channels.len() > config.input_channels {
        tracing::warn!(
            "file has {} channels, binding only the first {}",
            channels.len(),
            config.input_channels
        );
        channels.truncate(config.input_channels);
    }

    let mut engine = config.build()?;
    if let Some(expr) = &args.expr {
        check_length(expr, &config)?;
        engine.store.set(expr)?;
    }

    let expression = engine.store.snapshot();
    let program = match expression.program() {
        Ok(program) => program,
        Err(e) => anyhow::bail!("Invalid expression '{}': {e}", expression.text()),
    };
    for name in unbacked_channels(program.variables(), channels.len()) {
        tracing::warn!("{name} has no input channel and will render as NaN");
    }
    println!("Rendering '{}'...", expression.text());

    engine
        .renderer
        .prepare(f64::from(spec.sample_rate), args.block_size);
    engine.diagnostics.log_pending();

    let pb = ProgressBar::new(frames as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let mut output = vec![0.0; frames];
    let mut block: Vec<&[f64]> = Vec::with_capacity(channels.len());
    let mut failed_samples = 0usize;

    for (i, out_chunk) in output.chunks_mut(args.block_size).enumerate() {
        let start = i * args.block_size;
        let end = start + out_chunk.len();
        block.clear();
        block.extend(channels.iter().map(|c| &c[start..end]));

        engine.renderer.render(&block, out_chunk);
        failed_samples += engine.renderer.last_block_failures();
        engine.diagnostics.log_pending();
        pb.set_position(end as u64);
    }

    pb.finish_with_message("done");

    println!("\nStats:");
    println!(
        "  Output: RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(rms(&output)),
        linear_to_db(peak(&output))
    );
    if failed_samples > 0 {
        println!("  {failed_samples} sample(s) rendered as NaN");
    }

    let out_spec = WavSpec {
        channels: 1,
        sample_rate: spec.sample_rate,
        bits_per_sample: args.bit_depth,
    };

    println!("\nWriting {}...", args.output.display());
    write_wav(&args.output, &output, out_spec)?;
    println!("Done!");

    Ok(())
}

fn rms(samples: &[f64]) -> f64 {
    let finite: Vec<f64> = samples.iter().copied().filter(|s| s.is_finite()).collect();
    if finite.is_empty() {
        return 0.0;
    }
    let sum: f64 = finite.iter().map(|s| s * s).sum();
    (sum / finite.len() as f64).sqrt()
}

fn peak(samples: &[f64]) -> f64 {
    samples
        .iter()
        .filter(|s| s.is_finite())
        .map(|s| s.abs())
        .fold(0.0, f64::max)
}

fn linear_to_db(linear: f64) -> f64 {
    if linear <= 0.0 {
        -120.0
    } else {
        20.0 * linear.log10()
    }
}
