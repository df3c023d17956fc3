mod cli;
mod interactive;
mod logger;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command};
use std::path::{Path, PathBuf};
use tail_tracer::batch_pipeline::BatchPipeline;
use tail_tracer::{TracePipeline, TracerConfig};
use tail_tracer_visualizer::{PlotOptions, draw_overlay, plot_trace};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    let config = TracerConfig::load_or_default(cli.config.as_deref())
        .context("loading configuration")?;
    tracing::debug!(?config, "configuration ready");

    match cli.command {
        Command::Interactive => run_interactive(config),
        Command::Stats { image } => run_stats(config, &image),
        Command::Trace {
            background,
            image,
            sensitivity,
            output,
            overlay,
        } => run_trace(config, &background, &image, sensitivity, output, overlay),
        Command::Batch {
            background,
            dir,
            sensitivity,
            output_dir,
            workers,
        } => run_batch(config, &background, &dir, sensitivity, &output_dir, workers).await,
    }
}

fn plot_options(config: &TracerConfig) -> PlotOptions {
    PlotOptions {
        width: config.plot.width,
        height: config.plot.height,
        caption: None,
    }
}

fn run_interactive(config: TracerConfig) -> anyhow::Result<()> {
    let output_path = config.plot.output.clone();
    let options = plot_options(&config);
    let mut pipeline = TracePipeline::new(config);

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();
    let outcome = interactive::run_session(&mut pipeline, &mut input, &mut output)?;

    plot_trace(&outcome.trace, &output_path, &options)?;
    println!(
        "\nTraced {} of {} columns in {}; plot saved to {}",
        outcome.trace.points.len(),
        outcome.trace.width,
        outcome.image.display(),
        output_path.display()
    );
    Ok(())
}

fn run_stats(config: TracerConfig, image: &Path) -> anyhow::Result<()> {
    let stats = TracePipeline::new(config).describe(image)?;
    println!(
        "Average Brightness: {}\nStandard Deviation: {}\n",
        stats.mean, stats.std_dev
    );
    Ok(())
}

fn run_trace(
    mut config: TracerConfig,
    background: &Path,
    image: &Path,
    sensitivity: Option<f64>,
    output: Option<PathBuf>,
    overlay: Option<PathBuf>,
) -> anyhow::Result<()> {
    if let Some(sensitivity) = sensitivity {
        config.scan.sensitivity = sensitivity;
    }
    if let Some(output) = output {
        config.plot.output = output;
    }
    config.validate()?;

    let options = plot_options(&config);
    let output_path = config.plot.output.clone();
    let mut pipeline = TracePipeline::new(config);

    let model = pipeline.sample_background(background)?;
    println!(
        "Background Avg: {}\nBackground Std: {}",
        model.mean, model.std_dev
    );

    let trace = pipeline.trace(image)?;
    plot_trace(&trace, &output_path, &options)?;
    if let Some(overlay) = overlay {
        draw_overlay(image, &trace, &overlay)?;
    }

    println!(
        "Traced {} of {} columns; plot saved to {}",
        trace.points.len(),
        trace.width,
        output_path.display()
    );
    Ok(())
}

/// Plot file for one batch image. The extension stays in the name so `a.png` and
/// `a.bmp` in the same directory get separate plots.
fn plot_path_for(output_dir: &Path, image: &Path) -> PathBuf {
    let name = image
        .file_name()
        .map(|n| n.to_string_lossy().replace('.', "_"))
        .unwrap_or_else(|| "trace".to_string());
    output_dir.join(format!("{name}_trace.png"))
}

async fn run_batch(
    mut config: TracerConfig,
    background: &Path,
    dir: &Path,
    sensitivity: Option<f64>,
    output_dir: &Path,
    workers: Option<usize>,
) -> anyhow::Result<()> {
    if let Some(sensitivity) = sensitivity {
        config.scan.sensitivity = sensitivity;
    }
    if let Some(workers) = workers {
        config.batch.workers = workers;
    }
    config.validate()?;

    let mut pipeline = TracePipeline::new(config.clone());
    let model = pipeline.sample_background(background)?;
    let batch = BatchPipeline::new(model, config.scan.sensitivity, config.batch.workers)?;
    let items = batch.trace_dir(dir).await?;

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    let options = plot_options(&config);

    let mut failures = 0usize;
    for item in &items {
        match &item.result {
            Ok(trace) => {
                let plot_path = plot_path_for(output_dir, &item.path);
                plot_trace(trace, &plot_path, &options)?;
                println!(
                    "{}: {} of {} columns -> {}",
                    item.path.display(),
                    trace.points.len(),
                    trace.width,
                    plot_path.display()
                );
            }
            Err(e) => {
                failures += 1;
                eprintln!("{}: {}", item.path.display(), e);
            }
        }
    }

    tracing::info!(
        images = items.len(),
        failures,
        "batch finished"
    );
    if failures > 0 {
        anyhow::bail!("{failures} of {} images could not be traced", items.len());
    }
    Ok(())
}
