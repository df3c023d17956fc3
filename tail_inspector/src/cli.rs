use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "tail_inspector",
    author,
    version,
    about = "Sample a blank background, then trace where a silhouette begins in every image column"
)]
pub struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Prompt for a background sample, a test image and a sensitivity, then plot the trace
    Interactive,

    /// Print the average brightness and standard deviation of an image
    Stats {
        /// Image to describe
        image: PathBuf,
    },

    /// Trace one image against a blank-space sample
    Trace {
        /// Blank-space (background only) sample image
        #[arg(short, long)]
        background: PathBuf,

        /// Image to trace
        image: PathBuf,

        /// Standard deviations from the background mean; uniform backgrounds need higher values
        #[arg(short, long)]
        sensitivity: Option<f64>,

        /// Plot output path (PNG)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also save the traced image with the boundary marked
        #[arg(long)]
        overlay: Option<PathBuf>,
    },

    /// Trace every image in a directory against one blank-space sample
    Batch {
        /// Blank-space (background only) sample image
        #[arg(short, long)]
        background: PathBuf,

        /// Directory of images to trace
        dir: PathBuf,

        /// Standard deviations from the background mean
        #[arg(short, long)]
        sensitivity: Option<f64>,

        /// Directory receiving one plot per traced image
        #[arg(long, default_value = "plots")]
        output_dir: PathBuf,

        /// Maximum number of images processed at once
        #[arg(short, long)]
        workers: Option<usize>,
    },
}
