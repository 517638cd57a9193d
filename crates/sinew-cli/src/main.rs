//! Sinew CLI - inspect rigs and drive skeletal animation from the terminal

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{inspect, play, sample};

#[derive(Parser)]
#[command(name = "sinew")]
#[command(about = "Skeletal animation playback for TOML rigs", long_about = None)]
#[command(version)]
struct Cli {
    /// Log state transitions and load details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a rig's bones, hierarchy and clips
    Inspect {
        /// Path to rig file
        rig: String,
    },

    /// Evaluate a single pose and print its bone matrices
    Sample {
        /// Path to rig file
        rig: String,

        /// Clip to sample (defaults to the rig's playback clip)
        #[arg(long)]
        clip: Option<String>,

        /// Normalized position in the clip, 0..1
        #[arg(long, conflicts_with = "time", required_unless_present = "time")]
        progress: Option<f64>,

        /// Position in the clip, in seconds
        #[arg(long)]
        time: Option<f64>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Simulate fixed-step playback and print per-frame progress
    Play {
        /// Path to rig file
        rig: String,

        /// Clip to play (defaults to the rig's playback clip)
        #[arg(long)]
        clip: Option<String>,

        /// Simulated wall time in seconds
        #[arg(long, default_value = "2.0")]
        seconds: f64,

        /// Ticks per simulated second
        #[arg(long, default_value = "30.0")]
        fps: f64,

        /// Playback speed multiplier (overrides the rig's playback speed)
        #[arg(long, allow_negative_numbers = true)]
        speed: Option<f64>,

        /// Stop at the end of the clip instead of wrapping
        #[arg(long)]
        no_loop: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Inspect { rig } => inspect::run(&rig),
        Commands::Sample {
            rig,
            clip,
            progress,
            time,
            format,
        } => sample::run(sample::SampleArgs {
            rig,
            clip,
            progress,
            time,
            format,
        }),
        Commands::Play {
            rig,
            clip,
            seconds,
            fps,
            speed,
            no_loop,
        } => play::run(play::PlayArgs {
            rig,
            clip,
            seconds,
            fps,
            speed,
            no_loop,
        }),
    }
}
