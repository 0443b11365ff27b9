//! Ken Burns CLI: plan and render pan/zoom clips from a still image.
//!
//! Usage:
//!   kenburns inspect <IMAGE>            Show how an image fits the editing surface
//!   kenburns replay <IMAGE> <SCRIPT>    Replay a pointer script against an image
//!   kenburns params <IMAGE> [SELECTION] Print encoder parameters for a selection
//!   kenburns render <IMAGE> [SELECTION] Encode a start/end pan and zoom
//!   kenburns zoom <IMAGE>               Encode a centered zoom-in
//!   kenburns check                      Check for an encoder and show defaults

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kenburns_common::config::{AppConfig, LoggingConfig};
use kenburns_geometry::Size;

mod commands;

use commands::render::RenderMode;
use commands::SelectionArgs;

#[derive(Parser)]
#[command(
    name = "kenburns",
    about = "Draw start and end crops on a still image and render the pan/zoom between them",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how an image fits the editing surface
    Inspect {
        /// Path to the image
        image: PathBuf,

        /// Editing surface size, e.g. 960x540
        #[arg(long)]
        surface: Option<Size>,
    },

    /// Replay a JSONL pointer script and report the drawn boxes
    Replay {
        /// Path to the image
        image: PathBuf,

        /// Gesture script (one JSON event per line)
        script: PathBuf,

        /// Editing surface size, e.g. 960x540
        #[arg(long)]
        surface: Option<Size>,

        /// Aspect lock while dragging ("16:9", "4:3", "free")
        #[arg(long)]
        aspect: Option<String>,

        /// Clip duration used for the reported parameters (seconds)
        #[arg(long)]
        duration: Option<f64>,
    },

    /// Print encoder parameters for a start/end selection
    Params {
        /// Path to the image
        image: PathBuf,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Clip duration (seconds)
        #[arg(long)]
        duration: Option<f64>,

        /// Frame rate used to sample the trajectory
        #[arg(long)]
        fps: Option<u32>,
    },

    /// Encode the pan and zoom between a start and end box
    Render {
        /// Path to the image
        image: PathBuf,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: mp4-h264|mp4-h265|gif|webm
        #[arg(long)]
        format: Option<String>,

        /// Clip duration (seconds)
        #[arg(long)]
        duration: Option<f64>,

        /// Output frame rate
        #[arg(long)]
        fps: Option<u32>,

        /// Output frame size, e.g. 1920x1080 (defaults to the start box size)
        #[arg(long)]
        size: Option<Size>,

        /// Let ffmpeg animate the image, or render frames here and pipe them
        #[arg(long, value_enum, default_value = "filter")]
        mode: RenderMode,
    },

    /// Encode a centered zoom-in over the whole image
    Zoom {
        /// Path to the image
        image: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: mp4-h264|mp4-h265|gif|webm
        #[arg(long)]
        format: Option<String>,

        /// Clip duration (seconds)
        #[arg(long)]
        duration: Option<f64>,

        /// Output frame rate
        #[arg(long)]
        fps: Option<u32>,

        /// Zoom reached by the last frame (1.2 = 20% closer)
        #[arg(long)]
        zoom: Option<f64>,
    },

    /// Check for an encoder and show the active defaults
    Check {
        /// Write the active config to the config file if none exists yet
        #[arg(long)]
        write_config: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let logging = if cli.verbose {
        LoggingConfig {
            level: "debug".to_string(),
            ..config.logging.clone()
        }
    } else {
        config.logging.clone()
    };
    kenburns_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Inspect { image, surface } => commands::inspect::run(&config, image, surface),
        Commands::Replay {
            image,
            script,
            surface,
            aspect,
            duration,
        } => commands::replay::run(&config, image, script, surface, aspect, duration),
        Commands::Params {
            image,
            selection,
            duration,
            fps,
        } => commands::params::run(&config, image, selection, duration, fps),
        Commands::Render {
            image,
            selection,
            output,
            format,
            duration,
            fps,
            size,
            mode,
        } => {
            commands::render::run(
                &config,
                commands::render::RenderArgs {
                    image,
                    selection,
                    output,
                    format,
                    duration,
                    fps,
                    size,
                    mode,
                },
            )
            .await
        }
        Commands::Zoom {
            image,
            output,
            format,
            duration,
            fps,
            zoom,
        } => commands::zoom::run(&config, image, output, format, duration, fps, zoom).await,
        Commands::Check { write_config } => commands::check::run(&config, write_config),
    }
}
