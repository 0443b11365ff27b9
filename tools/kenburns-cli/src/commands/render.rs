//! Encode the pan and zoom between a start and end box.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::ValueEnum;
use kenburns_common::config::AppConfig;
use kenburns_geometry::Size;
use kenburns_interpolator::FrameSequence;
use kenburns_render_engine::{
    export_video, load_rgb, probe_size, EncodeSettings, ExportFormat, ExportJob, ExportProgress,
    ProgressCallback,
};

use super::SelectionArgs;

/// Where frames are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderMode {
    /// ffmpeg's zoompan filter animates the image
    Filter,
    /// Frames are rendered in-process and piped to ffmpeg
    Frames,
}

pub struct RenderArgs {
    pub image: PathBuf,
    pub selection: SelectionArgs,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    pub duration: Option<f64>,
    pub fps: Option<u32>,
    pub size: Option<Size>,
    pub mode: RenderMode,
}

pub async fn run(config: &AppConfig, args: RenderArgs) -> anyhow::Result<()> {
    println!("Rendering: {}", args.image.display());

    let original = probe_size(&args.image)?;
    let duration = args.duration.unwrap_or(config.render.duration_secs);
    let params = super::resolve_selection(config, original, &args.selection, duration)?;

    let output_size = args.size.unwrap_or(params.start_rect().size());
    let mut settings = EncodeSettings::from_defaults(&config.render, output_size)?;
    if let Some(format) = &args.format {
        settings.format = format.parse()?;
    }
    if let Some(fps) = args.fps {
        settings.fps = fps;
    }

    let output_path = args
        .output
        .unwrap_or_else(|| default_output(&args.image, settings.format));

    println!("  Start: {}", params.start_rect());
    println!("  End: {}", params.end_rect());
    println!("  Output: {}", output_path.display());
    println!("  Format: {}", settings.format);
    println!(
        "  Resolution: {} @ {}fps, {duration:.1}s",
        settings.encoded_size(),
        settings.fps
    );

    let job = match args.mode {
        RenderMode::Filter => ExportJob::zoompan(&args.image, params, &output_path, settings)?,
        RenderMode::Frames => {
            let image = Arc::new(load_rgb(&args.image)?);
            let trajectory = params.trajectory(settings.fps)?;
            let sequence =
                FrameSequence::along_path(image, trajectory, settings.fps, settings.encoded_size())?;
            ExportJob::frames(sequence, &output_path, settings)?
        }
    };

    encode(job).await
}

/// `picture.jpg` -> `picture-kenburns.mp4`, next to the image.
pub fn default_output(image: &Path, format: ExportFormat) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "clip".to_string());
    image.with_file_name(format!("{stem}-kenburns.{}", format.extension()))
}

/// Run an export job with a terminal progress line.
pub async fn encode(job: ExportJob) -> anyhow::Result<()> {
    let output_path = job.output_path.clone();
    let progress_cb: ProgressCallback = Box::new(|p: ExportProgress| {
        print!(
            "\r  Progress: {:.1}% ({}/{} frames, ETA: {:.0}s)  ",
            p.progress * 100.0,
            p.frames_rendered,
            p.total_frames,
            p.eta_secs,
        );
    });

    match export_video(job, Some(progress_cb)).await {
        Ok(_) => {
            println!("\nExport complete: {}", output_path.display());
            Ok(())
        }
        Err(e) => {
            println!("\nExport failed");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_sits_next_to_image() {
        assert_eq!(
            default_output(Path::new("/photos/picture.jpg"), ExportFormat::Mp4H264),
            PathBuf::from("/photos/picture-kenburns.mp4")
        );
        assert_eq!(
            default_output(Path::new("shot.png"), ExportFormat::Gif),
            PathBuf::from("shot-kenburns.gif")
        );
    }
}
