//! Encode a centered zoom-in over the whole image.

use std::path::PathBuf;
use std::sync::Arc;

use kenburns_common::config::AppConfig;
use kenburns_interpolator::{FrameSequence, ZoomParams};
use kenburns_render_engine::{load_rgb, EncodeSettings, ExportJob};

pub async fn run(
    config: &AppConfig,
    image: PathBuf,
    output: Option<PathBuf>,
    format: Option<String>,
    duration: Option<f64>,
    fps: Option<u32>,
    zoom: Option<f64>,
) -> anyhow::Result<()> {
    println!("Zooming: {}", image.display());

    let params = ZoomParams::zoom_in(
        duration.unwrap_or(config.render.duration_secs),
        fps.unwrap_or(config.render.fps),
        zoom.unwrap_or(config.render.zoom_factor),
    );

    let source = Arc::new(load_rgb(&image)?);
    let sequence = FrameSequence::centered_zoom(source, &params)?;

    let mut settings = EncodeSettings::from_defaults(&config.render, sequence.output_size())?;
    if let Some(format) = &format {
        settings.format = format.parse()?;
    }
    let output_path =
        output.unwrap_or_else(|| super::render::default_output(&image, settings.format));

    println!("  Output: {}", output_path.display());
    println!("  Format: {}", settings.format);
    println!(
        "  Zoom: {:.2} -> {:.2} over {} frames @ {}fps",
        params.start_scale,
        params.end_scale,
        sequence.len(),
        sequence.fps()
    );

    let job = ExportJob::frames(sequence, &output_path, settings)?;
    super::render::encode(job).await
}
