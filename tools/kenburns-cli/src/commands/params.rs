//! Print encoder parameters for a selection.

use std::path::PathBuf;

use kenburns_common::config::AppConfig;
use kenburns_render_engine::probe_size;

use super::SelectionArgs;

pub fn run(
    config: &AppConfig,
    image: PathBuf,
    selection: SelectionArgs,
    duration: Option<f64>,
    fps: Option<u32>,
) -> anyhow::Result<()> {
    let original = probe_size(&image)?;
    let duration = duration.unwrap_or(config.render.duration_secs);
    let fps = fps.unwrap_or(config.render.fps);

    let params = super::resolve_selection(config, original, &selection, duration)?;
    println!("{}", serde_json::to_string_pretty(&params)?);

    let trajectory = params.trajectory(fps)?;
    let outside = trajectory.out_of_bounds_frames(original);
    eprintln!();
    eprintln!("Trajectory @ {fps}fps:");
    eprintln!("  Frames: {}", trajectory.frames());
    eprintln!("  Zoom ratio: {:.4}", trajectory.zoom_ratio());
    eprintln!("  Final window: {}", trajectory.final_window().to_rect());
    if outside.is_empty() {
        eprintln!("  All windows inside {original}");
    } else {
        eprintln!(
            "  [WARN] {} windows leave {original} (first at frame {})",
            outside.len(),
            outside[0]
        );
    }

    Ok(())
}
