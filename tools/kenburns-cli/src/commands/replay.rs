//! Replay a pointer script against an image.

use std::path::PathBuf;

use kenburns_common::config::AppConfig;
use kenburns_geometry::Size;
use kenburns_render_engine::probe_size;
use kenburns_session::BoxId;

pub fn run(
    config: &AppConfig,
    image: PathBuf,
    script: PathBuf,
    surface: Option<Size>,
    aspect: Option<String>,
    duration: Option<f64>,
) -> anyhow::Result<()> {
    let original = probe_size(&image)?;
    let mut session = super::open_session(config, original, surface, aspect.as_deref())?;
    let report = super::replay_file(&mut session, &script)?;

    println!("Replayed {} ({} events, {} ignored)", script.display(), report.applied, report.ignored);
    for done in &report.completed {
        println!(
            "  {} box: {} on screen -> {} in image",
            done.id.label(),
            done.display_rect,
            done.image_rect
        );
    }
    println!();

    for id in BoxId::ALL {
        match session.image_rectangle_for(id) {
            Some(rect) if !rect.is_empty() => println!("{}: {rect}", id.label()),
            _ => println!("{}: (not drawn)", id.label()),
        }
    }

    if session.is_complete() {
        let duration = duration.unwrap_or(config.render.duration_secs);
        let params = session.to_filter_parameters(duration)?;
        println!();
        println!("{}", serde_json::to_string_pretty(&params)?);
    } else {
        println!();
        println!("Selection incomplete; draw both boxes to get encoder parameters.");
    }

    Ok(())
}
