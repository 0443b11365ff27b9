//! Show how an image fits the editing surface.

use std::path::PathBuf;

use kenburns_common::config::AppConfig;
use kenburns_geometry::{DisplaySurface, ImageFit, Size};
use kenburns_render_engine::probe_size;

pub fn run(config: &AppConfig, image: PathBuf, surface: Option<Size>) -> anyhow::Result<()> {
    let original = probe_size(&image)?;
    let surface = super::surface_size(config, surface);
    let fit = ImageFit::new(original, DisplaySurface::at_origin(surface))?;
    let (offset_x, offset_y) = fit.letterbox_offset();

    println!("Image: {}", image.display());
    println!("  Original: {original}");
    if let Some(aspect) = original.aspect() {
        println!("  Aspect: {aspect:.4}");
    }
    println!();

    println!("Editing surface: {surface}");
    println!("  Scaled image: {}", fit.scaled_size());
    println!("  Scale factor: {:.4}", fit.scale_factor().value());
    println!("  Letterbox offset: ({offset_x:.1}, {offset_y:.1})");
    match config.display.aspect_lock.as_deref() {
        Some(lock) => println!("  Aspect lock: {lock}"),
        None => println!("  Aspect lock: free"),
    }

    Ok(())
}
