//! Check for an encoder and show the active defaults.

use kenburns_common::config::{config_file_path, AppConfig};
use kenburns_render_engine::{EncoderBackend, FfmpegBackend};

pub fn run(config: &AppConfig, write_config: bool) -> anyhow::Result<()> {
    println!("Ken Burns System Check");
    println!("{}", "=".repeat(50));

    let backend = FfmpegBackend::new();
    let encoder_ok = backend.is_available();
    if encoder_ok {
        println!("[OK] Encoder: {} found in PATH", backend.name());
    } else {
        println!("[MISSING] Encoder: {} not found in PATH", backend.name());
    }

    let config_path = config_file_path();
    if config_path.exists() {
        println!("[OK] Config: {}", config_path.display());
    } else if write_config {
        config.save()?;
        println!("[OK] Config: {} (written)", config_path.display());
    } else {
        println!("[--] Config: {} (using defaults)", config_path.display());
    }
    println!();

    println!("Defaults:");
    println!(
        "  Surface: {}x{} (aspect lock: {})",
        config.display.width,
        config.display.height,
        config.display.aspect_lock.as_deref().unwrap_or("free")
    );
    println!(
        "  Render: {} @ {}fps, {:.1}s, zoom {:.2}",
        config.render.format,
        config.render.fps,
        config.render.duration_secs,
        config.render.zoom_factor
    );
    println!();

    if encoder_ok {
        println!("Ready to render.");
    } else {
        println!("Install ffmpeg to render clips; `params` and `replay` work without it.");
    }

    Ok(())
}
