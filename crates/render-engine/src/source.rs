//! Still-image input.

use std::path::Path;

use image::RgbImage;
use kenburns_common::error::{KenBurnsError, KenBurnsResult};
use kenburns_geometry::Size;

/// Decode an image file into an 8-bit RGB raster.
///
/// Alpha is dropped; other pixel formats are converted.
pub fn load_rgb(path: &Path) -> KenBurnsResult<RgbImage> {
    ensure_exists(path)?;
    let decoded = image::open(path)
        .map_err(|e| KenBurnsError::unreadable_image(path, e.to_string()))?;
    let rgb = decoded.into_rgb8();
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(KenBurnsError::unreadable_image(path, "image has no pixels"));
    }
    tracing::debug!(
        path = %path.display(),
        width = rgb.width(),
        height = rgb.height(),
        "Decoded source image"
    );
    Ok(rgb)
}

/// Read only the header to get the pixel dimensions.
pub fn probe_size(path: &Path) -> KenBurnsResult<Size> {
    ensure_exists(path)?;
    let (width, height) = image::image_dimensions(path)
        .map_err(|e| KenBurnsError::unreadable_image(path, e.to_string()))?;
    let size = Size::new(width, height);
    if size.is_empty() {
        return Err(KenBurnsError::unreadable_image(path, "image has no pixels"));
    }
    Ok(size)
}

fn ensure_exists(path: &Path) -> KenBurnsResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(KenBurnsError::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("kenburns-source-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_missing_file() {
        let err = load_rgb(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, KenBurnsError::FileNotFound { .. }));
    }

    #[test]
    fn test_garbage_is_unreadable() {
        let path = temp_path("garbage.png");
        std::fs::write(&path, b"not an image at all").unwrap();
        let err = load_rgb(&path).unwrap_err();
        assert!(matches!(err, KenBurnsError::UnreadableImage { .. }), "{err}");
        let err = probe_size(&path).unwrap_err();
        assert!(matches!(err, KenBurnsError::UnreadableImage { .. }), "{err}");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_png_roundtrip_through_disk() {
        let path = temp_path("gradient.png");
        let image = RgbImage::from_fn(12, 7, |x, y| image::Rgb([(x * 20) as u8, (y * 30) as u8, 7]));
        image.save(&path).unwrap();

        assert_eq!(probe_size(&path).unwrap(), Size::new(12, 7));
        let loaded = load_rgb(&path).unwrap();
        assert_eq!(loaded.dimensions(), (12, 7));
        assert_eq!(loaded.get_pixel(3, 2), &image::Rgb([60, 60, 7]));
        let _ = std::fs::remove_file(path);
    }
}
