//! Display-surface to image-space coordinate mapping.
//!
//! The editor shows the image scaled to fit a fixed-size surface while
//! keeping its aspect ratio, centered, with letterbox margins on one axis.
//! Pointer events arrive in window coordinates; boxes are drawn in
//! scaled-image coordinates; exports are expressed in original pixels.
//!
//! ```text
//! window ── -origin ──> surface ── -letterbox ──> scaled image ── ×scale ──> original
//! ```

use kenburns_common::error::{KenBurnsError, KenBurnsResult};
use serde::{Deserialize, Serialize};

use crate::point::{Point, Size};
use crate::rect::Rect;

/// Upper-bound inset for the clamped policy on the x axis: x is clamped to
/// `scaled.width - 1`.
pub const CLAMP_INSET_X: u32 = 1;

/// Upper-bound inset for the clamped policy on the y axis: y is clamped to
/// `scaled.height`.
pub const CLAMP_INSET_Y: u32 = 0;

/// How to treat pointer positions that fall in the letterbox margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingPolicy {
    /// Positions outside `[0, scaled)` map to nothing.
    Strict,
    /// Positions are pulled onto the nearest image edge. Used while a drag
    /// is in progress so the box keeps tracking the pointer.
    Clamped,
}

/// The fixed-size widget the scaled image is centered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySurface {
    /// Position of the surface inside the window.
    pub origin: Point,
    /// Surface size in display pixels.
    pub size: Size,
}

impl DisplaySurface {
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// A surface placed at the window origin.
    pub fn at_origin(size: Size) -> Self {
        Self::new(Point::ORIGIN, size)
    }
}

/// Ratio of original-image pixels to displayed pixels. Always > 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    /// Identity scale (the image is shown at native size).
    pub const NATIVE: ScaleFactor = ScaleFactor(1.0);

    /// `original / scaled`, or `None` if either side is zero.
    pub fn new(original: u32, scaled: u32) -> Option<Self> {
        if original == 0 || scaled == 0 {
            return None;
        }
        Some(Self(original as f64 / scaled as f64))
    }

    pub fn from_ratio(ratio: f64) -> Option<Self> {
        (ratio.is_finite() && ratio > 0.0).then_some(Self(ratio))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Map a scaled-image rectangle into original-image pixels.
    /// Every component is multiplied and truncated toward zero.
    pub fn to_original(self, rect: Rect) -> Rect {
        Rect::new(
            (rect.x as f64 * self.0) as i32,
            (rect.y as f64 * self.0) as i32,
            (rect.width as f64 * self.0) as u32,
            (rect.height as f64 * self.0) as u32,
        )
    }

    /// Inverse of [`ScaleFactor::to_original`], truncating.
    pub fn to_scaled(self, rect: Rect) -> Rect {
        Rect::new(
            (rect.x as f64 / self.0) as i32,
            (rect.y as f64 / self.0) as i32,
            (rect.width as f64 / self.0) as u32,
            (rect.height as f64 / self.0) as u32,
        )
    }
}

/// Multiply a finalized box by `scale` to recover original-image pixels.
pub fn to_original_space(rect: Rect, scale: ScaleFactor) -> Rect {
    scale.to_original(rect)
}

/// Map a window-space pointer position into scaled-image coordinates.
///
/// Subtracts the surface origin, then the centering offset
/// `(surface - scaled) / 2` on each axis.
pub fn to_image_space(
    pointer: Point,
    surface_origin: Point,
    surface_size: Size,
    scaled_size: Size,
    policy: MappingPolicy,
) -> Option<Point> {
    let (offset_x, offset_y) = letterbox_offset(surface_size, scaled_size);

    // f64 keeps pointers near the i32 limits from wrapping.
    let x = (pointer.x as f64 - surface_origin.x as f64) - offset_x;
    let y = (pointer.y as f64 - surface_origin.y as f64) - offset_y;
    let width = scaled_size.width as f64;
    let height = scaled_size.height as f64;

    match policy {
        MappingPolicy::Strict => {
            if (0.0..width).contains(&x) && (0.0..height).contains(&y) {
                Some(Point::new(x as i32, y as i32))
            } else {
                None
            }
        }
        MappingPolicy::Clamped => {
            let max_x = scaled_size.width.saturating_sub(CLAMP_INSET_X) as f64;
            let max_y = scaled_size.height.saturating_sub(CLAMP_INSET_Y) as f64;
            Some(Point::new(
                x.clamp(0.0, max_x) as i32,
                y.clamp(0.0, max_y) as i32,
            ))
        }
    }
}

/// Centering offset of a scaled image inside a surface. Negative if the
/// image overflows the surface.
pub fn letterbox_offset(surface_size: Size, scaled_size: Size) -> (f64, f64) {
    (
        (surface_size.width as f64 - scaled_size.width as f64) / 2.0,
        (surface_size.height as f64 - scaled_size.height as f64) / 2.0,
    )
}

/// Largest size with `original`'s aspect ratio that fits in `bounds`.
///
/// Integer arithmetic: the governing edge matches `bounds` exactly and the
/// other edge is the floor of the proportional length (at least 1).
pub fn fit_size(original: Size, bounds: Size) -> Size {
    if original.is_empty() || bounds.is_empty() {
        return Size::new(0, 0);
    }
    let (ow, oh) = (original.width as u64, original.height as u64);
    let (bw, bh) = (bounds.width as u64, bounds.height as u64);

    let width_at_full_height = bh * ow / oh;
    if width_at_full_height <= bw {
        Size::new(width_at_full_height.max(1) as u32, bounds.height)
    } else {
        let height_at_full_width = bw * oh / ow;
        Size::new(bounds.width, height_at_full_width.max(1) as u32)
    }
}

/// A loaded image fitted into a display surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageFit {
    surface: DisplaySurface,
    original: Size,
    scaled: Size,
    scale: ScaleFactor,
}

impl ImageFit {
    /// Fit `original` into `surface`, preserving aspect ratio.
    pub fn new(original: Size, surface: DisplaySurface) -> KenBurnsResult<Self> {
        if original.is_empty() {
            return Err(KenBurnsError::invalid(format!(
                "image has no pixels ({original})"
            )));
        }
        if surface.size.is_empty() {
            return Err(KenBurnsError::invalid(format!(
                "display surface has no pixels ({})",
                surface.size
            )));
        }
        let scaled = fit_size(original, surface.size);
        Self::from_parts(original, scaled, surface)
    }

    /// Use a scaled size reported by the display toolkit.
    pub fn from_parts(original: Size, scaled: Size, surface: DisplaySurface) -> KenBurnsResult<Self> {
        // The edge that touches the surface bounds governs the fit.
        let scale = if scaled.height == surface.size.height && scaled.width != surface.size.width {
            ScaleFactor::new(original.height, scaled.height)
        } else {
            ScaleFactor::new(original.width, scaled.width)
        }
        .ok_or_else(|| {
            KenBurnsError::invalid(format!("cannot derive scale from {original} -> {scaled}"))
        })?;

        Ok(Self {
            surface,
            original,
            scaled,
            scale,
        })
    }

    pub fn surface(&self) -> DisplaySurface {
        self.surface
    }

    pub fn original_size(&self) -> Size {
        self.original
    }

    pub fn scaled_size(&self) -> Size {
        self.scaled
    }

    pub fn scale_factor(&self) -> ScaleFactor {
        self.scale
    }

    pub fn letterbox_offset(&self) -> (f64, f64) {
        letterbox_offset(self.surface.size, self.scaled)
    }

    /// Map a window-space pointer into scaled-image coordinates.
    pub fn to_image_space(&self, pointer: Point, policy: MappingPolicy) -> Option<Point> {
        to_image_space(
            pointer,
            self.surface.origin,
            self.surface.size,
            self.scaled,
            policy,
        )
    }

    /// Strict mapping that reports a pointer over the margin as an error.
    pub fn locate(&self, pointer: Point) -> KenBurnsResult<Point> {
        self.to_image_space(pointer, MappingPolicy::Strict)
            .ok_or(KenBurnsError::PointerOutsideSurface)
    }

    /// Whether the pointer is over the image rather than the margin.
    pub fn contains(&self, pointer: Point) -> bool {
        self.to_image_space(pointer, MappingPolicy::Strict).is_some()
    }

    /// Map a scaled-image point back into window space (for painting).
    pub fn to_display_space(&self, point: Point) -> Point {
        let (offset_x, offset_y) = self.letterbox_offset();
        Point::new(
            ((point.x as f64 + offset_x) as i32).saturating_add(self.surface.origin.x),
            ((point.y as f64 + offset_y) as i32).saturating_add(self.surface.origin.y),
        )
    }

    /// Map a scaled-image rectangle into original-image pixels.
    pub fn to_original_space(&self, rect: Rect) -> Rect {
        self.scale.to_original(rect)
    }
}
