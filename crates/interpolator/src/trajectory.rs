//! Linear pan/zoom trajectory between two crop rectangles.
//!
//! With `start = (x1, y1, w1, h1)`, `end = (x2, y2, w2, h2)` and normalized
//! time `t = frame / frames`:
//!
//! ```text
//! x(t) = x1 + (x2 - x1) * t
//! y(t) = y1 + (y2 - y1) * t
//! z(t) = 1 + (w2 / w1 - 1) * t
//! ```
//!
//! The crop window at `t` is `(x(t), y(t), w1 * z(t), h1 * z(t))`. Height
//! follows the width ratio, so the start box's aspect ratio is held.

use kenburns_common::error::{KenBurnsError, KenBurnsResult};
use kenburns_geometry::{Rect, Size};
use serde::{Deserialize, Serialize};

/// Both crop rectangles (original-image pixels) plus the clip duration.
///
/// This is everything an external encoder needs to reproduce the motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterParameters {
    pub x1: i32,
    pub y1: i32,
    pub w1: u32,
    pub h1: u32,
    pub x2: i32,
    pub y2: i32,
    pub w2: u32,
    pub h2: u32,
    /// Clip duration in seconds.
    pub duration: f64,
}

impl FilterParameters {
    /// Validate and package a rectangle pair.
    pub fn new(start: Rect, end: Rect, duration_secs: f64) -> KenBurnsResult<Self> {
        ensure_usable_start(start)?;
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(KenBurnsError::invalid(format!(
                "duration must be positive, got {duration_secs}"
            )));
        }
        Ok(Self {
            x1: start.x,
            y1: start.y,
            w1: start.width,
            h1: start.height,
            x2: end.x,
            y2: end.y,
            w2: end.width,
            h2: end.height,
            duration: duration_secs,
        })
    }

    pub fn start_rect(&self) -> Rect {
        Rect::new(self.x1, self.y1, self.w1, self.h1)
    }

    pub fn end_rect(&self) -> Rect {
        Rect::new(self.x2, self.y2, self.w2, self.h2)
    }

    /// Number of frames the clip spans at `fps`.
    pub fn frame_count(&self, fps: u32) -> KenBurnsResult<u64> {
        frame_count(self.duration, fps)
    }

    /// Trajectory sampled at `fps` over the clip duration.
    pub fn trajectory(&self, fps: u32) -> KenBurnsResult<CropTrajectory> {
        CropTrajectory::new(self.start_rect(), self.end_rect(), self.frame_count(fps)?)
    }
}

/// `round(duration * fps)`, rejecting empty clips.
pub fn frame_count(duration_secs: f64, fps: u32) -> KenBurnsResult<u64> {
    if fps == 0 {
        return Err(KenBurnsError::invalid("fps must be at least 1"));
    }
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(KenBurnsError::invalid(format!(
            "duration must be positive, got {duration_secs}"
        )));
    }
    let frames = (duration_secs * fps as f64).round() as u64;
    if frames == 0 {
        return Err(KenBurnsError::invalid(format!(
            "{duration_secs}s at {fps}fps yields no frames"
        )));
    }
    Ok(frames)
}

fn ensure_usable_start(start: Rect) -> KenBurnsResult<()> {
    if start.is_empty() {
        return Err(KenBurnsError::DegenerateRectangle {
            width: start.width,
            height: start.height,
        });
    }
    Ok(())
}

/// A crop window at one instant, in original-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropWindow {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropWindow {
    /// Truncate every component toward zero.
    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.x as i32,
            self.y as i32,
            self.width.max(0.0) as u32,
            self.height.max(0.0) as u32,
        )
    }

    /// Integer crop that lies inside `bounds` and covers at least one pixel.
    /// `bounds` must be non-empty.
    pub fn clamped_to(&self, bounds: Size) -> Rect {
        let max_x = bounds.width.saturating_sub(1);
        let max_y = bounds.height.saturating_sub(1);
        let x = (self.x.max(0.0) as u32).min(max_x);
        let y = (self.y.max(0.0) as u32).min(max_y);
        let width = (self.width.max(0.0) as u32).clamp(1, bounds.width - x);
        let height = (self.height.max(0.0) as u32).clamp(1, bounds.height - y);
        Rect::new(x as i32, y as i32, width, height)
    }

    /// Whether the window stays inside an image of size `bounds`.
    pub fn fits_within(&self, bounds: Size) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.x + self.width <= bounds.width as f64 + 1e-6
            && self.y + self.height <= bounds.height as f64 + 1e-6
    }
}

/// Linear crop path sampled over `frames` steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropTrajectory {
    start: Rect,
    end: Rect,
    frames: u64,
}

impl CropTrajectory {
    /// Fails with `DegenerateRectangle` when the start box has no area,
    /// since the zoom ratio would divide by zero.
    pub fn new(start: Rect, end: Rect, frames: u64) -> KenBurnsResult<Self> {
        ensure_usable_start(start)?;
        if frames == 0 {
            return Err(KenBurnsError::invalid("trajectory needs at least one frame"));
        }
        Ok(Self { start, end, frames })
    }

    pub fn start(&self) -> Rect {
        self.start
    }

    pub fn end(&self) -> Rect {
        self.end
    }

    /// Total frame count `D`.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// `w2 / w1`: the zoom multiplier reached at `t = 1`.
    pub fn zoom_ratio(&self) -> f64 {
        self.end.width as f64 / self.start.width as f64
    }

    /// Normalized time of a frame index.
    pub fn time_of(&self, frame: u64) -> f64 {
        frame as f64 / self.frames as f64
    }

    pub fn x_at(&self, t: f64) -> f64 {
        lerp(self.start.x as f64, self.end.x as f64, t)
    }

    pub fn y_at(&self, t: f64) -> f64 {
        lerp(self.start.y as f64, self.end.y as f64, t)
    }

    pub fn zoom_at(&self, t: f64) -> f64 {
        1.0 + (self.zoom_ratio() - 1.0) * t
    }

    pub fn window_at(&self, t: f64) -> CropWindow {
        let zoom = self.zoom_at(t);
        CropWindow {
            x: self.x_at(t),
            y: self.y_at(t),
            width: self.start.width as f64 * zoom,
            height: self.start.height as f64 * zoom,
        }
    }

    /// Crop window of frame `frame`, with `t = frame / frames`.
    pub fn window(&self, frame: u64) -> CropWindow {
        self.window_at(self.time_of(frame))
    }

    /// Lazy iterator over frames `0..frames`.
    pub fn windows(&self) -> impl ExactSizeIterator<Item = CropWindow> + '_ {
        (0..self.frames as usize).map(move |i| self.window(i as u64))
    }

    /// Final window, exactly at `t = 1`.
    pub fn final_window(&self) -> CropWindow {
        self.window_at(1.0)
    }

    /// Indices of sampled frames (plus the `t = 1` endpoint) whose window
    /// leaves `bounds`.
    pub fn out_of_bounds_frames(&self, bounds: Size) -> Vec<u64> {
        (0..=self.frames)
            .filter(|&i| !self.window(i).fits_within(bounds))
            .collect()
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
