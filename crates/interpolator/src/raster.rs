//! Raster frame sequences: crop, zoom, and resample a still image.

use std::ops::Range;
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::RgbImage;
use kenburns_common::error::{KenBurnsError, KenBurnsResult};
use kenburns_geometry::{Rect, Size};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::trajectory::{frame_count, CropTrajectory};

/// Parameters for a centered zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomParams {
    /// Clip duration in seconds.
    pub duration_secs: f64,
    /// Output frame rate.
    pub fps: u32,
    /// Zoom at the first frame (1.0 = whole image).
    pub start_scale: f64,
    /// Zoom approached by the last frame.
    pub end_scale: f64,
}

impl ZoomParams {
    /// Zoom from the full image to `zoom_factor`.
    pub fn zoom_in(duration_secs: f64, fps: u32, zoom_factor: f64) -> Self {
        Self {
            duration_secs,
            fps,
            start_scale: 1.0,
            end_scale: zoom_factor,
        }
    }

    fn validate(&self) -> KenBurnsResult<u64> {
        for (name, scale) in [("start", self.start_scale), ("end", self.end_scale)] {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(KenBurnsError::invalid(format!(
                    "{name} scale must be positive, got {scale}"
                )));
            }
        }
        frame_count(self.duration_secs, self.fps)
    }
}

/// What drives the per-frame crop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FramePlan {
    /// Crop of `(W / scale, H / scale)` centered in the image.
    CenteredZoom { start_scale: f64, end_scale: f64 },
    /// Crop windows of a start/end trajectory.
    Path(CropTrajectory),
}

/// A finite, restartable sequence of rendered frames.
///
/// Frames are produced on demand; frame `i` depends only on `i`, so the
/// sequence can be iterated repeatedly or rendered out of order.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    image: Arc<RgbImage>,
    plan: FramePlan,
    frames: u64,
    fps: u32,
    output: Size,
}

impl FrameSequence {
    /// Centered zoom whose output size equals the source size.
    pub fn centered_zoom(image: Arc<RgbImage>, params: &ZoomParams) -> KenBurnsResult<Self> {
        let frames = params.validate()?;
        let source = image_size(&image)?;
        tracing::debug!(
            frames,
            start_scale = params.start_scale,
            end_scale = params.end_scale,
            size = %source,
            "Planned centered zoom"
        );
        Ok(Self {
            image,
            plan: FramePlan::CenteredZoom {
                start_scale: params.start_scale,
                end_scale: params.end_scale,
            },
            frames,
            fps: params.fps,
            output: source,
        })
    }

    /// Follow `trajectory`, resampling each crop window to `output`.
    pub fn along_path(
        image: Arc<RgbImage>,
        trajectory: CropTrajectory,
        fps: u32,
        output: Size,
    ) -> KenBurnsResult<Self> {
        let source = image_size(&image)?;
        if fps == 0 {
            return Err(KenBurnsError::invalid("fps must be at least 1"));
        }
        if output.is_empty() {
            return Err(KenBurnsError::invalid(format!(
                "output size must be non-empty, got {output}"
            )));
        }
        let outside = trajectory.out_of_bounds_frames(source);
        if !outside.is_empty() {
            tracing::warn!(
                frames = outside.len(),
                first = outside[0],
                "Crop path leaves the image; windows will be clamped"
            );
        }
        Ok(Self {
            image,
            plan: FramePlan::Path(trajectory),
            frames: trajectory.frames(),
            fps,
            output,
        })
    }

    /// Resample every frame to `output` instead.
    pub fn with_output_size(mut self, output: Size) -> KenBurnsResult<Self> {
        if output.is_empty() {
            return Err(KenBurnsError::invalid(format!(
                "output size must be non-empty, got {output}"
            )));
        }
        self.output = output;
        Ok(self)
    }

    pub fn len(&self) -> u64 {
        self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn output_size(&self) -> Size {
        self.output
    }

    pub fn plan(&self) -> &FramePlan {
        &self.plan
    }

    pub fn source_size(&self) -> Size {
        Size::new(self.image.width(), self.image.height())
    }

    /// Clip duration implied by the frame count.
    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / self.fps as f64
    }

    /// The crop (source pixels) used for frame `index`.
    pub fn crop_rect(&self, index: u64) -> Rect {
        let t = index as f64 / self.frames as f64;
        let source = self.source_size();
        match self.plan {
            FramePlan::CenteredZoom {
                start_scale,
                end_scale,
            } => {
                let scale = start_scale + (end_scale - start_scale) * t;
                centered_crop(source, scale)
            }
            FramePlan::Path(trajectory) => trajectory.window_at(t).clamped_to(source),
        }
    }

    /// Render frame `index`, or `None` past the end.
    pub fn frame(&self, index: u64) -> Option<RgbImage> {
        (index < self.frames).then(|| self.render(index))
    }

    /// Lazy iterator from the first frame.
    pub fn iter(&self) -> Frames<'_> {
        Frames {
            sequence: self,
            next: 0,
        }
    }

    /// Render a block of frames in parallel, returned in index order.
    pub fn render_range(&self, range: Range<u64>) -> Vec<RgbImage> {
        let end = range.end.min(self.frames);
        (range.start.min(end)..end)
            .into_par_iter()
            .map(|index| self.render(index))
            .collect()
    }

    fn render(&self, index: u64) -> RgbImage {
        let crop = self.crop_rect(index);
        let full_frame = crop.x == 0
            && crop.y == 0
            && crop.size() == self.source_size()
            && crop.size() == self.output;
        if full_frame {
            return self.image.as_ref().clone();
        }
        let cropped = imageops::crop_imm(
            self.image.as_ref(),
            crop.x as u32,
            crop.y as u32,
            crop.width,
            crop.height,
        )
        .to_image();
        imageops::resize(
            &cropped,
            self.output.width,
            self.output.height,
            FilterType::Lanczos3,
        )
    }
}

impl<'a> IntoIterator for &'a FrameSequence {
    type Item = RgbImage;
    type IntoIter = Frames<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`FrameSequence`].
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    sequence: &'a FrameSequence,
    next: u64,
}

impl Iterator for Frames<'_> {
    type Item = RgbImage;

    fn next(&mut self) -> Option<RgbImage> {
        let frame = self.sequence.frame(self.next)?;
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.sequence.frames.saturating_sub(self.next) as usize;
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<RgbImage> {
        self.next = self.next.saturating_add(n as u64);
        self.next()
    }
}

impl ExactSizeIterator for Frames<'_> {}

/// Centered crop of `(W / scale, H / scale)`, truncated, never larger than
/// the image and never smaller than one pixel.
pub fn centered_crop(source: Size, scale: f64) -> Rect {
    let width = ((source.width as f64 / scale) as u32).clamp(1, source.width);
    let height = ((source.height as f64 / scale) as u32).clamp(1, source.height);
    let left = (source.width - width) / 2;
    let top = (source.height - height) / 2;
    Rect::new(left as i32, top as i32, width, height)
}

fn image_size(image: &RgbImage) -> KenBurnsResult<Size> {
    let size = Size::new(image.width(), image.height());
    if size.is_empty() {
        return Err(KenBurnsError::invalid("source image has no pixels"));
    }
    Ok(size)
}
