//! The gesture controller.
//!
//! A [`Session`] owns everything the editor needs between pointer events:
//! the fitted image, both boxes, which box is active, and whether a drag is
//! in progress. Pointer handlers take window coordinates and report what
//! happened as a [`GestureOutcome`].

use kenburns_common::error::{KenBurnsError, KenBurnsResult};
use kenburns_geometry::{
    constrain_aspect, AspectRatio, DisplaySurface, ImageFit, MappingPolicy, Point, Rect, Size,
};
use kenburns_interpolator::{CropTrajectory, FilterParameters};
use serde::Serialize;

use crate::boxes::{BoxId, Boxes, CropBox};

/// A box finalized by a pointer release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletedBox {
    pub id: BoxId,
    /// Rectangle in scaled-image (on-screen) pixels.
    pub display_rect: Rect,
    /// Rectangle in original-image pixels.
    pub image_rect: Rect,
}

/// Result of feeding one pointer event to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Nothing changed (no drag in progress, or pointer over the margin).
    Ignored,
    /// The active box changed and should be repainted.
    Updated,
    /// A drag finished with a non-empty box.
    Completed(CompletedBox),
}

/// Editor state for one image.
#[derive(Debug, Clone)]
pub struct Session {
    surface: DisplaySurface,
    fit: Option<ImageFit>,
    boxes: Boxes,
    active: BoxId,
    drawing: bool,
    aspect_lock: Option<AspectRatio>,
}

impl Session {
    /// An empty session for a display surface, drawing freehand boxes.
    pub fn new(surface: DisplaySurface) -> Self {
        Self {
            surface,
            fit: None,
            boxes: Boxes::default(),
            active: BoxId::Start,
            drawing: false,
            aspect_lock: None,
        }
    }

    /// Constrain every drawn box to `ratio`, or draw freehand with `None`.
    pub fn with_aspect_lock(mut self, ratio: Option<AspectRatio>) -> Self {
        self.aspect_lock = ratio;
        self
    }

    pub fn surface(&self) -> DisplaySurface {
        self.surface
    }

    pub fn fit(&self) -> Option<&ImageFit> {
        self.fit.as_ref()
    }

    pub fn aspect_lock(&self) -> Option<AspectRatio> {
        self.aspect_lock
    }

    pub fn set_aspect_lock(&mut self, ratio: Option<AspectRatio>) {
        self.aspect_lock = ratio;
    }

    /// Fit a newly decoded image into the surface and clear both boxes.
    pub fn load_image(&mut self, original: Size) -> KenBurnsResult<ImageFit> {
        let fit = ImageFit::new(original, self.surface)?;
        tracing::info!(
            original = %original,
            scaled = %fit.scaled_size(),
            scale = fit.scale_factor().value(),
            "Image loaded"
        );
        self.fit = Some(fit);
        self.reset();
        Ok(fit)
    }

    /// Clear both boxes and make `start` active again.
    pub fn reset(&mut self) {
        self.boxes.clear();
        self.active = BoxId::Start;
        self.drawing = false;
    }

    /// Make a box active by name. Only `"start"` and `"end"` are accepted.
    pub fn activate(&mut self, name: &str) -> KenBurnsResult<()> {
        let id: BoxId = name.parse()?;
        self.select(id);
        Ok(())
    }

    /// Make `id` the box the next drag draws into.
    pub fn select(&mut self, id: BoxId) {
        self.active = id;
        self.drawing = false;
    }

    fn require_fit(&self) -> KenBurnsResult<ImageFit> {
        self.fit.ok_or(KenBurnsError::NoImageLoaded)
    }

    /// Begin a drag. Presses over the letterbox margin are ignored.
    pub fn on_pointer_down(&mut self, pos: Point) -> KenBurnsResult<GestureOutcome> {
        let fit = self.require_fit()?;
        let anchor = match fit.locate(pos) {
            Ok(anchor) => anchor,
            Err(err) if err.is_interaction_noise() => {
                tracing::trace!(x = pos.x, y = pos.y, "Press outside image ignored");
                return Ok(GestureOutcome::Ignored);
            }
            Err(err) => return Err(err),
        };
        self.boxes[self.active] = CropBox::anchored(anchor);
        self.drawing = true;
        Ok(GestureOutcome::Updated)
    }

    /// Extend the active box. Positions beyond the image stick to its edge.
    pub fn on_pointer_move(&mut self, pos: Point) -> KenBurnsResult<GestureOutcome> {
        let fit = self.require_fit()?;
        if !self.drawing {
            return Ok(GestureOutcome::Ignored);
        }
        self.drag_active_to(fit, pos);
        Ok(GestureOutcome::Updated)
    }

    /// Finish the drag and report the box in both coordinate spaces.
    ///
    /// After the first non-empty `start` box the session switches to `end`.
    /// A release without any area leaves the box empty and keeps it active.
    pub fn on_pointer_up(&mut self, pos: Point) -> KenBurnsResult<GestureOutcome> {
        let fit = self.require_fit()?;
        if !self.drawing {
            return Ok(GestureOutcome::Ignored);
        }
        self.drag_active_to(fit, pos);
        self.drawing = false;

        let id = self.active;
        let Some(display_rect) = self.boxes[id].rect().filter(|r| !r.is_empty()) else {
            tracing::debug!(box_id = %id, "Released without area");
            return Ok(GestureOutcome::Updated);
        };
        let image_rect = fit.to_original_space(display_rect);

        tracing::info!(
            box_id = %id,
            rect = %display_rect,
            remapped = %image_rect,
            "Box drawn"
        );

        if id == BoxId::Start {
            self.active = BoxId::End;
        }

        Ok(GestureOutcome::Completed(CompletedBox {
            id,
            display_rect,
            image_rect,
        }))
    }

    fn drag_active_to(&mut self, fit: ImageFit, pos: Point) {
        let Some(point) = fit.to_image_space(pos, MappingPolicy::Clamped) else {
            return;
        };
        let aspect_lock = self.aspect_lock;
        let active = &mut self.boxes[self.active];
        let end = match (aspect_lock, active.begin()) {
            (Some(ratio), Some(anchor)) => constrain_aspect(anchor, point, ratio),
            _ => point,
        };
        active.drag_to(end);
    }

    pub fn active_box(&self) -> BoxId {
        self.active
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn boxes(&self) -> &Boxes {
        &self.boxes
    }

    /// Rectangle of a box in scaled-image pixels, if one has been started.
    pub fn rectangle_for(&self, id: BoxId) -> Option<Rect> {
        self.boxes[id].rect()
    }

    /// Rectangle of a box in original-image pixels.
    pub fn image_rectangle_for(&self, id: BoxId) -> Option<Rect> {
        let fit = self.fit?;
        Some(fit.to_original_space(self.rectangle_for(id)?))
    }

    /// Rectangle of a box in window coordinates, for painting.
    pub fn display_rectangle_for(&self, id: BoxId) -> Option<Rect> {
        let fit = self.fit?;
        let rect = self.rectangle_for(id)?;
        let top_left = fit.to_display_space(rect.top_left());
        Some(Rect::new(top_left.x, top_left.y, rect.width, rect.height))
    }

    /// Both boxes have been drawn with non-zero area.
    pub fn is_complete(&self) -> bool {
        BoxId::ALL.iter().all(|&id| !self.boxes[id].is_empty())
    }

    /// Whether `pos` is over the image rather than the margin.
    pub fn is_over_image(&self, pos: Point) -> bool {
        self.fit.is_some_and(|fit| fit.contains(pos))
    }

    /// Start and end boxes in original pixels, packaged for an encoder.
    pub fn to_filter_parameters(&self, duration_secs: f64) -> KenBurnsResult<FilterParameters> {
        self.require_fit()?;
        if !self.is_complete() {
            return Err(KenBurnsError::SelectionIncomplete);
        }
        let start = self
            .image_rectangle_for(BoxId::Start)
            .ok_or(KenBurnsError::SelectionIncomplete)?;
        let end = self
            .image_rectangle_for(BoxId::End)
            .ok_or(KenBurnsError::SelectionIncomplete)?;
        FilterParameters::new(start, end, duration_secs)
    }

    /// Trajectory between the two boxes sampled at `fps`.
    pub fn trajectory(&self, duration_secs: f64, fps: u32) -> KenBurnsResult<CropTrajectory> {
        self.to_filter_parameters(duration_secs)?.trajectory(fps)
    }
}
