//! Ken Burns Interpolator
//!
//! Turns a start/end crop pair into per-frame geometry:
//! - **Trajectory:** closed-form linear pan and zoom between two rectangles,
//!   the contract shared with declarative encoder filters
//! - **Raster:** lazy frame sequences that crop, zoom, and resample a still
//!   image, either along a trajectory or as a centered zoom
//!
//! All geometry is computed from the frame index alone; no frame depends on
//! the one before it.

pub mod raster;
pub mod trajectory;

pub use raster::{FramePlan, FrameSequence, Frames, ZoomParams};
pub use trajectory::{CropTrajectory, CropWindow, FilterParameters};
