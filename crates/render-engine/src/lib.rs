//! Ken Burns Render Engine
//!
//! Turns a finished crop selection into a video file:
//!
//! ```text
//! picture.jpg ──┬── zoompan filter ────────────┐
//!               │   (FilterParameters)         │
//!               │                              ├── ffmpeg ── clip.mp4
//!               └── FrameSequence ── RGB24 ────┘
//!                   (rendered in-process)
//! ```
//!
//! Every export also leaves a `*.ffmpeg-debug.txt` plan and a
//! `*.verification.json` crop-bounds report next to the output.

pub mod export;
pub mod filter;
pub mod settings;
pub mod source;

pub use export::*;
pub use filter::{video_filter_chain, ZoomPanFilter};
pub use settings::{even_size, EncodeSettings, ExportFormat};
pub use source::{load_rgb, probe_size};
