//! Ken Burns Geometry
//!
//! Pure geometry for the crop editor:
//! - **Points and rectangles:** integer primitives and corner normalization
//! - **Aspect constraint:** fixed-ratio rectangles during a drag
//! - **Coordinate mapping:** letterboxed display surface <-> original image pixels
//!
//! Nothing here touches I/O or a windowing toolkit.

pub mod aspect;
pub mod mapper;
pub mod point;
pub mod rect;

pub use aspect::{constrain_aspect, AspectRatio};
pub use mapper::{to_image_space, DisplaySurface, ImageFit, MappingPolicy, ScaleFactor};
pub use point::{Point, Size};
pub use rect::{normalize, Rect};
