//! Ken Burns Session
//!
//! The stateful half of the editor, kept free of any windowing toolkit:
//! - **Boxes:** the named `start`/`end` crop boxes and the active selector
//! - **Session:** press/move/release handling, queries, and export of the
//!   finished pair as filter parameters
//! - **Gestures:** JSONL pointer scripts that drive a session headlessly
//!
//! A GUI shell forwards its pointer events here and paints whatever
//! [`Session::rectangle_for`] reports.

pub mod boxes;
pub mod gesture;
pub mod session;

pub use boxes::{BoxId, Boxes, CropBox};
pub use gesture::{parse_gestures, GestureKind, PointerGesture, ReplayReport};
pub use session::{CompletedBox, GestureOutcome, Session};
