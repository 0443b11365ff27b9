//! Pointer scripts.
//!
//! One JSON object per line, for example:
//!
//! ```text
//! # draw the start box
//! {"kind":"down","x":100,"y":50}
//! {"kind":"move","x":300,"y":200}
//! {"kind":"up","x":420,"y":230}
//! {"kind":"activate","name":"end"}
//! {"kind":"reset"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use kenburns_common::error::{KenBurnsError, KenBurnsResult};
use kenburns_geometry::Point;
use serde::{Deserialize, Serialize};

use crate::session::{CompletedBox, GestureOutcome, Session};

/// One scripted input event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PointerGesture {
    Down { x: i32, y: i32 },
    Move { x: i32, y: i32 },
    Up { x: i32, y: i32 },
    /// Switch the active box by name.
    Activate { name: String },
    /// Clear both boxes.
    Reset,
}

impl PointerGesture {
    pub fn kind(&self) -> GestureKind {
        match self {
            PointerGesture::Down { .. } => GestureKind::Down,
            PointerGesture::Move { .. } => GestureKind::Move,
            PointerGesture::Up { .. } => GestureKind::Up,
            PointerGesture::Activate { .. } => GestureKind::Activate,
            PointerGesture::Reset => GestureKind::Reset,
        }
    }

    /// Feed this event to `session`.
    pub fn apply(&self, session: &mut Session) -> KenBurnsResult<GestureOutcome> {
        match self {
            PointerGesture::Down { x, y } => session.on_pointer_down(Point::new(*x, *y)),
            PointerGesture::Move { x, y } => session.on_pointer_move(Point::new(*x, *y)),
            PointerGesture::Up { x, y } => session.on_pointer_up(Point::new(*x, *y)),
            PointerGesture::Activate { name } => {
                session.activate(name)?;
                Ok(GestureOutcome::Updated)
            }
            PointerGesture::Reset => {
                session.reset();
                Ok(GestureOutcome::Updated)
            }
        }
    }
}

/// Discriminant of a [`PointerGesture`], for tallies and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureKind {
    Down,
    Move,
    Up,
    Activate,
    Reset,
}

/// Parse a JSONL gesture script.
pub fn parse_gestures(input: &str) -> KenBurnsResult<Vec<PointerGesture>> {
    let mut gestures = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let gesture = serde_json::from_str(line).map_err(|e| {
            KenBurnsError::invalid(format!("gesture script line {}: {e}", index + 1))
        })?;
        gestures.push(gesture);
    }
    Ok(gestures)
}

/// What a replayed script did to a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub applied: usize,
    pub ignored: usize,
    pub completed: Vec<CompletedBox>,
}

impl ReplayReport {
    /// Replay `gestures` in order, stopping at the first contract violation.
    pub fn replay(session: &mut Session, gestures: &[PointerGesture]) -> KenBurnsResult<Self> {
        let mut report = Self::default();
        for gesture in gestures {
            match gesture.apply(session)? {
                GestureOutcome::Ignored => report.ignored += 1,
                GestureOutcome::Updated => {}
                GestureOutcome::Completed(done) => report.completed.push(done),
            }
            report.applied += 1;
        }
        tracing::debug!(
            applied = report.applied,
            ignored = report.ignored,
            completed = report.completed.len(),
            "Gesture script replayed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boxes::BoxId;
    use kenburns_geometry::{DisplaySurface, Rect, Size};

    const SCRIPT: &str = r#"
# start box
{"kind":"down","x":100,"y":50}
{"kind":"move","x":300,"y":200}
{"kind":"up","x":420,"y":230}

{"kind":"move","x":10,"y":10}
{"kind":"down","x":500,"y":300}
{"kind":"up","x":340,"y":210}
"#;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let gestures = parse_gestures(SCRIPT).unwrap();
        assert_eq!(gestures.len(), 6);
        assert_eq!(gestures[0], PointerGesture::Down { x: 100, y: 50 });
        assert_eq!(gestures[2].kind(), GestureKind::Up);
    }

    #[test]
    fn test_parse_reports_line_number() {
        let err = parse_gestures("{\"kind\":\"down\",\"x\":1,\"y\":1}\n{\"kind\":\"hover\"}").unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn test_parse_control_events() {
        let gestures =
            parse_gestures("{\"kind\":\"activate\",\"name\":\"end\"}\n{\"kind\":\"reset\"}").unwrap();
        assert_eq!(
            gestures,
            vec![
                PointerGesture::Activate { name: "end".into() },
                PointerGesture::Reset
            ]
        );
    }

    #[test]
    fn test_replay_completes_both_boxes() {
        let mut session = Session::new(DisplaySurface::at_origin(Size::new(960, 540)));
        session.load_image(Size::new(1920, 1080)).unwrap();

        let gestures = parse_gestures(SCRIPT).unwrap();
        let report = ReplayReport::replay(&mut session, &gestures).unwrap();

        assert_eq!(report.applied, 6);
        assert_eq!(report.ignored, 1);
        assert_eq!(report.completed.len(), 2);
        assert_eq!(report.completed[1].id, BoxId::End);
        assert_eq!(report.completed[1].image_rect, Rect::new(680, 420, 320, 180));
        assert!(session.is_complete());
    }

    #[test]
    fn test_replay_stops_on_bad_activation() {
        let mut session = Session::new(DisplaySurface::at_origin(Size::new(960, 540)));
        session.load_image(Size::new(1920, 1080)).unwrap();
        let gestures = vec![PointerGesture::Activate {
            name: "middle".into(),
        }];
        let err = ReplayReport::replay(&mut session, &gestures).unwrap_err();
        assert!(matches!(err, KenBurnsError::InvalidBoxActivation { .. }));
    }
}
