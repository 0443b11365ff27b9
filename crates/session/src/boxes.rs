//! Named crop boxes.

use std::ops::{Index, IndexMut};
use std::str::FromStr;

use kenburns_common::error::KenBurnsError;
use kenburns_geometry::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Which of the two boxes a gesture draws into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxId {
    /// Framing at the first frame.
    #[default]
    Start,
    /// Framing at the last frame.
    End,
}

impl BoxId {
    pub const ALL: [BoxId; 2] = [BoxId::Start, BoxId::End];

    pub fn as_str(self) -> &'static str {
        match self {
            BoxId::Start => "start",
            BoxId::End => "end",
        }
    }

    /// Label painted under the box.
    pub fn label(self) -> &'static str {
        match self {
            BoxId::Start => "Start",
            BoxId::End => "End",
        }
    }
}

impl std::fmt::Display for BoxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoxId {
    type Err = KenBurnsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(BoxId::Start),
            "end" => Ok(BoxId::End),
            other => Err(KenBurnsError::InvalidBoxActivation {
                name: other.to_string(),
            }),
        }
    }
}

/// A rectangle in progress: an anchor plus a free corner, both in
/// scaled-image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CropBox {
    begin: Option<Point>,
    end: Option<Point>,
}

impl CropBox {
    /// Start a new drag at `anchor`.
    pub fn anchored(anchor: Point) -> Self {
        Self {
            begin: Some(anchor),
            end: Some(anchor),
        }
    }

    pub fn begin(&self) -> Option<Point> {
        self.begin
    }

    pub fn end(&self) -> Option<Point> {
        self.end
    }

    /// Move the free corner. Ignored until the anchor is set.
    pub fn drag_to(&mut self, end: Point) {
        if self.begin.is_some() {
            self.end = Some(end);
        }
    }

    /// The normalized rectangle, if both corners are known.
    pub fn rect(&self) -> Option<Rect> {
        Some(Rect::from_corners(self.begin?, self.end?))
    }

    /// True until a rectangle with area has been drawn.
    pub fn is_empty(&self) -> bool {
        self.rect().map_or(true, |r| r.is_empty())
    }
}

/// One box per [`BoxId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Boxes {
    pub start: CropBox,
    pub end: CropBox,
}

impl Boxes {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn iter(&self) -> impl Iterator<Item = (BoxId, &CropBox)> {
        BoxId::ALL.into_iter().map(move |id| (id, &self[id]))
    }
}

impl Index<BoxId> for Boxes {
    type Output = CropBox;

    fn index(&self, id: BoxId) -> &CropBox {
        match id {
            BoxId::Start => &self.start,
            BoxId::End => &self.end,
        }
    }
}

impl IndexMut<BoxId> for Boxes {
    fn index_mut(&mut self, id: BoxId) -> &mut CropBox {
        match id {
            BoxId::Start => &mut self.start,
            BoxId::End => &mut self.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_id_parse() {
        assert_eq!("start".parse::<BoxId>().unwrap(), BoxId::Start);
        assert_eq!("end".parse::<BoxId>().unwrap(), BoxId::End);
        let err = "middle".parse::<BoxId>().unwrap_err();
        assert!(matches!(err, KenBurnsError::InvalidBoxActivation { ref name } if name == "middle"));
        assert!("Start".parse::<BoxId>().is_err());
    }

    #[test]
    fn test_empty_box_has_no_rect() {
        let b = CropBox::default();
        assert!(b.rect().is_none());
        assert!(b.is_empty());
    }

    #[test]
    fn test_drag_before_anchor_is_ignored() {
        let mut b = CropBox::default();
        b.drag_to(Point::new(5, 5));
        assert!(b.end().is_none());
    }

    #[test]
    fn test_corners_are_kept_as_drawn() {
        let mut b = CropBox::anchored(Point::new(40, 30));
        assert!(b.is_empty());
        b.drag_to(Point::new(10, 5));
        assert_eq!(b.begin(), Some(Point::new(40, 30)));
        assert_eq!(b.end(), Some(Point::new(10, 5)));
        assert_eq!(b.rect(), Some(Rect::new(10, 5, 30, 25)));
        assert!(!b.is_empty());
    }

    #[test]
    fn test_boxes_index_and_clear() {
        let mut boxes = Boxes::default();
        boxes[BoxId::End] = CropBox::anchored(Point::new(1, 1));
        assert!(boxes.start.begin().is_none());
        assert_eq!(boxes.end.begin(), Some(Point::new(1, 1)));
        assert_eq!(boxes.iter().count(), 2);
        boxes.clear();
        assert_eq!(boxes, Boxes::default());
    }
}
