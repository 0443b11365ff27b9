//! Axis-aligned rectangles and corner normalization.

use std::str::FromStr;

use kenburns_common::error::KenBurnsError;
use serde::{Deserialize, Serialize};

use crate::point::{Point, Size};

/// A canonical rectangle: top-left corner plus non-negative extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build the canonical rectangle spanned by two corners given in any order.
    pub fn from_corners(begin: Point, end: Point) -> Self {
        Self {
            x: begin.x.min(end.x),
            y: begin.y.min(end.y),
            width: begin.x.abs_diff(end.x),
            height: begin.y.abs_diff(end.y),
        }
    }

    /// Zero-area rectangles are valid but draw nothing.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Width over height, if non-empty.
    pub fn aspect(&self) -> Option<f64> {
        self.size().aspect()
    }

    /// Whether the rectangle lies entirely inside `[0, bounds)` on both axes.
    pub fn fits_within(&self, bounds: Size) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.right() <= bounds.width as i64
            && self.bottom() <= bounds.height as i64
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

/// Parses `x,y,width,height`.
impl FromStr for Rect {
    type Err = KenBurnsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(KenBurnsError::invalid(format!(
                "expected x,y,width,height but got {s:?}"
            )));
        }
        let coord = |v: &str| {
            v.parse::<i32>()
                .map_err(|e| KenBurnsError::invalid(format!("bad coordinate {v:?}: {e}")))
        };
        let extent = |v: &str| {
            v.parse::<u32>()
                .map_err(|e| KenBurnsError::invalid(format!("bad extent {v:?}: {e}")))
        };
        Ok(Rect::new(
            coord(parts[0])?,
            coord(parts[1])?,
            extent(parts[2])?,
            extent(parts[3])?,
        ))
    }
}

/// Normalize two arbitrary corners into a canonical rectangle.
pub fn normalize(begin: Point, end: Point) -> Rect {
    Rect::from_corners(begin, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_reversed_corners() {
        let rect = normalize(Point::new(10, 10), Point::new(5, 5));
        assert_eq!(rect, Rect::new(5, 5, 5, 5));
    }

    #[test]
    fn test_normalize_mixed_corners() {
        let rect = normalize(Point::new(2, 30), Point::new(12, 4));
        assert_eq!(rect, Rect::new(2, 4, 10, 26));
    }

    #[test]
    fn test_degenerate_is_empty_not_error() {
        let rect = normalize(Point::new(7, 7), Point::new(7, 40));
        assert_eq!(rect.width, 0);
        assert_eq!(rect.height, 33);
        assert!(rect.is_empty());
    }

    #[test]
    fn test_edges_and_fit() {
        let rect = Rect::new(10, 20, 30, 40);
        assert_eq!(rect.right(), 40);
        assert_eq!(rect.bottom(), 60);
        assert!(rect.fits_within(Size::new(40, 60)));
        assert!(!rect.fits_within(Size::new(39, 60)));
        assert!(!Rect::new(-1, 0, 5, 5).fits_within(Size::new(100, 100)));
    }

    #[test]
    fn test_parse() {
        assert_eq!("0, 0,100,50".parse::<Rect>().unwrap(), Rect::new(0, 0, 100, 50));
        assert!("1,2,3".parse::<Rect>().is_err());
        assert!("1,2,-3,4".parse::<Rect>().is_err());
        assert_eq!(Rect::new(1, 2, 3, 4).to_string(), "1,2,3,4");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_commutative(
            ax in -5000i32..5000, ay in -5000i32..5000,
            bx in -5000i32..5000, by in -5000i32..5000,
        ) {
            let a = Point::new(ax, ay);
            let b = Point::new(bx, by);
            prop_assert_eq!(normalize(a, b), normalize(b, a));
        }

        #[test]
        fn prop_normalize_is_idempotent(
            ax in -5000i32..5000, ay in -5000i32..5000,
            bx in -5000i32..5000, by in -5000i32..5000,
        ) {
            let rect = normalize(Point::new(ax, ay), Point::new(bx, by));
            let bottom_right = Point::new(
                rect.x + rect.width as i32,
                rect.y + rect.height as i32,
            );
            prop_assert_eq!(normalize(rect.top_left(), bottom_right), rect);
        }

        #[test]
        fn prop_normalize_spans_both_corners(
            ax in -5000i32..5000, ay in -5000i32..5000,
            bx in -5000i32..5000, by in -5000i32..5000,
        ) {
            let rect = normalize(Point::new(ax, ay), Point::new(bx, by));
            prop_assert_eq!(rect.x, ax.min(bx));
            prop_assert_eq!(rect.right(), ax.max(bx) as i64);
            prop_assert_eq!(rect.bottom(), ay.max(by) as i64);
        }
    }
}
