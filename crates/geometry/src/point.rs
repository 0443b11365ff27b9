//! Integer point and size primitives.

use std::ops::{Add, Sub};

use kenburns_common::error::KenBurnsError;
use serde::{Deserialize, Serialize};

/// A pixel position in display or image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Saturates at the `i32` range.
impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

/// Saturates at the `i32` range.
impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height, if the size is non-empty.
    pub fn aspect(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.width as f64 / self.height as f64)
        }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Parses `WIDTHxHEIGHT`, e.g. `1920x1080`.
impl std::str::FromStr for Size {
    type Err = KenBurnsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(|c: char| c == 'x' || c == 'X')
            .ok_or_else(|| KenBurnsError::invalid(format!("expected WIDTHxHEIGHT but got {s:?}")))?;
        let dim = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|e| KenBurnsError::invalid(format!("bad dimension {v:?}: {e}")))
        };
        Ok(Size::new(dim(w)?, dim(h)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(10, 20);
        let b = Point::new(3, 25);
        assert_eq!(a - b, Point::new(7, -5));
        assert_eq!(a + b, Point::new(13, 45));
        assert_eq!(Point::new(i32::MIN, 0) - Point::new(1, 0), Point::new(i32::MIN, 0));
        assert_eq!(Point::new(i32::MAX, 0) + Point::new(1, 0), Point::new(i32::MAX, 0));
    }

    #[test]
    fn test_size_aspect() {
        assert_eq!(Size::new(1920, 1080).aspect(), Some(16.0 / 9.0));
        assert_eq!(Size::new(0, 1080).aspect(), None);
        assert_eq!(Size::new(640, 480).to_string(), "640x480");
    }

    #[test]
    fn test_size_parse() {
        assert_eq!("960x540".parse::<Size>().unwrap(), Size::new(960, 540));
        assert_eq!("1280X720".parse::<Size>().unwrap(), Size::new(1280, 720));
        assert!("960*540".parse::<Size>().is_err());
        assert!("x540".parse::<Size>().is_err());
    }
}
