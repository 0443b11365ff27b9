//! Fixed aspect-ratio constraint for interactive drags.
//!
//! While the user drags a box, the free corner can describe any shape.
//! [`constrain_aspect`] pulls one coordinate of that corner back toward the
//! anchor so the spanned rectangle has exactly the target ratio. Only one
//! axis is ever shortened; the result always fits inside the drag envelope.

use std::str::FromStr;

use kenburns_common::error::KenBurnsError;
use serde::{Deserialize, Serialize};

use crate::point::Point;

/// Tolerance for comparing the drag height against the ideal height.
/// Near-equal values take the width branch.
const RATIO_EPSILON: f64 = 1e-9;

/// A strictly positive, finite width-over-height ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct AspectRatio(f64);

impl AspectRatio {
    /// 16:9, the 1080p frame shape.
    pub const WIDESCREEN: AspectRatio = AspectRatio(16.0 / 9.0);

    pub fn new(ratio: f64) -> Option<Self> {
        (ratio.is_finite() && ratio > 0.0).then_some(Self(ratio))
    }

    pub fn from_dimensions(width: u32, height: u32) -> Option<Self> {
        if height == 0 {
            return None;
        }
        Self::new(width as f64 / height as f64)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for AspectRatio {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        AspectRatio::new(value).ok_or_else(|| format!("aspect ratio must be > 0, got {value}"))
    }
}

impl From<AspectRatio> for f64 {
    fn from(ratio: AspectRatio) -> f64 {
        ratio.0
    }
}

/// Parses `W:H`, `W/H`, or a bare decimal ratio.
impl FromStr for AspectRatio {
    type Err = KenBurnsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = match s.split_once([':', '/']) {
            Some((w, h)) => {
                let w: f64 = w.trim().parse().map_err(|_| bad_ratio(s))?;
                let h: f64 = h.trim().parse().map_err(|_| bad_ratio(s))?;
                if h == 0.0 {
                    return Err(bad_ratio(s));
                }
                w / h
            }
            None => s.parse().map_err(|_| bad_ratio(s))?,
        };
        AspectRatio::new(parsed).ok_or_else(|| bad_ratio(s))
    }
}

fn bad_ratio(s: &str) -> KenBurnsError {
    KenBurnsError::invalid(format!("invalid aspect ratio {s:?} (expected e.g. 16:9)"))
}

/// Return a new free corner such that `anchor`..`free` spans `ratio` exactly.
///
/// Compares the dragged height with the height the dragged width implies.
/// If the drag is too tall, the y offset is shortened; otherwise the x
/// offset is. The direction of the drag on the adjusted axis is kept.
pub fn constrain_aspect(anchor: Point, free: Point, ratio: AspectRatio) -> Point {
    let dx = free.x as i64 - anchor.x as i64;
    let dy = free.y as i64 - anchor.y as i64;
    let cw = dx.unsigned_abs() as f64;
    let ch = dy.unsigned_abs() as f64;

    let desired_height = cw / ratio.value();
    let desired_width = ch * ratio.value();

    if ch > desired_height + RATIO_EPSILON {
        let magnitude = shortened(desired_height, dy.unsigned_abs());
        Point::new(free.x, offset(anchor.y, dy, magnitude))
    } else {
        let magnitude = shortened(desired_width, dx.unsigned_abs());
        Point::new(offset(anchor.x, dx, magnitude), free.y)
    }
}

/// Round up to a whole pixel, never past the dragged extent.
///
/// Rounding up in both branches makes a constrained corner a fixed point:
/// feeding it back in selects the same side and the same length.
fn shortened(desired: f64, available: u64) -> i64 {
    ((desired - RATIO_EPSILON).ceil().max(0.0) as u64).min(available) as i64
}

fn offset(origin: i32, signed_delta: i64, magnitude: i64) -> i32 {
    let value = if signed_delta < 0 {
        origin as i64 - magnitude
    } else {
        origin as i64 + magnitude
    };
    value as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn envelope(anchor: Point, p: Point) -> (u32, u32) {
        (anchor.x.abs_diff(p.x), anchor.y.abs_diff(p.y))
    }

    #[test]
    fn test_wide_drag_adjusts_width() {
        let anchor = Point::new(0, 0);
        let free = constrain_aspect(anchor, Point::new(200, 50), AspectRatio::WIDESCREEN);
        assert!(free.x == 88 || free.x == 89, "got {free:?}");
        assert_eq!(free.y, 50);
    }

    #[test]
    fn test_tall_drag_adjusts_height() {
        let anchor = Point::new(100, 100);
        let free = constrain_aspect(anchor, Point::new(260, 400), AspectRatio::WIDESCREEN);
        assert_eq!(free, Point::new(260, 190));
    }

    #[test]
    fn test_direction_is_preserved() {
        let anchor = Point::new(500, 500);
        let free = constrain_aspect(anchor, Point::new(340, 100), AspectRatio::WIDESCREEN);
        assert_eq!(free, Point::new(340, 410));

        let free = constrain_aspect(anchor, Point::new(100, 440), AspectRatio::WIDESCREEN);
        assert_eq!(free.y, 440);
        assert!(free.x < anchor.x);
        assert_eq!(anchor.x - free.x, 107);
    }

    #[test]
    fn test_exact_ratio_takes_width_branch_unchanged() {
        let anchor = Point::new(10, 10);
        let exact = Point::new(170, 100);
        assert_eq!(
            constrain_aspect(anchor, exact, AspectRatio::WIDESCREEN),
            exact
        );
    }

    #[test]
    fn test_short_height_round_trips() {
        let anchor = Point::new(0, 0);
        let once = constrain_aspect(anchor, Point::new(6, 100), AspectRatio::WIDESCREEN);
        assert_eq!(once, Point::new(6, 4));
        assert_eq!(constrain_aspect(anchor, once, AspectRatio::WIDESCREEN), once);
    }

    #[test]
    fn test_zero_drag_collapses_to_anchor() {
        let anchor = Point::new(4, 4);
        assert_eq!(
            constrain_aspect(anchor, anchor, AspectRatio::WIDESCREEN),
            anchor
        );
        let flat = constrain_aspect(anchor, Point::new(50, 4), AspectRatio::WIDESCREEN);
        assert_eq!(flat, anchor);
    }

    #[test]
    fn test_parse_ratio() {
        let r: AspectRatio = "16:9".parse().unwrap();
        assert!((r.value() - 16.0 / 9.0).abs() < 1e-12);
        let r: AspectRatio = "4/3".parse().unwrap();
        assert!((r.value() - 4.0 / 3.0).abs() < 1e-12);
        let r: AspectRatio = "2.35".parse().unwrap();
        assert!((r.value() - 2.35).abs() < 1e-12);
        assert!("16:0".parse::<AspectRatio>().is_err());
        assert!("-1".parse::<AspectRatio>().is_err());
        assert!("wide".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn test_ratio_serde() {
        let json = serde_json::to_string(&AspectRatio::new(2.0).unwrap()).unwrap();
        assert_eq!(json, "2.0");
        assert!(serde_json::from_str::<AspectRatio>("0.0").is_err());
    }

    proptest! {
        #[test]
        fn prop_never_grows_envelope(
            ax in -2000i32..2000, ay in -2000i32..2000,
            fx in -2000i32..2000, fy in -2000i32..2000,
            ratio in 0.2f64..5.0,
        ) {
            let anchor = Point::new(ax, ay);
            let free = Point::new(fx, fy);
            let ratio = AspectRatio::new(ratio).unwrap();
            let constrained = constrain_aspect(anchor, free, ratio);
            let (w0, h0) = envelope(anchor, free);
            let (w1, h1) = envelope(anchor, constrained);
            prop_assert!(w1 <= w0);
            prop_assert!(h1 <= h0);
        }

        #[test]
        fn prop_only_one_axis_moves(
            ax in -2000i32..2000, ay in -2000i32..2000,
            fx in -2000i32..2000, fy in -2000i32..2000,
        ) {
            let anchor = Point::new(ax, ay);
            let free = Point::new(fx, fy);
            let c = constrain_aspect(anchor, free, AspectRatio::WIDESCREEN);
            prop_assert!(c.x == free.x || c.y == free.y);
        }

        #[test]
        fn prop_constrained_corner_is_fixed_point(
            ax in -2000i32..2000, ay in -2000i32..2000,
            fx in -2000i32..2000, fy in -2000i32..2000,
            ratio in prop::sample::select(vec![16.0 / 9.0, 4.0 / 3.0, 1.0, 21.0 / 9.0, 9.0 / 16.0]),
        ) {
            let anchor = Point::new(ax, ay);
            let ratio = AspectRatio::new(ratio).unwrap();
            let once = constrain_aspect(anchor, Point::new(fx, fy), ratio);
            prop_assert_eq!(constrain_aspect(anchor, once, ratio), once);
        }

        #[test]
        fn prop_exact_ratio_is_unchanged(
            ax in -2000i32..2000, ay in -2000i32..2000,
            k in 1i32..60,
            flip_x in any::<bool>(), flip_y in any::<bool>(),
        ) {
            let anchor = Point::new(ax, ay);
            let dx = if flip_x { -16 * k } else { 16 * k };
            let dy = if flip_y { -9 * k } else { 9 * k };
            let free = Point::new(ax + dx, ay + dy);
            prop_assert_eq!(constrain_aspect(anchor, free, AspectRatio::WIDESCREEN), free);
        }
    }
}
