//! ffmpeg filter expressions.
//!
//! [`ZoomPanFilter`] renders a [`FilterParameters`] pair as a `zoompan`
//! filter over a single still-image input. ffmpeg evaluates the same
//! closed-form motion the interpolator uses, with `on` (the output frame
//! number) standing in for `i` and `d` for the frame count `D`:
//!
//! ```text
//! z = iw / (w1 * (1 + (r - 1) * on / D))     r = w2 / w1
//! x = x1 + (x2 - x1) * on / D
//! y = y1 + (y2 - y1) * on / D
//! ```
//!
//! zoompan shows `1/z` of both input dimensions, so its window always has
//! the input's aspect ratio. When the start box has a different ratio the
//! image is first padded (right or bottom, in black) to a canvas with the
//! box's ratio. Padding keeps image pixels where they are, so `x` and `y`
//! stay in image coordinates and the window comes out `w1*z` by `h1*z`.
//! zoompan still caps zoom to `[1, 10]`.

use kenburns_common::error::{KenBurnsError, KenBurnsResult};
use kenburns_geometry::Size;
use kenburns_interpolator::FilterParameters;

use crate::settings::ExportFormat;

/// Palette pass for GIF output.
const GIF_PALETTE: &str = "split[s0][s1];[s0]palettegen[p];[s1][p]paletteuse";

/// `zoompan` filter for one start/end pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomPanFilter {
    params: FilterParameters,
    source: Size,
    canvas: Size,
    frames: u64,
    fps: u32,
    output: Size,
}

impl ZoomPanFilter {
    pub fn new(
        params: &FilterParameters,
        source: Size,
        fps: u32,
        output: Size,
    ) -> KenBurnsResult<Self> {
        if source.is_empty() {
            return Err(KenBurnsError::invalid(format!(
                "source image {source} has no pixels"
            )));
        }
        let frames = params.frame_count(fps)?;
        Ok(Self {
            params: *params,
            source,
            canvas: padded_canvas(source, params.w1, params.h1),
            frames,
            fps,
            output,
        })
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Size zoompan sees: the source grown on one axis to the start box's
    /// aspect ratio.
    pub fn canvas(&self) -> Size {
        self.canvas
    }

    pub fn zoom_ratio(&self) -> f64 {
        self.params.w2 as f64 / self.params.w1 as f64
    }

    pub fn zoom_expr(&self) -> String {
        format!(
            "iw/({w1}*(1+({r:.6}-1)*on/{d}))",
            w1 = self.params.w1,
            r = self.zoom_ratio(),
            d = self.frames,
        )
    }

    pub fn x_expr(&self) -> String {
        linear_expr(self.params.x1, self.params.x2, self.frames)
    }

    pub fn y_expr(&self) -> String {
        linear_expr(self.params.y1, self.params.y2, self.frames)
    }

    /// Stages that bring the source to the canvas, empty when the ratios
    /// already agree.
    pub fn pad_stages(&self) -> Vec<String> {
        if self.canvas == self.source {
            return Vec::new();
        }
        vec![
            "format=rgb24".to_string(),
            format!(
                "pad={w}:{h}:0:0:color=black",
                w = self.canvas.width,
                h = self.canvas.height
            ),
        ]
    }

    pub fn zoompan_stage(&self) -> String {
        format!(
            "zoompan=z='{z}':x='{x}':y='{y}':d={d}:s={w}x{h}:fps={fps}",
            z = self.zoom_expr(),
            x = self.x_expr(),
            y = self.y_expr(),
            d = self.frames,
            w = self.output.width,
            h = self.output.height,
            fps = self.fps,
        )
    }

    /// Every stage in order, padding first.
    pub fn stages(&self) -> Vec<String> {
        let mut stages = self.pad_stages();
        stages.push(self.zoompan_stage());
        stages
    }

    /// The complete comma-joined filter.
    pub fn to_filter_string(&self) -> String {
        self.stages().join(",")
    }
}

impl std::fmt::Display for ZoomPanFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_filter_string())
    }
}

/// Grow `source` on the one axis that makes its ratio `box_w:box_h`.
fn padded_canvas(source: Size, box_w: u32, box_h: u32) -> Size {
    let (iw, ih) = (source.width as u64, source.height as u64);
    let (bw, bh) = (box_w.max(1) as u64, box_h.max(1) as u64);
    let height = (iw * bh).div_ceil(bw).max(ih);
    let width = (ih * bw).div_ceil(bh).max(iw);
    if iw * bh > ih * bw {
        Size::new(source.width, clamp_u32(height))
    } else if iw * bh < ih * bw {
        Size::new(clamp_u32(width), source.height)
    } else {
        source
    }
}

fn clamp_u32(value: u64) -> u32 {
    value.min(u32::MAX as u64) as u32
}

fn linear_expr(from: i32, to: i32, frames: u64) -> String {
    let delta = to as i64 - from as i64;
    if delta == 0 {
        from.to_string()
    } else {
        format!("{from}+({delta})*on/{frames}")
    }
}

/// Join filter stages into one `-vf` graph, appending any stage the
/// output format needs.
pub fn video_filter_chain(stages: &[String], format: ExportFormat) -> Option<String> {
    let mut parts: Vec<&str> = stages.iter().map(String::as_str).collect();
    if format == ExportFormat::Gif {
        parts.push(GIF_PALETTE);
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kenburns_geometry::Rect;

    fn params() -> FilterParameters {
        FilterParameters::new(Rect::new(0, 0, 100, 100), Rect::new(10, 10, 50, 50), 2.0).unwrap()
    }

    #[test]
    fn test_zoompan_expressions() {
        let filter =
            ZoomPanFilter::new(&params(), Size::new(400, 400), 2, Size::new(640, 360)).unwrap();
        assert_eq!(filter.frames(), 4);
        assert_eq!(filter.zoom_expr(), "iw/(100*(1+(0.500000-1)*on/4))");
        assert_eq!(filter.x_expr(), "0+(10)*on/4");
        assert_eq!(
            filter.to_string(),
            "zoompan=z='iw/(100*(1+(0.500000-1)*on/4))':x='0+(10)*on/4':y='0+(10)*on/4':d=4:s=640x360:fps=2"
        );
    }

    #[test]
    fn test_static_axis_is_a_constant() {
        let params =
            FilterParameters::new(Rect::new(40, 0, 200, 100), Rect::new(40, 30, 200, 100), 1.0)
                .unwrap();
        let filter = ZoomPanFilter::new(&params, Size::new(800, 400), 30, Size::new(200, 100)).unwrap();
        assert_eq!(filter.x_expr(), "40");
        assert_eq!(filter.y_expr(), "0+(30)*on/30");
        assert!((filter.zoom_ratio() - 1.0).abs() < 1e-12);
        assert!(filter.pad_stages().is_empty());
    }

    #[test]
    fn test_wide_box_on_four_three_photo_pads_width() {
        // 711x400 box (16:9) on a 1600x1200 photo
        let params =
            FilterParameters::new(Rect::new(100, 200, 711, 400), Rect::new(300, 300, 356, 200), 1.0)
                .unwrap();
        let filter = ZoomPanFilter::new(&params, Size::new(1600, 1200), 10, Size::new(710, 400))
            .unwrap();
        assert_eq!(filter.canvas(), Size::new(2133, 1200));
        assert_eq!(
            filter.pad_stages(),
            vec!["format=rgb24".to_string(), "pad=2133:1200:0:0:color=black".to_string()]
        );
        assert!(filter
            .to_filter_string()
            .starts_with("format=rgb24,pad=2133:1200:0:0:color=black,zoompan="));

        // First frame: zoompan shows iw/z by ih/z of the canvas.
        let canvas = filter.canvas();
        let z0 = canvas.width as f64 / params.w1 as f64;
        let window_h = canvas.height as f64 / z0;
        assert!((canvas.width as f64 / z0 - 711.0).abs() < 1e-9);
        assert!((window_h - 400.0).abs() < 0.5, "window height {window_h}");
        assert_eq!(filter.x_expr(), "100+(200)*on/10");
    }

    #[test]
    fn test_tall_box_pads_height() {
        let params =
            FilterParameters::new(Rect::new(0, 0, 90, 160), Rect::new(0, 0, 45, 80), 1.0).unwrap();
        let filter =
            ZoomPanFilter::new(&params, Size::new(1920, 1080), 5, Size::new(90, 160)).unwrap();
        assert_eq!(filter.canvas(), Size::new(1920, 3414));
        let z0: f64 = 1920.0 / 90.0;
        assert!((3414.0 / z0 - 160.0).abs() < 0.5);
    }

    #[test]
    fn test_empty_source_is_rejected() {
        assert!(ZoomPanFilter::new(&params(), Size::new(0, 10), 2, Size::new(10, 10)).is_err());
    }

    #[test]
    fn test_zero_fps_is_rejected() {
        assert!(ZoomPanFilter::new(&params(), Size::new(10, 10), 0, Size::new(10, 10)).is_err());
    }

    #[test]
    fn test_filter_chain() {
        assert_eq!(video_filter_chain(&[], ExportFormat::Mp4H264), None);
        assert_eq!(
            video_filter_chain(&["scale=2:2".to_string()], ExportFormat::Webm).as_deref(),
            Some("scale=2:2")
        );
        assert_eq!(
            video_filter_chain(&["scale=2:2".to_string()], ExportFormat::Gif).as_deref(),
            Some("scale=2:2,split[s0][s1];[s0]palettegen[p];[s1][p]paletteuse")
        );
    }
}
