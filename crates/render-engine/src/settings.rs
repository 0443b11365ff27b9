//! Output settings.

use std::str::FromStr;

use kenburns_common::error::KenBurnsError;
use kenburns_common::RenderDefaults;
use kenburns_geometry::Size;
use serde::{Deserialize, Serialize};

/// Container/codec pair written by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    #[default]
    #[serde(rename = "mp4-h264")]
    Mp4H264,
    #[serde(rename = "mp4-h265")]
    Mp4H265,
    #[serde(rename = "gif")]
    Gif,
    #[serde(rename = "webm")]
    Webm,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Mp4H264 => "mp4-h264",
            ExportFormat::Mp4H265 => "mp4-h265",
            ExportFormat::Gif => "gif",
            ExportFormat::Webm => "webm",
        }
    }

    /// File extension of the container.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Mp4H264 | ExportFormat::Mp4H265 => "mp4",
            ExportFormat::Gif => "gif",
            ExportFormat::Webm => "webm",
        }
    }

    /// Chroma-subsampled codecs reject odd frame sizes.
    pub fn needs_even_dimensions(self) -> bool {
        !matches!(self, ExportFormat::Gif)
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = KenBurnsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp4-h264" | "mp4" | "h264" => Ok(ExportFormat::Mp4H264),
            "mp4-h265" | "h265" | "hevc" => Ok(ExportFormat::Mp4H265),
            "gif" => Ok(ExportFormat::Gif),
            "webm" => Ok(ExportFormat::Webm),
            other => Err(KenBurnsError::unsupported(format!(
                "unknown export format {other:?} (expected mp4-h264, mp4-h265, gif or webm)"
            ))),
        }
    }
}

/// Encoder settings for one export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncodeSettings {
    pub format: ExportFormat,

    /// Output frame size in pixels.
    pub output: Size,

    /// Output frame rate.
    pub fps: u32,

    /// Video bitrate in kbps.
    pub video_bitrate_kbps: u32,
}

impl EncodeSettings {
    pub fn new(format: ExportFormat, output: Size, fps: u32) -> Self {
        Self {
            format,
            output,
            fps,
            video_bitrate_kbps: 8000,
        }
    }

    /// Settings seeded from the user's render defaults.
    pub fn from_defaults(defaults: &RenderDefaults, output: Size) -> Result<Self, KenBurnsError> {
        Ok(Self {
            format: defaults.format.parse()?,
            output,
            fps: defaults.fps,
            video_bitrate_kbps: defaults.video_bitrate_kbps,
        })
    }

    /// Output size the encoder will actually produce.
    pub fn encoded_size(&self) -> Size {
        if self.format.needs_even_dimensions() {
            even_size(self.output)
        } else {
            self.output
        }
    }
}

/// Round both dimensions down to even numbers (minimum 2).
pub fn even_size(size: Size) -> Size {
    Size::new((size.width & !1).max(2), (size.height & !1).max(2))
}
