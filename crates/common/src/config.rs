//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Display surface the image is fitted into while editing.
    pub display: DisplayConfig,

    /// Default render parameters.
    pub render: RenderDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Editing surface geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Surface width in display pixels.
    pub width: u32,

    /// Surface height in display pixels.
    pub height: u32,

    /// Aspect lock applied while dragging, e.g. "16:9". `None` draws freehand.
    pub aspect_lock: Option<String>,
}

/// Default render parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderDefaults {
    /// Output frame rate.
    pub fps: u32,

    /// Clip duration in seconds.
    pub duration_secs: f64,

    /// End scale for the centered zoom (1.2 = 20% closer at the end).
    pub zoom_factor: f64,

    /// Output format name ("mp4-h264", "mp4-h265", "gif", "webm").
    pub format: String,

    /// Target video bitrate.
    pub video_bitrate_kbps: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "kenburns=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        // Half of a 1080p frame.
        Self {
            width: 960,
            height: 540,
            aspect_lock: Some("16:9".to_string()),
        }
    }
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            fps: 30,
            duration_secs: 5.0,
            zoom_factor: 1.2,
            format: "mp4-h264".to_string(),
            video_bitrate_kbps: 8000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match Self::from_json(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Parse a config document. Missing fields take their defaults.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("kenburns").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_editor_surface() {
        let config = AppConfig::default();
        assert_eq!(config.display.width, 960);
        assert_eq!(config.display.height, 540);
        assert_eq!(config.display.aspect_lock.as_deref(), Some("16:9"));
        assert_eq!(config.render.fps, 30);
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = AppConfig::from_json(r#"{"render":{"fps":24}}"#).unwrap();
        assert_eq!(config.render.fps, 24);
        assert_eq!(config.render.format, "mp4-h264");
        assert_eq!(config.display.width, 960);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_null_aspect_lock_disables_constraint() {
        let config = AppConfig::from_json(r#"{"display":{"aspect_lock":null}}"#).unwrap();
        assert!(config.display.aspect_lock.is_none());
    }
}
