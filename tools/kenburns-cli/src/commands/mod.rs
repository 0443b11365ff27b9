pub mod check;
pub mod inspect;
pub mod params;
pub mod render;
pub mod replay;
pub mod zoom;

use std::path::{Path, PathBuf};

use clap::Args;
use kenburns_common::config::AppConfig;
use kenburns_geometry::{AspectRatio, DisplaySurface, Rect, Size};
use kenburns_interpolator::FilterParameters;
use kenburns_session::{parse_gestures, ReplayReport, Session};

/// How the start and end boxes are supplied.
#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Gesture script to replay instead of passing rectangles
    #[arg(long, conflicts_with_all = ["start", "end"])]
    pub gestures: Option<PathBuf>,

    /// Start box in image pixels: x,y,width,height
    #[arg(long, requires = "end", allow_hyphen_values = true)]
    pub start: Option<Rect>,

    /// End box in image pixels: x,y,width,height
    #[arg(long, requires = "start", allow_hyphen_values = true)]
    pub end: Option<Rect>,

    /// Editing surface size for gesture scripts, e.g. 960x540
    #[arg(long)]
    pub surface: Option<Size>,

    /// Aspect lock for gesture scripts ("16:9", "4:3", "free")
    #[arg(long)]
    pub aspect: Option<String>,
}

/// Aspect lock from the command line, else from the config. `free`
/// and `none` turn the lock off.
pub fn aspect_lock(config: &AppConfig, flag: Option<&str>) -> anyhow::Result<Option<AspectRatio>> {
    let Some(value) = flag.or(config.display.aspect_lock.as_deref()) else {
        return Ok(None);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "free" | "none" | "off" => Ok(None),
        _ => Ok(Some(value.parse()?)),
    }
}

pub fn surface_size(config: &AppConfig, flag: Option<Size>) -> Size {
    flag.unwrap_or(Size::new(config.display.width, config.display.height))
}

/// A session over the configured surface with `image` already fitted.
pub fn open_session(
    config: &AppConfig,
    image: Size,
    surface: Option<Size>,
    aspect: Option<&str>,
) -> anyhow::Result<Session> {
    let surface = DisplaySurface::at_origin(surface_size(config, surface));
    let mut session = Session::new(surface).with_aspect_lock(aspect_lock(config, aspect)?);
    session.load_image(image)?;
    Ok(session)
}

/// Replay a gesture script file against `session`.
pub fn replay_file(session: &mut Session, script: &Path) -> anyhow::Result<ReplayReport> {
    let content = std::fs::read_to_string(script)
        .map_err(|e| anyhow::anyhow!("Failed to read gesture script {}: {e}", script.display()))?;
    let gestures = parse_gestures(&content)?;
    Ok(ReplayReport::replay(session, &gestures)?)
}

/// Resolve a selection into encoder parameters.
pub fn resolve_selection(
    config: &AppConfig,
    image: Size,
    selection: &SelectionArgs,
    duration_secs: f64,
) -> anyhow::Result<FilterParameters> {
    if let Some(script) = &selection.gestures {
        let mut session = open_session(
            config,
            image,
            selection.surface,
            selection.aspect.as_deref(),
        )?;
        let report = replay_file(&mut session, script)?;
        tracing::debug!(
            completed = report.completed.len(),
            ignored = report.ignored,
            "Selection replayed"
        );
        return Ok(session.to_filter_parameters(duration_secs)?);
    }

    match (selection.start, selection.end) {
        (Some(start), Some(end)) => Ok(FilterParameters::new(start, end, duration_secs)?),
        _ => anyhow::bail!("Pass either --gestures <SCRIPT> or both --start and --end"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(start: Option<Rect>, end: Option<Rect>) -> SelectionArgs {
        SelectionArgs {
            gestures: None,
            start,
            end,
            surface: None,
            aspect: None,
        }
    }

    #[test]
    fn test_aspect_lock_resolution() {
        let config = AppConfig::default();
        let lock = aspect_lock(&config, None).unwrap().unwrap();
        assert!((lock.value() - 16.0 / 9.0).abs() < 1e-12);
        assert!(aspect_lock(&config, Some("free")).unwrap().is_none());
        let four_three = aspect_lock(&config, Some("4:3")).unwrap().unwrap();
        assert!((four_three.value() - 4.0 / 3.0).abs() < 1e-12);
        assert!(aspect_lock(&config, Some("wide")).is_err());
    }

    #[test]
    fn test_explicit_rectangles_resolve() {
        let config = AppConfig::default();
        let params = resolve_selection(
            &config,
            Size::new(1920, 1080),
            &selection(Some(Rect::new(0, 0, 100, 100)), Some(Rect::new(10, 10, 50, 50))),
            2.0,
        )
        .unwrap();
        assert_eq!(params.end_rect(), Rect::new(10, 10, 50, 50));
        assert_eq!(params.frame_count(2).unwrap(), 4);
    }

    #[test]
    fn test_missing_selection_is_an_error() {
        let config = AppConfig::default();
        assert!(resolve_selection(&config, Size::new(10, 10), &selection(None, None), 1.0).is_err());
    }
}
