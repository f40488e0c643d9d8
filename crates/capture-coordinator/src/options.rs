//! Capture session options

use canvas_renderer::DeliveryMode;
use frame_geometry::SurfaceSize;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Thumbnail size relative to the full-size surface
pub const DEFAULT_THUMBNAIL_RATIO: f64 = 1.0 / 6.0;

/// Options loading error
#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("Failed to load capture options: {0}")]
    Load(#[from] config::ConfigError),
}

/// Which camera streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum CameraFacing {
    #[default]
    Front,
    Back,
}

impl From<String> for CameraFacing {
    fn from(s: String) -> Self {
        match s.as_str() {
            "back" => CameraFacing::Back,
            _ => CameraFacing::Front,
        }
    }
}

impl CameraFacing {
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraFacing::Front => "front",
            CameraFacing::Back => "back",
        }
    }
}

/// Capture session options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureOptions {
    /// Target full-size width (overrides `canvas`)
    pub width: Option<f64>,

    /// Target full-size height (overrides `canvas`)
    pub height: Option<f64>,

    /// Preview surface size
    pub canvas: Option<SurfaceSize>,

    /// Capture resolution requested from the engine
    pub capture: Option<SurfaceSize>,

    /// Frame rate hint
    pub fps: u32,

    /// Payload delivery mode (`file` or `data`)
    #[serde(rename = "use")]
    pub delivery: DeliveryMode,

    /// Torch on while capturing
    pub flash_mode: bool,

    /// Ask the engine for a thumbnail alongside each frame
    pub has_thumbnail: bool,

    /// Thumbnail size relative to the full-size surface
    pub thumbnail_ratio: f64,

    pub camera_facing: CameraFacing,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            width: Some(352.0),
            height: Some(288.0),
            canvas: Some(SurfaceSize::new(352.0, 288.0)),
            capture: Some(SurfaceSize::new(352.0, 288.0)),
            fps: 30,
            delivery: DeliveryMode::File,
            flash_mode: false,
            has_thumbnail: true,
            thumbnail_ratio: DEFAULT_THUMBNAIL_RATIO,
            camera_facing: CameraFacing::Front,
        }
    }
}

impl CaptureOptions {
    /// Preview that fills the viewport
    pub fn fullscreen() -> Self {
        Self {
            width: None,
            height: None,
            canvas: None,
            ..Default::default()
        }
    }

    /// Inline base64 frames, no files written by the engine
    pub fn inline_data() -> Self {
        Self {
            delivery: DeliveryMode::Data,
            ..Default::default()
        }
    }

    /// Load options from an optional file plus `CANVASCAM_*` environment overrides.
    ///
    /// Nested keys use a double underscore, e.g. `CANVASCAM_CANVAS__WIDTH`.
    pub fn load(path: Option<&Path>) -> Result<Self, OptionsError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix("CANVASCAM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Explicit preview size, if configured.
    ///
    /// `width`/`height` win over `canvas`; incomplete or invalid pairs are ignored.
    pub fn preview_size(&self) -> Option<SurfaceSize> {
        let explicit = match (self.width, self.height) {
            (Some(w), Some(h)) => Some(SurfaceSize::new(w, h)),
            _ => None,
        };
        explicit
            .filter(SurfaceSize::is_valid)
            .or_else(|| self.canvas.filter(SurfaceSize::is_valid))
    }

    /// Thumbnail ratio, falling back to the default when unusable
    pub fn effective_thumbnail_ratio(&self) -> f64 {
        if self.thumbnail_ratio.is_finite() && self.thumbnail_ratio > 0.0 {
            self.thumbnail_ratio
        } else {
            DEFAULT_THUMBNAIL_RATIO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CaptureOptions::default();
        assert_eq!(options.fps, 30);
        assert_eq!(options.delivery, DeliveryMode::File);
        assert_eq!(options.camera_facing, CameraFacing::Front);
        assert!(options.has_thumbnail);
        assert!((options.thumbnail_ratio - 1.0 / 6.0).abs() < f64::EPSILON);
        assert_eq!(options.preview_size(), Some(SurfaceSize::new(352.0, 288.0)));
    }

    #[test]
    fn test_explicit_size_wins_over_canvas() {
        let options = CaptureOptions {
            width: Some(640.0),
            height: Some(480.0),
            canvas: Some(SurfaceSize::new(100.0, 100.0)),
            ..Default::default()
        };
        assert_eq!(options.preview_size(), Some(SurfaceSize::new(640.0, 480.0)));

        let options = CaptureOptions {
            width: Some(640.0),
            height: None,
            canvas: Some(SurfaceSize::new(100.0, 100.0)),
            ..Default::default()
        };
        assert_eq!(options.preview_size(), Some(SurfaceSize::new(100.0, 100.0)));
    }

    #[test]
    fn test_fullscreen_has_no_size() {
        assert_eq!(CaptureOptions::fullscreen().preview_size(), None);
    }

    #[test]
    fn test_invalid_thumbnail_ratio_falls_back() {
        let mut options = CaptureOptions::default();
        options.thumbnail_ratio = f64::NAN;
        assert_eq!(options.effective_thumbnail_ratio(), DEFAULT_THUMBNAIL_RATIO);
        options.thumbnail_ratio = -2.0;
        assert_eq!(options.effective_thumbnail_ratio(), DEFAULT_THUMBNAIL_RATIO);
        options.thumbnail_ratio = 0.25;
        assert_eq!(options.effective_thumbnail_ratio(), 0.25);
    }

    #[test]
    fn test_deserialize_partial_json() {
        let json = r#"{"use": "data", "camera_facing": "back", "fps": 15}"#;
        let options: CaptureOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.delivery, DeliveryMode::Data);
        assert_eq!(options.camera_facing, CameraFacing::Back);
        assert_eq!(options.fps, 15);
        assert_eq!(options.width, Some(352.0));
    }

    #[test]
    fn test_unknown_mode_and_facing_normalize() {
        let json = r#"{"use": "stream", "camera_facing": "sideways"}"#;
        let options: CaptureOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.delivery, DeliveryMode::File);
        assert_eq!(options.camera_facing, CameraFacing::Front);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("canvascam-options-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "fps = 24\nuse = \"data\"\nthumbnail_ratio = 0.25\n\n[canvas]\nwidth = 640.0\nheight = 480.0\n",
        )
        .unwrap();

        let options = CaptureOptions::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(options.fps, 24);
        assert_eq!(options.delivery, DeliveryMode::Data);
        assert_eq!(options.thumbnail_ratio, 0.25);
        assert_eq!(options.canvas, Some(SurfaceSize::new(640.0, 480.0)));
        assert_eq!(options.width, Some(352.0));
    }
}
