//! Viewport, surface sizing and orientation

use serde::{Deserialize, Serialize};

use crate::{check_dimension, GeometryError};

/// UI orientation as seen by the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiOrientation {
    Portrait,
    #[default]
    Landscape,
}

impl UiOrientation {
    /// Derive the orientation from a device rotation angle in degrees.
    ///
    /// Devices that do not report an angle are treated as landscape.
    pub fn from_angle(angle: Option<i32>) -> Self {
        match angle {
            Some(a) if a % 180 == 0 => UiOrientation::Portrait,
            _ => UiOrientation::Landscape,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UiOrientation::Portrait => "portrait",
            UiOrientation::Landscape => "landscape",
        }
    }
}

/// Logical (CSS pixel) size of a surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Validate both dimensions (finite and positive)
    pub fn validated(self) -> Result<Self, GeometryError> {
        check_dimension("width", self.width)?;
        check_dimension("height", self.height)?;
        Ok(self)
    }

    pub fn is_valid(&self) -> bool {
        self.validated().is_ok()
    }

    /// Size scaled uniformly (thumbnail derivation)
    pub fn scaled(&self, ratio: f64) -> Self {
        Self::new(self.width * ratio, self.height * ratio)
    }

    /// Size with width and height exchanged
    pub fn swapped(&self) -> Self {
        Self::new(self.height, self.width)
    }

    /// Whether both dimensions reach or exceed the viewport
    pub fn fills(&self, viewport: &Viewport) -> bool {
        self.width >= viewport.width && self.height >= viewport.height
    }
}

/// Display viewport the surfaces live in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Inner width in logical pixels
    pub width: f64,
    /// Inner height in logical pixels
    pub height: f64,
    /// Device pixels per logical pixel
    pub pixel_ratio: f64,
    /// Device rotation in degrees, if the platform reports one
    pub angle: Option<i32>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            pixel_ratio: 1.0,
            angle: None,
        }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    pub fn with_angle(mut self, angle: i32) -> Self {
        self.angle = Some(angle);
        self
    }

    /// Effective pixel density (1.0 when unknown)
    pub fn density(&self) -> f64 {
        if self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0 {
            self.pixel_ratio
        } else {
            1.0
        }
    }

    pub fn orientation(&self) -> UiOrientation {
        UiOrientation::from_angle(self.angle)
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.height)
    }

    /// The same display after a quarter turn
    pub fn rotated(&self) -> Self {
        Self {
            width: self.height,
            height: self.width,
            pixel_ratio: self.pixel_ratio,
            angle: Some((self.angle.unwrap_or(90) + 90) % 360),
        }
    }
}

/// Backing-store and logical size of a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMetrics {
    /// Backing-store width in device pixels
    pub pixel_width: u32,
    /// Backing-store height in device pixels
    pub pixel_height: u32,
    /// Displayed width in logical pixels
    pub css_width: f64,
    /// Displayed height in logical pixels
    pub css_height: f64,
}

fn fit_dimension(logical: f64, bound: f64, fullscreen: bool) -> f64 {
    if !fullscreen && logical <= bound {
        logical
    } else {
        bound
    }
}

/// Compute surface metrics for a logical size.
///
/// Each dimension keeps its logical value when the surface is not fullscreen and the
/// value fits the viewport, and falls back to the viewport dimension otherwise. The
/// backing store is the logical size times the pixel density, truncated to whole
/// pixels.
pub fn surface_metrics(size: &SurfaceSize, fullscreen: bool, viewport: &Viewport) -> SurfaceMetrics {
    let density = viewport.density();
    let css_width = fit_dimension(size.width, viewport.width, fullscreen);
    let css_height = fit_dimension(size.height, viewport.height, fullscreen);

    SurfaceMetrics {
        pixel_width: (css_width * density) as u32,
        pixel_height: (css_height * density) as u32,
        css_width,
        css_height,
    }
}

/// Recompute a logical size after a 90° rotation.
///
/// `viewport` is the viewport after the rotation. Fullscreen surfaces take it as is;
/// fixed surfaces swap their own dimensions, clamped to it.
pub fn invert(size: &SurfaceSize, fullscreen: bool, viewport: &Viewport) -> SurfaceSize {
    if fullscreen {
        return viewport.size();
    }
    SurfaceSize::new(
        fit_dimension(size.height, viewport.width, false),
        fit_dimension(size.width, viewport.height, false),
    )
}
