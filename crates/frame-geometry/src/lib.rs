//! Frame Geometry for Camera Previews
//!
//! Computes how a captured frame is placed on a display surface:
//! - Cover-fit placement (scale + centering crop)
//! - Surface pixel sizing against the viewport and pixel density
//! - Size inversion after a 90° device rotation

pub mod frame;
pub mod viewport;

pub use frame::{cover_fit, FramePlacement};
pub use viewport::{invert, surface_metrics, SurfaceMetrics, SurfaceSize, UiOrientation, Viewport};

use thiserror::Error;

/// Geometry error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("{field} must be a finite positive number, got {value}")]
    InvalidDimension { field: &'static str, value: f64 },
}

/// Check that a dimension is usable for scaling
pub(crate) fn check_dimension(field: &'static str, value: f64) -> Result<f64, GeometryError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GeometryError::InvalidDimension { field, value })
    }
}
