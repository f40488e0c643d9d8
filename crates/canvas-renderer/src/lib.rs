//! Preview Renderer
//!
//! Draws captured camera frames into a preview surface:
//! - Coalescing single-slot buffer (freshest frame wins)
//! - At most one decode in flight per surface
//! - Cover-fit placement with orientation-aware sizing
//! - Lifecycle notifications through the shared event bus

pub mod decoder;
pub mod payload;
pub mod renderer;
pub mod surface;

pub use decoder::{DecodedImage, ImageDecoder, ImageFileDecoder};
pub use payload::{DeliveryMode, ImagePayload, ImageSource};
pub use renderer::{DecodeJob, DecodePhase, DecodeTicket, DrawHook, RenderStats, Renderer, SettleOutcome};
pub use surface::{RasterSurface, Surface};

pub use event_bus::SurfaceRole;

use thiserror::Error;

/// Decode error types
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Image could not be decoded: {0}")]
    Image(#[from] image::ImageError),

    #[error("Inline data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Decoded image has no pixels")]
    Empty,

    #[error("Decode timed out after {0}ms")]
    Timeout(u64),

    #[error("Decode worker failed: {0}")]
    Worker(String),
}
