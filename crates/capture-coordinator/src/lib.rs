//! Capture Coordinator
//!
//! Glue between the native capture engine and the preview renderers:
//! - Typed session options with documented defaults
//! - Rendering presets (surface sizes, thumbnail ratio, orientation)
//! - Fan-out of delivered frames to the full-size and thumbnail renderers
//! - An async session loop that ticks renderers and runs their decodes

pub mod coordinator;
pub mod engine;
pub mod options;
pub mod payload;
pub mod session;

#[cfg(test)]
mod testing;

pub use coordinator::{CaptureCallback, CaptureCoordinator, Routed, SessionState, Surfaces};
pub use engine::{CaptureEngine, EngineError, EngineReply, FrameSender};
pub use options::{CameraFacing, CaptureOptions, OptionsError, DEFAULT_THUMBNAIL_RATIO};
pub use payload::{CaptureImages, CaptureOutput, CapturePayload};
pub use session::{CaptureSession, SessionCommand, SessionConfig, SessionHandle};

use thiserror::Error;

/// Coordinator error types
#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("Capture engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Surfaces not initialized")]
    NotInitialized,

    #[error("Capture session is closed")]
    SessionClosed,
}
