//! Capture engine seam
//!
//! The engine owns the physical camera. It streams [`CapturePayload`]s into the
//! sender handed over on start and answers control commands asynchronously.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::options::{CameraFacing, CaptureOptions};
use crate::payload::CapturePayload;

/// Channel the engine pushes frames into
pub type FrameSender = mpsc::Sender<CapturePayload>;

/// Engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Camera unavailable: {0}")]
    Unavailable(String),

    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("{command} rejected: {reason}")]
    Rejected { command: &'static str, reason: String },

    #[error("Capture is not running")]
    NotStreaming,
}

/// Successful engine answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineReply {
    pub message: String,
}

impl EngineReply {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    pub fn ok() -> Self {
        Self::new("OK")
    }
}

/// Native capture engine
pub trait CaptureEngine: Send {
    /// Begin streaming frames into `frames`
    fn start_capture(
        &mut self,
        options: &CaptureOptions,
        frames: FrameSender,
    ) -> impl Future<Output = Result<EngineReply, EngineError>> + Send;

    fn stop_capture(&mut self) -> impl Future<Output = Result<EngineReply, EngineError>> + Send;

    /// Switch the torch
    fn flash_mode(&mut self, enabled: bool) -> impl Future<Output = Result<EngineReply, EngineError>> + Send;

    /// Switch between front and back camera
    fn camera_position(
        &mut self,
        facing: CameraFacing,
    ) -> impl Future<Output = Result<EngineReply, EngineError>> + Send;
}
