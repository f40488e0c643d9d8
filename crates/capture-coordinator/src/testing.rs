//! Test doubles shared by the coordinator and session tests

use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{ImageFormat, Rgba, RgbaImage};

use crate::engine::{CaptureEngine, EngineError, EngineReply, FrameSender};
use crate::options::{CameraFacing, CaptureOptions};

/// Engine that records commands and exposes the frame sender it was given
#[derive(Default)]
pub(crate) struct FakeEngine {
    pub sink: Arc<Mutex<Option<FrameSender>>>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_start: bool,
    pub fail_switch: bool,
}

impl FakeEngine {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl CaptureEngine for FakeEngine {
    async fn start_capture(
        &mut self,
        options: &CaptureOptions,
        frames: FrameSender,
    ) -> Result<EngineReply, EngineError> {
        self.record(format!("start:{}", options.delivery));
        if self.fail_start {
            return Err(EngineError::PermissionDenied);
        }
        *self.sink.lock().unwrap() = Some(frames);
        Ok(EngineReply::ok())
    }

    async fn stop_capture(&mut self) -> Result<EngineReply, EngineError> {
        self.record("stop".to_string());
        self.sink.lock().unwrap().take();
        Ok(EngineReply::ok())
    }

    async fn flash_mode(&mut self, enabled: bool) -> Result<EngineReply, EngineError> {
        self.record(format!("flash:{}", enabled));
        Ok(EngineReply::ok())
    }

    async fn camera_position(&mut self, facing: CameraFacing) -> Result<EngineReply, EngineError> {
        self.record(format!("camera:{}", facing.as_str()));
        if self.fail_switch {
            return Err(EngineError::Rejected {
                command: "cameraPosition",
                reason: "no back camera".to_string(),
            });
        }
        Ok(EngineReply::ok())
    }
}

/// Base64 PNG of a solid image
pub(crate) fn png_data(width: u32, height: u32) -> String {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    STANDARD.encode(out.into_inner())
}
