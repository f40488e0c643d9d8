//! Simulated capture engine
//!
//! Generates a moving test pattern at the requested frame rate and delivers it
//! the way a native camera plugin would: JPEG files in a scratch directory or
//! inline base64, each with an optional thumbnail.

use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use canvas_renderer::{DeliveryMode, ImagePayload};
use capture_coordinator::{
    CameraFacing, CaptureEngine, CaptureOptions, CapturePayload, EngineError, EngineReply, FrameSender,
};
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgb, RgbImage};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Frame generator settings captured at start
#[derive(Debug, Clone)]
struct StreamSettings {
    width: u32,
    height: u32,
    fps: u32,
    mode: DeliveryMode,
    thumbnail_ratio: Option<f64>,
    facing: CameraFacing,
}

impl StreamSettings {
    fn from_options(options: &CaptureOptions) -> Self {
        let capture = options.capture.filter(|size| size.is_valid());
        let (width, height) = capture
            .map(|size| (size.width as u32, size.height as u32))
            .unwrap_or((352, 288));
        Self {
            width: width.max(1),
            height: height.max(1),
            fps: options.fps.max(1),
            mode: options.delivery,
            thumbnail_ratio: options.has_thumbnail.then(|| options.effective_thumbnail_ratio()),
            facing: options.camera_facing,
        }
    }
}

/// Capture engine producing synthetic frames
#[derive(Debug)]
pub struct SimulatedEngine {
    scratch_dir: PathBuf,
    facing: CameraFacing,
    flash: bool,
    stream: Option<JoinHandle<()>>,
}

impl SimulatedEngine {
    /// Frames are written under `scratch_dir` in file mode
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            facing: CameraFacing::Front,
            flash: false,
            stream: None,
        }
    }

    /// Torch state as last requested
    pub fn torch_on(&self) -> bool {
        self.flash
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn halt(&mut self) -> bool {
        match self.stream.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

impl CaptureEngine for SimulatedEngine {
    async fn start_capture(
        &mut self,
        options: &CaptureOptions,
        frames: FrameSender,
    ) -> Result<EngineReply, EngineError> {
        if options.delivery == DeliveryMode::File {
            std::fs::create_dir_all(&self.scratch_dir).map_err(|e| {
                EngineError::Unavailable(format!("scratch directory {}: {}", self.scratch_dir.display(), e))
            })?;
        }
        self.halt();

        let mut settings = StreamSettings::from_options(options);
        settings.facing = self.facing;
        self.flash = options.flash_mode;
        info!(
            "Simulated camera streaming {}x{} at {} fps ({} mode)",
            settings.width, settings.height, settings.fps, settings.mode
        );
        self.stream = Some(tokio::spawn(stream_frames(settings, self.scratch_dir.clone(), frames)));
        Ok(EngineReply::ok())
    }

    async fn stop_capture(&mut self) -> Result<EngineReply, EngineError> {
        if self.halt() {
            info!("Simulated camera stopped");
        }
        Ok(EngineReply::ok())
    }

    async fn flash_mode(&mut self, enabled: bool) -> Result<EngineReply, EngineError> {
        if !self.is_streaming() {
            return Err(EngineError::NotStreaming);
        }
        self.flash = enabled;
        Ok(EngineReply::ok())
    }

    async fn camera_position(&mut self, facing: CameraFacing) -> Result<EngineReply, EngineError> {
        // The pattern is tinted at start; switching takes effect on the next start
        self.facing = facing;
        Ok(EngineReply::ok())
    }
}

async fn stream_frames(settings: StreamSettings, scratch_dir: PathBuf, frames: FrameSender) {
    let mut ticker = time::interval(Duration::from_secs_f64(1.0 / settings.fps as f64));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut sequence: u64 = 0;

    loop {
        ticker.tick().await;
        sequence += 1;

        let job_settings = settings.clone();
        let dir = scratch_dir.clone();
        let produced = tokio::task::spawn_blocking(move || produce_frame(&job_settings, &dir, sequence)).await;

        let payload = match produced {
            Ok(Ok(payload)) => payload,
            Ok(Err(e)) => {
                warn!("Frame {} could not be produced: {}", sequence, e);
                continue;
            }
            Err(e) => {
                warn!("Frame {} worker failed: {}", sequence, e);
                continue;
            }
        };

        match frames.try_send(payload) {
            Ok(()) => {}
            Err(tokio::sync::mpsc::error::TrySendError::Full(_)) => {
                debug!("Preview busy, frame {} dropped", sequence);
            }
            Err(tokio::sync::mpsc::error::TrySendError::Closed(_)) => break,
        }
    }
}

fn produce_frame(settings: &StreamSettings, dir: &std::path::Path, sequence: u64) -> image::ImageResult<CapturePayload> {
    let full = test_pattern(settings.width, settings.height, sequence, settings.facing);
    let timestamp = chrono::Utc::now().timestamp_millis();

    let fullsize = encode(&full, settings.mode, dir, sequence, "fullsize")?;
    let thumbnail = match settings.thumbnail_ratio {
        Some(ratio) => {
            let width = ((settings.width as f64 * ratio) as u32).max(1);
            let height = ((settings.height as f64 * ratio) as u32).max(1);
            let small = imageops::resize(&full, width, height, FilterType::Triangle);
            Some(encode(&small, settings.mode, dir, sequence, "thumbnail")?)
        }
        None => None,
    };

    let stamp = |mut image: ImagePayload| {
        image.rotation = Some(0);
        image.timestamp = Some(timestamp);
        image
    };
    Ok(CapturePayload::new(stamp(fullsize), thumbnail.map(stamp)))
}

fn encode(
    img: &RgbImage,
    mode: DeliveryMode,
    dir: &std::path::Path,
    sequence: u64,
    label: &str,
) -> image::ImageResult<ImagePayload> {
    match mode {
        DeliveryMode::File => {
            // Rotate over a few files per surface so the directory stays small
            let path = dir.join(format!("frame-{}-{}.jpg", sequence % 4, label));
            img.save_with_format(&path, ImageFormat::Jpeg)?;
            Ok(ImagePayload::from_file(path.to_string_lossy()))
        }
        DeliveryMode::Data => {
            let mut out = Cursor::new(Vec::new());
            img.write_to(&mut out, ImageFormat::Jpeg)?;
            Ok(ImagePayload::from_data(STANDARD.encode(out.into_inner())))
        }
    }
}

/// Gradient with a bar sweeping left to right
fn test_pattern(width: u32, height: u32, sequence: u64, facing: CameraFacing) -> RgbImage {
    let bar = ((sequence * 8) % width as u64) as u32;
    let tint = match facing {
        CameraFacing::Front => 64,
        CameraFacing::Back => 192,
    };
    RgbImage::from_fn(width, height, |x, y| {
        if x.abs_diff(bar) < 4 {
            Rgb([255, 255, 255])
        } else {
            Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, tint])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_renderer::{ImageDecoder, ImageFileDecoder};
    use tokio::sync::mpsc;

    fn settings(mode: DeliveryMode) -> StreamSettings {
        StreamSettings::from_options(&CaptureOptions {
            delivery: mode,
            capture: Some(frame_geometry::SurfaceSize::new(96.0, 72.0)),
            ..Default::default()
        })
    }

    #[test]
    fn test_settings_from_defaults() {
        let settings = StreamSettings::from_options(&CaptureOptions::default());
        assert_eq!((settings.width, settings.height), (352, 288));
        assert_eq!(settings.fps, 30);
        assert!(settings.thumbnail_ratio.is_some());
    }

    #[test]
    fn test_data_frame_decodes() {
        let settings = settings(DeliveryMode::Data);
        let payload = produce_frame(&settings, &std::env::temp_dir(), 1).unwrap();

        let fullsize = payload.fullsize().unwrap();
        assert!(fullsize.timestamp.is_some());
        let img = ImageFileDecoder.decode(&fullsize.source(DeliveryMode::Data).unwrap()).unwrap();
        assert_eq!((img.width(), img.height()), (96, 72));

        let thumbnail = payload.thumbnail().unwrap();
        let img = ImageFileDecoder.decode(&thumbnail.source(DeliveryMode::Data).unwrap()).unwrap();
        assert_eq!((img.width(), img.height()), (16, 12));
    }

    #[test]
    fn test_file_frame_written() {
        let dir = std::env::temp_dir().join(format!("canvascam-preview-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let payload = produce_frame(&settings(DeliveryMode::File), &dir, 3).unwrap();
        let source = payload.fullsize().unwrap().source(DeliveryMode::File).unwrap();
        assert!(ImageFileDecoder.decode(&source).is_ok());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_engine_streams_until_stopped() {
        let mut engine = SimulatedEngine::new(std::env::temp_dir());
        let (tx, mut rx) = mpsc::channel(4);

        engine.start_capture(&CaptureOptions::inline_data(), tx).await.unwrap();
        let payload = rx.recv().await.unwrap();
        assert!(payload.fullsize().unwrap().has_resource(DeliveryMode::Data));
        assert!(engine.flash_mode(true).await.is_ok());
        assert!(engine.torch_on());

        engine.stop_capture().await.unwrap();
        assert!(!engine.is_streaming());
        assert!(matches!(engine.flash_mode(false).await, Err(EngineError::NotStreaming)));
    }
}
