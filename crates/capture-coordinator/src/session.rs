//! Session driver
//!
//! Runs a [`CaptureCoordinator`] on its own tokio task:
//! - Periodic render ticks
//! - Frame delivery from the capture engine
//! - Decodes on the blocking pool, settled back on the loop
//! - Control commands with oneshot replies

use std::sync::Arc;
use std::time::Duration;

use canvas_renderer::{DecodeError, DecodeJob, DecodeTicket, DecodedImage, ImageDecoder, Surface, SurfaceRole};
use frame_geometry::Viewport;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::coordinator::CaptureCoordinator;
use crate::engine::{CaptureEngine, EngineReply, FrameSender};
use crate::options::{CameraFacing, CaptureOptions};
use crate::payload::CapturePayload;
use crate::CoordinatorError;

type Reply = oneshot::Sender<Result<EngineReply, CoordinatorError>>;

/// Session driver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Render ticks per second
    pub tick_rate_hz: u32,

    /// Frames the engine may queue ahead of the loop
    pub frame_capacity: usize,

    pub command_capacity: usize,

    /// Give up on a decode after this long (None waits forever)
    pub decode_timeout_ms: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            frame_capacity: 4,
            command_capacity: 16,
            decode_timeout_ms: None,
        }
    }
}

impl SessionConfig {
    fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz.max(1) as f64)
    }
}

/// Commands accepted by the session loop
#[derive(Debug)]
pub enum SessionCommand {
    Start { options: CaptureOptions, reply: Reply },
    Stop { reply: Reply },
    FlashMode { enabled: bool, reply: Reply },
    CameraPosition { facing: CameraFacing, reply: Reply },
    /// Device rotated; carries the new viewport
    Orientation(Viewport),
    Shutdown,
}

struct DecodeDone {
    role: SurfaceRole,
    ticket: DecodeTicket,
    result: Result<DecodedImage, DecodeError>,
}

/// Capture session loop
pub struct CaptureSession<S: Surface, E: CaptureEngine, D: ImageDecoder> {
    coordinator: CaptureCoordinator<S, E>,
    decoder: Arc<D>,
    config: SessionConfig,
    commands: mpsc::Receiver<SessionCommand>,
}

impl<S, E, D> CaptureSession<S, E, D>
where
    S: Surface + Send + 'static,
    E: CaptureEngine + 'static,
    D: ImageDecoder,
{
    /// Spawn the loop on the current runtime
    pub fn spawn(coordinator: CaptureCoordinator<S, E>, decoder: Arc<D>, config: SessionConfig) -> SessionHandle<S, E> {
        let (tx, rx) = mpsc::channel(config.command_capacity.max(1));
        let session = Self {
            coordinator,
            decoder,
            config,
            commands: rx,
        };
        let task = tokio::spawn(session.run());
        SessionHandle { commands: tx, task }
    }

    async fn run(self) -> CaptureCoordinator<S, E> {
        let Self {
            mut coordinator,
            decoder,
            config,
            mut commands,
        } = self;

        let (frames_tx, mut frames_rx) = mpsc::channel::<CapturePayload>(config.frame_capacity.max(1));
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<DecodeDone>();

        let mut ticker = time::interval(config.tick_period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Capture session loop started ({} Hz)", config.tick_rate_hz);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    for job in coordinator.tick() {
                        spawn_decode(job, decoder.clone(), done_tx.clone(), config.decode_timeout_ms);
                    }
                }
                Some(payload) = frames_rx.recv() => {
                    coordinator.deliver(payload);
                }
                Some(done) = done_rx.recv() => {
                    coordinator.settle(done.role, done.ticket, done.result);
                }
                command = commands.recv() => match command {
                    None | Some(SessionCommand::Shutdown) => break,
                    Some(command) => dispatch(&mut coordinator, command, &frames_tx).await,
                },
            }
        }

        info!("Capture session loop stopped");
        coordinator
    }
}

async fn dispatch<S: Surface, E: CaptureEngine>(
    coordinator: &mut CaptureCoordinator<S, E>,
    command: SessionCommand,
    frames: &FrameSender,
) {
    match command {
        SessionCommand::Start { options, reply } => {
            let _ = reply.send(coordinator.start(options, frames.clone()).await);
        }
        SessionCommand::Stop { reply } => {
            let _ = reply.send(coordinator.stop().await);
        }
        SessionCommand::FlashMode { enabled, reply } => {
            let _ = reply.send(coordinator.flash_mode(enabled).await);
        }
        SessionCommand::CameraPosition { facing, reply } => {
            let _ = reply.send(coordinator.camera_position(facing).await);
        }
        SessionCommand::Orientation(viewport) => coordinator.on_orientation_change(viewport),
        SessionCommand::Shutdown => {}
    }
}

fn spawn_decode<D: ImageDecoder>(
    job: DecodeJob,
    decoder: Arc<D>,
    done: mpsc::UnboundedSender<DecodeDone>,
    timeout_ms: Option<u64>,
) {
    let DecodeJob { role, ticket, source } = job;
    tokio::spawn(async move {
        let work = tokio::task::spawn_blocking(move || decoder.decode(&source));
        let result = match timeout_ms {
            Some(ms) => match time::timeout(Duration::from_millis(ms), work).await {
                Ok(joined) => flatten(joined),
                Err(_) => {
                    warn!("{} decode exceeded {}ms", role.as_str(), ms);
                    Err(DecodeError::Timeout(ms))
                }
            },
            None => flatten(work.await),
        };
        if done.send(DecodeDone { role, ticket, result }).is_err() {
            debug!("Session gone, dropping {} decode result", role.as_str());
        }
    });
}

fn flatten(joined: Result<Result<DecodedImage, DecodeError>, JoinError>) -> Result<DecodedImage, DecodeError> {
    joined.unwrap_or_else(|e| Err(DecodeError::Worker(e.to_string())))
}

/// Handle to a running capture session
pub struct SessionHandle<S: Surface, E: CaptureEngine> {
    commands: mpsc::Sender<SessionCommand>,
    task: JoinHandle<CaptureCoordinator<S, E>>,
}

impl<S: Surface, E: CaptureEngine> SessionHandle<S, E> {
    async fn request(&self, command: impl FnOnce(Reply) -> SessionCommand) -> Result<EngineReply, CoordinatorError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(command(tx))
            .await
            .map_err(|_| CoordinatorError::SessionClosed)?;
        rx.await.map_err(|_| CoordinatorError::SessionClosed)?
    }

    pub async fn start(&self, options: CaptureOptions) -> Result<EngineReply, CoordinatorError> {
        self.request(|reply| SessionCommand::Start { options, reply }).await
    }

    pub async fn stop(&self) -> Result<EngineReply, CoordinatorError> {
        self.request(|reply| SessionCommand::Stop { reply }).await
    }

    pub async fn flash_mode(&self, enabled: bool) -> Result<EngineReply, CoordinatorError> {
        self.request(|reply| SessionCommand::FlashMode { enabled, reply }).await
    }

    pub async fn camera_position(&self, facing: CameraFacing) -> Result<EngineReply, CoordinatorError> {
        self.request(|reply| SessionCommand::CameraPosition { facing, reply }).await
    }

    /// Report a device rotation
    pub async fn rotate(&self, viewport: Viewport) -> Result<(), CoordinatorError> {
        self.commands
            .send(SessionCommand::Orientation(viewport))
            .await
            .map_err(|_| CoordinatorError::SessionClosed)
    }

    /// Stop the loop and take the coordinator back
    pub async fn shutdown(self) -> Result<CaptureCoordinator<S, E>, CoordinatorError> {
        // The loop may already be gone; the join below reports that
        let _ = self.commands.send(SessionCommand::Shutdown).await;
        self.task.await.map_err(|_| CoordinatorError::SessionClosed)
    }
}
