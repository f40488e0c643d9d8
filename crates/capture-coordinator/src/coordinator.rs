//! Capture coordinator
//!
//! Owns the renderers and the capture engine. All methods run on the session
//! loop; none of them block on image decoding.

use std::sync::Arc;

use canvas_renderer::{
    DecodeError, DecodeJob, DecodeTicket, DecodedImage, DrawHook, Renderer, SettleOutcome, Surface, SurfaceRole,
};
use event_bus::{EventBus, EventData, EventSource, LifecycleEvent, PresetsSnapshot};
use frame_geometry::{SurfaceSize, UiOrientation, Viewport};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::engine::{CaptureEngine, EngineReply, FrameSender};
use crate::options::{CameraFacing, CaptureOptions};
use crate::payload::CapturePayload;
use crate::CoordinatorError;

/// Called with every payload the engine delivers
pub type CaptureCallback = Box<dyn FnMut(&CapturePayload) + Send>;

/// Surfaces handed to [`CaptureCoordinator::initialize`]
#[derive(Debug)]
pub struct Surfaces<S> {
    pub fullsize: S,
    pub thumbnail: Option<S>,
}

/// Capture session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Stopped,
    Streaming,
    /// Streaming, but rendering suspended after a failed camera switch
    Paused,
}

/// Which renderers accepted a delivered payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Routed {
    pub fullsize: bool,
    pub thumbnail: bool,
}

/// Capture coordinator
pub struct CaptureCoordinator<S: Surface, E: CaptureEngine> {
    bus: Arc<EventBus>,
    engine: E,
    viewport: Viewport,
    options: CaptureOptions,
    fullsize: Option<Renderer<S>>,
    thumbnail: Option<Renderer<S>>,
    state: SessionState,
    session_id: Option<Uuid>,
    on_capture: Option<CaptureCallback>,
    // Hooks registered before the surfaces exist
    before_draw: Option<DrawHook>,
    after_draw: Option<DrawHook>,
}

impl<S: Surface, E: CaptureEngine> CaptureCoordinator<S, E> {
    pub fn new(bus: Arc<EventBus>, engine: E, viewport: Viewport) -> Self {
        Self {
            bus,
            engine,
            viewport,
            options: CaptureOptions::default(),
            fullsize: None,
            thumbnail: None,
            state: SessionState::Stopped,
            session_id: None,
            on_capture: None,
            before_draw: None,
            after_draw: None,
        }
    }

    /// Create the renderers. The thumbnail renderer exists only with a thumbnail surface.
    pub fn initialize(&mut self, surfaces: Surfaces<S>) {
        let mut fullsize = Renderer::new(SurfaceRole::Fullsize, surfaces.fullsize, self.bus.clone());
        if let Some(hook) = self.before_draw.take() {
            fullsize.set_on_before_draw(hook);
        }
        if let Some(hook) = self.after_draw.take() {
            fullsize.set_on_after_draw(hook);
        }
        self.fullsize = Some(fullsize);
        self.thumbnail = surfaces
            .thumbnail
            .map(|surface| Renderer::new(SurfaceRole::Thumbnail, surface, self.bus.clone()));

        info!(
            "Coordinator initialized (thumbnail surface: {})",
            if self.thumbnail.is_some() { "yes" } else { "no" }
        );
    }

    /// Lifecycle event bus shared with the renderers
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Borrow the capture engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Options of the current or last session
    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }

    /// Last known viewport
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Where the session stands
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Identifier of the running capture session
    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    /// Renderer for a surface, once initialized
    pub fn renderer(&self, role: SurfaceRole) -> Option<&Renderer<S>> {
        match role {
            SurfaceRole::Fullsize => self.fullsize.as_ref(),
            SurfaceRole::Thumbnail => self.thumbnail.as_ref(),
        }
    }

    /// Callback run for every delivered payload
    pub fn set_on_capture(&mut self, callback: CaptureCallback) {
        self.on_capture = Some(callback);
    }

    /// Hook run before each full-size draw
    pub fn set_on_before_draw(&mut self, hook: DrawHook) {
        match self.fullsize.as_mut() {
            Some(renderer) => renderer.set_on_before_draw(hook),
            None => self.before_draw = Some(hook),
        }
    }

    /// Hook run after each full-size draw
    pub fn set_on_after_draw(&mut self, hook: DrawHook) {
        match self.fullsize.as_mut() {
            Some(renderer) => renderer.set_on_after_draw(hook),
            None => self.after_draw = Some(hook),
        }
    }

    fn for_each_renderer(&mut self, mut f: impl FnMut(&mut Renderer<S>)) {
        for renderer in self.fullsize.iter_mut().chain(self.thumbnail.iter_mut()) {
            f(renderer);
        }
    }

    fn enable_renderers(&mut self) {
        self.for_each_renderer(|r| r.enable());
    }

    /// Turn rendering off and drop frames queued before that
    fn disable_renderers(&mut self) {
        self.for_each_renderer(|r| {
            r.disable();
            r.discard_pending();
        });
    }

    /// Preview size and whether it came from the viewport
    fn ui_size(&self) -> (SurfaceSize, bool) {
        match self.options.preview_size() {
            Some(size) if self.viewport.orientation() == UiOrientation::Portrait => (size.swapped(), false),
            Some(size) => (size, false),
            None => (self.viewport.size(), true),
        }
    }

    /// Size both renderers from the current options and viewport
    pub fn set_rendering_presets(&mut self) -> PresetsSnapshot {
        self.bus.publish(
            LifecycleEvent::BeforeRenderingPresets,
            EventSource::Coordinator,
            EventData::Empty,
        );

        let mode = self.options.delivery;
        let viewport = self.viewport;
        let (size, auto_fullscreen) = self.ui_size();

        if let Some(fullsize) = self.fullsize.as_mut() {
            fullsize.set_delivery_mode(mode);
            fullsize.set_size(size, auto_fullscreen, &viewport);
        }
        if let Some(thumbnail) = self.thumbnail.as_mut() {
            let ratio = self.options.effective_thumbnail_ratio();
            self.options.thumbnail_ratio = ratio;
            self.options.has_thumbnail = true;
            thumbnail.set_delivery_mode(mode);
            thumbnail.set_size(size.scaled(ratio), false, &viewport);
        }

        let snapshot = PresetsSnapshot {
            fullsize: self.fullsize.as_ref().and_then(|r| r.size()),
            thumbnail: self.thumbnail.as_ref().and_then(|r| r.size()),
            orientation: viewport.orientation(),
        };
        debug!(
            "Rendering presets applied: mode={}, size={:.2}x{:.2}, orientation={}",
            mode,
            size.width,
            size.height,
            snapshot.orientation.as_str()
        );
        self.bus.publish(
            LifecycleEvent::AfterRenderingPresets,
            EventSource::Coordinator,
            EventData::Presets(snapshot),
        );
        snapshot
    }

    /// Apply presets, enable the renderers and ask the engine to stream
    pub async fn start(&mut self, options: CaptureOptions, frames: FrameSender) -> Result<EngineReply, CoordinatorError> {
        if self.fullsize.is_none() {
            return Err(CoordinatorError::NotInitialized);
        }
        self.options = options;
        self.set_rendering_presets();
        self.enable_renderers();

        match self.engine.start_capture(&self.options, frames).await {
            Ok(reply) => {
                let id = Uuid::new_v4();
                self.session_id = Some(id);
                self.state = SessionState::Streaming;
                info!(
                    "Capture session {} started ({} mode, {} fps, {} camera)",
                    id,
                    self.options.delivery,
                    self.options.fps,
                    self.options.camera_facing.as_str()
                );
                Ok(reply)
            }
            Err(e) => {
                warn!("Capture engine failed to start: {}", e);
                self.disable_renderers();
                self.state = SessionState::Stopped;
                self.session_id = None;
                Err(e.into())
            }
        }
    }

    pub async fn stop(&mut self) -> Result<EngineReply, CoordinatorError> {
        self.disable_renderers();
        self.state = SessionState::Stopped;
        let reply = self.engine.stop_capture().await?;
        if let Some(id) = self.session_id.take() {
            info!("Capture session {} stopped", id);
        }
        Ok(reply)
    }

    /// Route a delivered payload to the renderers.
    ///
    /// The thumbnail is only considered when the full-size image carries a
    /// resource for the delivery mode. The capture callback always runs.
    pub fn deliver(&mut self, payload: CapturePayload) -> Routed {
        let mode = self.options.delivery;
        let mut routed = Routed::default();
        metrics::counter!("canvascam_payloads_received_total").increment(1);

        match payload.fullsize().filter(|image| image.has_resource(mode)) {
            Some(fullsize) => {
                if let Some(renderer) = self.fullsize.as_mut() {
                    routed.fullsize = renderer.bufferize(fullsize.clone());
                }
                let thumbnail = payload.thumbnail().filter(|image| image.has_resource(mode));
                if let (Some(image), Some(renderer)) = (thumbnail, self.thumbnail.as_mut()) {
                    routed.thumbnail = renderer.bufferize(image.clone());
                }
            }
            None => trace!("Payload has no {} fullsize image", mode),
        }

        if let Some(callback) = self.on_capture.as_mut() {
            callback(&payload);
        }
        routed
    }

    pub async fn flash_mode(&mut self, enabled: bool) -> Result<EngineReply, CoordinatorError> {
        let reply = self.engine.flash_mode(enabled).await?;
        self.options.flash_mode = enabled;
        debug!("Flash {}", if enabled { "on" } else { "off" });
        Ok(reply)
    }

    /// Switch cameras. Rendering is suspended during the switch and stays
    /// suspended if the engine refuses it.
    pub async fn camera_position(&mut self, facing: CameraFacing) -> Result<EngineReply, CoordinatorError> {
        let resume = match self.state {
            SessionState::Stopped => SessionState::Stopped,
            SessionState::Streaming | SessionState::Paused => SessionState::Streaming,
        };
        self.disable_renderers();
        if resume == SessionState::Streaming {
            self.state = SessionState::Paused;
        }

        match self.engine.camera_position(facing).await {
            Ok(reply) => {
                self.options.camera_facing = facing;
                self.enable_renderers();
                self.state = resume;
                info!("Switched to {} camera", facing.as_str());
                Ok(reply)
            }
            Err(e) => {
                warn!("Camera switch to {} failed: {}", facing.as_str(), e);
                Err(e.into())
            }
        }
    }

    /// One scheduling tick: returns the decodes the driver must run
    pub fn tick(&mut self) -> Vec<DecodeJob> {
        if self.state != SessionState::Streaming {
            // A settle reopens the gate; keep rendering off until streaming again
            self.for_each_renderer(|r| {
                if r.enabled() {
                    r.disable();
                }
            });
        }

        let mut jobs = Vec::new();
        self.for_each_renderer(|r| jobs.extend(r.render_cycle()));
        jobs
    }

    /// Hand a finished decode back to the renderer that issued it
    pub fn settle(
        &mut self,
        role: SurfaceRole,
        ticket: DecodeTicket,
        result: Result<DecodedImage, DecodeError>,
    ) -> Option<SettleOutcome> {
        let viewport = self.viewport;
        let renderer = match role {
            SurfaceRole::Fullsize => self.fullsize.as_mut(),
            SurfaceRole::Thumbnail => self.thumbnail.as_mut(),
        }?;
        Some(renderer.settle(ticket, result, &viewport))
    }

    /// Device rotated: record the new viewport and let each renderer adapt
    pub fn on_orientation_change(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let orientation = viewport.orientation();
        debug!(
            "Orientation changed to {} ({:.0}x{:.0})",
            orientation.as_str(),
            viewport.width,
            viewport.height
        );
        self.for_each_renderer(|r| {
            r.on_orientation_change(orientation, &viewport);
        });
    }
}

impl<S: Surface, E: CaptureEngine> std::fmt::Debug for CaptureCoordinator<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureCoordinator")
            .field("viewport", &self.viewport)
            .field("options", &self.options)
            .field("state", &self.state)
            .field("session_id", &self.session_id)
            .finish()
    }
}
