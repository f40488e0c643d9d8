//! Renderer state machine
//!
//! A renderer owns one surface. Payloads land in a single-slot mailbox; each
//! scheduling tick calls [`Renderer::render_cycle`], which hands out at most one
//! [`DecodeJob`] and then closes the gate until [`Renderer::settle`] reports the
//! decode result. The renderer never decodes on its own: whoever drives the tick
//! runs the job and feeds the result back on the same context.

use std::sync::Arc;

use event_bus::{EventBus, EventData, EventSource, LifecycleEvent, SurfaceRole};
use frame_geometry::{invert, surface_metrics, FramePlacement, SurfaceMetrics, SurfaceSize, UiOrientation, Viewport};
use frame_mailbox::Mailbox;
use tracing::{debug, trace, warn};

use crate::decoder::DecodedImage;
use crate::payload::{DeliveryMode, ImagePayload, ImageSource};
use crate::surface::Surface;
use crate::DecodeError;

/// Callback run around each draw (full-size surface hooks)
pub type DrawHook = Box<dyn FnMut(&FramePlacement) + Send>;

/// Identifies one issued decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeTicket(u64);

/// Decode progress of a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePhase {
    #[default]
    Idle,
    Decoding { ticket: DecodeTicket },
}

/// A decode the driver must run and settle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeJob {
    pub role: SurfaceRole,
    pub ticket: DecodeTicket,
    pub source: ImageSource,
}

/// Result of settling a decode
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettleOutcome {
    /// The frame was drawn with this placement
    Drawn(FramePlacement),
    /// Surface cleared, nothing drawn
    Failed,
    /// The ticket did not match the outstanding decode
    Stale,
}

/// Per-renderer counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub decodes_started: u64,
    pub frames_drawn: u64,
    pub decode_failures: u64,
    /// Payloads without a resource for the delivery mode
    pub malformed_dropped: u64,
    /// Pending payloads thrown away on orientation change
    pub orientation_dropped: u64,
    /// Pending payloads thrown away while rendering was off
    pub disabled_dropped: u64,
    /// Payloads replaced in the slot before a render cycle took them
    pub coalesced: u64,
    pub stale_settles: u64,
}

/// Renderer for one preview surface
pub struct Renderer<S: Surface> {
    role: SurfaceRole,
    surface: S,
    bus: Arc<EventBus>,
    mode: DeliveryMode,
    /// Gate: closed while decoding or when disabled from outside
    available: bool,
    phase: DecodePhase,
    pending: Mailbox<ImagePayload>,
    /// Orientation reported by the last consumed payload
    orientation: Option<UiOrientation>,
    size: Option<SurfaceSize>,
    fullscreen: bool,
    on_before_draw: Option<DrawHook>,
    on_after_draw: Option<DrawHook>,
    next_ticket: u64,
    stats: RenderStats,
}

impl<S: Surface> Renderer<S> {
    /// Create an enabled renderer for a surface
    pub fn new(role: SurfaceRole, surface: S, bus: Arc<EventBus>) -> Self {
        debug!("Creating {} renderer", role.as_str());
        Self {
            role,
            surface,
            bus,
            mode: DeliveryMode::default(),
            available: true,
            phase: DecodePhase::Idle,
            pending: Mailbox::new(),
            orientation: None,
            size: None,
            fullscreen: false,
            on_before_draw: None,
            on_after_draw: None,
            next_ticket: 0,
            stats: RenderStats::default(),
        }
    }

    /// Surface this renderer draws to
    pub fn role(&self) -> SurfaceRole {
        self.role
    }

    /// Borrow the drawing surface
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutably borrow the drawing surface
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Logical size, if one was set
    pub fn size(&self) -> Option<SurfaceSize> {
        self.size
    }

    /// Whether the surface fills the viewport
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Orientation carried by the last decoded payload
    pub fn orientation(&self) -> Option<UiOrientation> {
        self.orientation
    }

    /// Current decode phase
    pub fn phase(&self) -> DecodePhase {
        self.phase
    }

    /// True while a decode job is outstanding
    pub fn is_decoding(&self) -> bool {
        matches!(self.phase, DecodePhase::Decoding { .. })
    }

    /// Payload waiting for the next render cycle
    pub fn pending(&self) -> Option<&ImagePayload> {
        self.pending.peek()
    }

    /// Snapshot of the renderer counters
    pub fn stats(&self) -> RenderStats {
        RenderStats {
            coalesced: self.pending.stats().overwritten,
            ..self.stats
        }
    }

    /// Which payload resource gets decoded
    pub fn delivery_mode(&self) -> DeliveryMode {
        self.mode
    }

    /// Switch between file and inline data resources
    pub fn set_delivery_mode(&mut self, mode: DeliveryMode) {
        self.mode = mode;
    }

    /// Hook run right before each draw
    pub fn set_on_before_draw(&mut self, hook: DrawHook) {
        self.on_before_draw = Some(hook);
    }

    /// Hook run right after each draw
    pub fn set_on_after_draw(&mut self, hook: DrawHook) {
        self.on_after_draw = Some(hook);
    }

    /// Set the logical surface size and fullscreen policy.
    ///
    /// A size that reaches the viewport in both dimensions turns fullscreen on.
    /// Returns false, changing nothing, when the size is not usable.
    pub fn set_size(&mut self, size: SurfaceSize, auto_fullscreen: bool, viewport: &Viewport) -> bool {
        let size = match size.validated() {
            Ok(size) => size,
            Err(e) => {
                debug!("Ignoring {} size: {}", self.role.as_str(), e);
                return false;
            }
        };

        self.size = Some(size);
        self.fullscreen = auto_fullscreen || size.fills(viewport);
        debug!(
            "{} size set to {:.2}x{:.2} (fullscreen={})",
            self.role.as_str(),
            size.width,
            size.height,
            self.fullscreen
        );
        true
    }

    /// Recompute the surface backing store from the stored size
    pub fn resize(&mut self, viewport: &Viewport) -> Option<SurfaceMetrics> {
        let size = self.size?;
        let metrics = surface_metrics(&size, self.fullscreen, viewport);
        self.surface.resize(&metrics);
        Some(metrics)
    }

    /// Wipe the surface
    pub fn clear(&mut self) {
        self.surface.clear();
    }

    /// Open the gate for new payloads
    pub fn enable(&mut self) {
        self.available = true;
    }

    /// Close the gate; payloads are ignored until the next enable or settle
    pub fn disable(&mut self) {
        self.available = false;
    }

    pub fn enabled(&self) -> bool {
        self.available
    }

    pub fn disabled(&self) -> bool {
        !self.available
    }

    /// Throw away the pending payload, if any
    pub fn discard_pending(&mut self) -> bool {
        if self.pending.clear().is_none() {
            return false;
        }
        debug!("{} renderer off, pending payload dropped", self.role.as_str());
        self.stats.disabled_dropped += 1;
        metrics::counter!("canvascam_frames_dropped_total", "surface" => self.role.as_str(), "reason" => "disabled").increment(1);
        true
    }

    /// Offer a payload for the next render cycle.
    ///
    /// Replaces any payload still pending. Ignored while the renderer is disabled.
    pub fn bufferize(&mut self, payload: ImagePayload) -> bool {
        if self.disabled() {
            trace!("{} renderer disabled, payload ignored", self.role.as_str());
            return false;
        }
        if self.pending.post(payload).is_some() {
            trace!("{} renderer coalesced a pending payload", self.role.as_str());
            metrics::counter!("canvascam_frames_dropped_total", "surface" => self.role.as_str(), "reason" => "coalesced").increment(1);
        }
        true
    }

    /// Run one scheduling tick.
    ///
    /// Consumes the pending payload and returns the decode to run, if any. The gate
    /// closes as soon as a job is handed out. A payload still pending while the
    /// renderer is off (and idle) is dropped instead of kept for later.
    pub fn render_cycle(&mut self) -> Option<DecodeJob> {
        if self.is_decoding() {
            return None;
        }
        if self.disabled() {
            self.discard_pending();
            return None;
        }
        let payload = self.pending.take()?;

        let Some(source) = payload.source(self.mode) else {
            debug!("{} payload has no {} resource, dropped", self.role.as_str(), self.mode);
            self.stats.malformed_dropped += 1;
            return None;
        };

        if let Some(orientation) = payload.orientation {
            self.orientation = Some(orientation);
        }

        let ticket = DecodeTicket(self.next_ticket);
        self.next_ticket += 1;
        self.phase = DecodePhase::Decoding { ticket };
        self.stats.decodes_started += 1;
        self.disable();

        Some(DecodeJob {
            role: self.role,
            ticket,
            source,
        })
    }

    /// Apply the result of a decode issued by [`Renderer::render_cycle`].
    ///
    /// Always reopens the gate for the matching ticket, even if the renderer was
    /// disabled from outside while the decode was running.
    pub fn settle(
        &mut self,
        ticket: DecodeTicket,
        result: Result<DecodedImage, DecodeError>,
        viewport: &Viewport,
    ) -> SettleOutcome {
        if self.phase != (DecodePhase::Decoding { ticket }) {
            debug!("{} renderer ignoring stale decode {:?}", self.role.as_str(), ticket);
            self.stats.stale_settles += 1;
            return SettleOutcome::Stale;
        }
        self.phase = DecodePhase::Idle;

        let outcome = match result {
            Ok(image) => self.present(&image, viewport),
            Err(e) => {
                debug!("{} frame decode failed: {}", self.role.as_str(), e);
                self.fail()
            }
        };

        self.enable();
        outcome
    }

    fn fail(&mut self) -> SettleOutcome {
        self.stats.decode_failures += 1;
        metrics::counter!("canvascam_decode_failures_total", "surface" => self.role.as_str()).increment(1);
        self.clear();
        SettleOutcome::Failed
    }

    fn present(&mut self, image: &DecodedImage, viewport: &Viewport) -> SettleOutcome {
        self.resize(viewport);

        self.bus.publish(
            LifecycleEvent::BeforeFrameInitialization,
            EventSource::Frame(self.role),
            EventData::Empty,
        );
        let (width, height) = self.surface.pixel_size();
        let frame = match FramePlacement::cover(
            image.width() as f64,
            image.height() as f64,
            width as f64,
            height as f64,
        ) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("{} frame cannot be placed: {}", self.role.as_str(), e);
                return self.fail();
            }
        };
        self.bus.publish(
            LifecycleEvent::AfterFrameInitialization,
            EventSource::Frame(self.role),
            EventData::Frame(frame),
        );

        self.clear();
        if let Some(hook) = self.on_before_draw.as_mut() {
            hook(&frame);
        }
        self.draw(image, &frame);
        if let Some(hook) = self.on_after_draw.as_mut() {
            hook(&frame);
        }

        self.stats.frames_drawn += 1;
        metrics::counter!("canvascam_frames_drawn_total", "surface" => self.role.as_str()).increment(1);
        SettleOutcome::Drawn(frame)
    }

    fn draw(&mut self, image: &DecodedImage, frame: &FramePlacement) {
        self.bus.publish(
            LifecycleEvent::BeforeFrameRendering,
            EventSource::Renderer(self.role),
            EventData::Frame(*frame),
        );
        self.surface.draw(image, frame);
        self.bus.publish(
            LifecycleEvent::AfterFrameRendering,
            EventSource::Renderer(self.role),
            EventData::Frame(*frame),
        );
    }

    /// React to a device rotation.
    ///
    /// Inverts the stored size when the UI orientation no longer matches the last
    /// payload's, and always drops the pending payload so a frame captured in the
    /// old orientation is never drawn. Returns whether the size was inverted.
    pub fn on_orientation_change(&mut self, ui_orientation: UiOrientation, viewport: &Viewport) -> bool {
        let mut inverted = false;
        if self.orientation != Some(ui_orientation) {
            if let Some(size) = self.size {
                let next = invert(&size, self.fullscreen, viewport);
                debug!(
                    "{} size inverted {:.2}x{:.2} -> {:.2}x{:.2}",
                    self.role.as_str(),
                    size.width,
                    size.height,
                    next.width,
                    next.height
                );
                self.size = Some(next);
                inverted = true;
            }
        }

        if self.pending.clear().is_some() {
            self.stats.orientation_dropped += 1;
            metrics::counter!("canvascam_frames_dropped_total", "surface" => self.role.as_str(), "reason" => "orientation").increment(1);
        }
        inverted
    }
}

impl<S: Surface + std::fmt::Debug> std::fmt::Debug for Renderer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("role", &self.role)
            .field("surface", &self.surface)
            .field("available", &self.available)
            .field("phase", &self.phase)
            .field("size", &self.size)
            .field("fullscreen", &self.fullscreen)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Surface that records calls instead of drawing
    #[derive(Debug, Default)]
    struct RecordingSurface {
        size: (u32, u32),
        calls: Vec<String>,
        draws: Vec<FramePlacement>,
    }

    impl Surface for RecordingSurface {
        fn pixel_size(&self) -> (u32, u32) {
            self.size
        }

        fn resize(&mut self, metrics: &SurfaceMetrics) {
            self.size = (metrics.pixel_width, metrics.pixel_height);
            self.calls.push("resize".into());
        }

        fn clear(&mut self) {
            self.calls.push("clear".into());
        }

        fn draw(&mut self, _image: &DecodedImage, frame: &FramePlacement) {
            self.calls.push("draw".into());
            self.draws.push(*frame);
        }
    }

    fn renderer() -> Renderer<RecordingSurface> {
        let surface = RecordingSurface {
            size: (352, 352),
            ..Default::default()
        };
        Renderer::new(SurfaceRole::Fullsize, surface, EventBus::shared())
    }

    fn image(width: u32, height: u32) -> DecodedImage {
        DecodedImage::new(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]))).unwrap()
    }

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    #[test]
    fn test_coalesces_to_single_decode_of_latest_payload() {
        let mut r = renderer();
        assert!(r.bufferize(ImagePayload::from_file("/tmp/first.jpg")));
        assert!(r.bufferize(ImagePayload::from_file("/tmp/second.jpg")));

        let job = r.render_cycle().expect("one decode");
        assert_eq!(job.source, ImageSource::File(PathBuf::from("/tmp/second.jpg")));
        assert!(r.render_cycle().is_none());
        assert_eq!(r.stats().decodes_started, 1);
        assert!(r.disabled());
        assert!(r.is_decoding());
    }

    #[test]
    fn test_gate_rejects_payloads_while_decoding() {
        let mut r = renderer();
        r.bufferize(ImagePayload::from_file("/tmp/a.jpg"));
        let job = r.render_cycle().unwrap();

        assert!(!r.bufferize(ImagePayload::from_file("/tmp/b.jpg")));
        assert!(r.pending().is_none());

        r.settle(job.ticket, Ok(image(640, 480)), &viewport());
        assert!(r.enabled());
        assert!(r.render_cycle().is_none());
    }

    #[test]
    fn test_disabled_renderer_ignores_new_payloads() {
        let mut r = renderer();
        r.bufferize(ImagePayload::from_file("/tmp/kept.jpg"));
        r.disable();

        assert!(!r.bufferize(ImagePayload::from_file("/tmp/ignored.jpg")));
        assert_eq!(r.pending(), Some(&ImagePayload::from_file("/tmp/kept.jpg")));
    }

    #[test]
    fn test_disabled_cycle_drops_pending_payload() {
        let mut r = renderer();
        r.bufferize(ImagePayload::from_file("/tmp/old-session.jpg"));
        r.disable();

        assert!(r.render_cycle().is_none());
        assert!(r.pending().is_none());
        assert_eq!(r.stats().disabled_dropped, 1);

        r.enable();
        assert!(r.render_cycle().is_none());
        assert_eq!(r.stats().decodes_started, 0);
    }

    #[test]
    fn test_discard_pending_counts_only_real_drops() {
        let mut r = renderer();
        assert!(!r.discard_pending());

        r.bufferize(ImagePayload::from_file("/tmp/a.jpg"));
        assert!(r.discard_pending());
        assert!(r.pending().is_none());
        assert_eq!(r.stats().disabled_dropped, 1);
    }

    #[test]
    fn test_stats_count_coalesced_payloads() {
        let mut r = renderer();
        r.bufferize(ImagePayload::from_file("/tmp/a.jpg"));
        r.bufferize(ImagePayload::from_file("/tmp/b.jpg"));
        r.bufferize(ImagePayload::from_file("/tmp/c.jpg"));
        r.render_cycle().unwrap();

        let stats = r.stats();
        assert_eq!(stats.coalesced, 2);
        assert_eq!(stats.decodes_started, 1);
    }

    #[test]
    fn test_orientation_change_discards_pending_payload() {
        let mut r = renderer();
        r.set_size(SurfaceSize::new(352.0, 288.0), false, &viewport());
        r.bufferize(ImagePayload::from_file("/tmp/stale.jpg"));

        r.on_orientation_change(UiOrientation::Portrait, &Viewport::new(600.0, 800.0).with_angle(0));

        assert!(r.pending().is_none());
        assert!(r.render_cycle().is_none());
        assert!(r.surface().draws.is_empty());
        assert_eq!(r.stats().orientation_dropped, 1);
    }

    #[test]
    fn test_orientation_change_inverts_size_only_when_orientation_differs() {
        let mut r = renderer();
        r.set_size(SurfaceSize::new(352.0, 288.0), false, &viewport());
        r.bufferize(ImagePayload::from_file("/tmp/a.jpg").with_orientation(UiOrientation::Landscape));
        let job = r.render_cycle().unwrap();
        r.settle(job.ticket, Ok(image(352, 288)), &viewport());

        assert!(!r.on_orientation_change(UiOrientation::Landscape, &viewport()));
        assert_eq!(r.size(), Some(SurfaceSize::new(352.0, 288.0)));

        let portrait = Viewport::new(600.0, 800.0).with_angle(0);
        assert!(r.on_orientation_change(UiOrientation::Portrait, &portrait));
        assert_eq!(r.size(), Some(SurfaceSize::new(288.0, 352.0)));
    }

    #[test]
    fn test_set_size_forces_fullscreen_when_exceeding_viewport() {
        let mut r = renderer();
        assert!(r.set_size(SurfaceSize::new(1000.0, 1000.0), false, &viewport()));
        assert!(r.is_fullscreen());

        assert!(r.set_size(SurfaceSize::new(1000.0, 100.0), false, &viewport()));
        assert!(!r.is_fullscreen());

        assert!(r.set_size(SurfaceSize::new(100.0, 100.0), true, &viewport()));
        assert!(r.is_fullscreen());
    }

    #[test]
    fn test_invalid_size_keeps_previous() {
        let mut r = renderer();
        r.set_size(SurfaceSize::new(352.0, 288.0), false, &viewport());

        assert!(!r.set_size(SurfaceSize::new(f64::NAN, 288.0), true, &viewport()));
        assert!(!r.set_size(SurfaceSize::new(0.0, 0.0), true, &viewport()));
        assert_eq!(r.size(), Some(SurfaceSize::new(352.0, 288.0)));
        assert!(!r.is_fullscreen());
    }

    #[test]
    fn test_successful_settle_order_and_events() {
        let bus = EventBus::shared();
        let events = Arc::new(Mutex::new(Vec::new()));
        for kind in LifecycleEvent::ALL {
            let events = Arc::clone(&events);
            bus.subscribe(kind, move |e| events.lock().unwrap().push(e.kind));
        }

        let hooks = Arc::new(Mutex::new(Vec::new()));
        let mut r = Renderer::new(
            SurfaceRole::Fullsize,
            RecordingSurface {
                size: (352, 352),
                ..Default::default()
            },
            Arc::clone(&bus),
        );
        let before = Arc::clone(&hooks);
        r.set_on_before_draw(Box::new(move |_| before.lock().unwrap().push("before")));
        let after = Arc::clone(&hooks);
        r.set_on_after_draw(Box::new(move |_| after.lock().unwrap().push("after")));

        r.bufferize(ImagePayload::from_file("/tmp/a.jpg"));
        let job = r.render_cycle().unwrap();
        let outcome = r.settle(job.ticket, Ok(image(640, 480)), &viewport());

        let SettleOutcome::Drawn(frame) = outcome else {
            panic!("expected a draw, got {:?}", outcome);
        };
        assert!((frame.d_width - 469.333).abs() < 0.01);
        assert!((frame.dx + 58.667).abs() < 0.01);
        assert_eq!(r.surface().calls, vec!["clear", "draw"]);
        assert_eq!(*hooks.lock().unwrap(), vec!["before", "after"]);
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                LifecycleEvent::BeforeFrameInitialization,
                LifecycleEvent::AfterFrameInitialization,
                LifecycleEvent::BeforeFrameRendering,
                LifecycleEvent::AfterFrameRendering,
            ]
        );
        assert!(r.enabled());
        assert_eq!(r.phase(), DecodePhase::Idle);
    }

    #[test]
    fn test_failed_decode_clears_and_reopens() {
        let mut r = renderer();
        r.bufferize(ImagePayload::from_file("/tmp/broken.jpg"));
        let job = r.render_cycle().unwrap();

        let outcome = r.settle(job.ticket, Err(DecodeError::Empty), &viewport());

        assert_eq!(outcome, SettleOutcome::Failed);
        assert_eq!(r.surface().calls, vec!["clear"]);
        assert!(r.enabled());
        assert_eq!(r.stats().decode_failures, 1);
    }

    #[test]
    fn test_disable_during_decode_is_reopened_by_settle() {
        let mut r = renderer();
        r.bufferize(ImagePayload::from_file("/tmp/a.jpg"));
        let job = r.render_cycle().unwrap();

        r.disable();
        r.settle(job.ticket, Ok(image(10, 10)), &viewport());
        assert!(r.enabled());
    }

    #[test]
    fn test_enable_during_decode_does_not_start_second_decode() {
        let mut r = renderer();
        r.bufferize(ImagePayload::from_file("/tmp/a.jpg"));
        let first = r.render_cycle().unwrap();

        r.enable();
        r.bufferize(ImagePayload::from_file("/tmp/b.jpg"));
        assert!(r.render_cycle().is_none());

        r.settle(first.ticket, Ok(image(10, 10)), &viewport());
        let second = r.render_cycle().expect("pending payload decoded after settle");
        assert_eq!(second.source, ImageSource::File(PathBuf::from("/tmp/b.jpg")));
    }

    #[test]
    fn test_stale_ticket_is_ignored() {
        let mut r = renderer();
        r.bufferize(ImagePayload::from_file("/tmp/a.jpg"));
        let job = r.render_cycle().unwrap();

        let bogus = DecodeTicket(job.ticket.0 + 10);
        assert_eq!(r.settle(bogus, Ok(image(10, 10)), &viewport()), SettleOutcome::Stale);
        assert!(r.is_decoding());

        r.settle(job.ticket, Ok(image(10, 10)), &viewport());
        assert_eq!(r.settle(job.ticket, Ok(image(10, 10)), &viewport()), SettleOutcome::Stale);
    }

    #[test]
    fn test_payload_without_mode_resource_is_dropped() {
        let mut r = renderer();
        r.set_delivery_mode(DeliveryMode::Data);
        r.bufferize(ImagePayload::from_file("/tmp/a.jpg"));

        assert!(r.render_cycle().is_none());
        assert!(r.enabled());
        assert!(r.pending().is_none());
        assert_eq!(r.stats().malformed_dropped, 1);
    }

    #[test]
    fn test_payload_orientation_is_recorded() {
        let mut r = renderer();
        r.bufferize(ImagePayload::from_file("/tmp/a.jpg").with_orientation(UiOrientation::Portrait));
        r.render_cycle().unwrap();
        assert_eq!(r.orientation(), Some(UiOrientation::Portrait));
    }

    #[test]
    fn test_settle_resizes_surface_from_size() {
        let mut r = renderer();
        let viewport = Viewport::new(800.0, 600.0).with_pixel_ratio(2.0);
        r.set_size(SurfaceSize::new(352.0, 288.0), false, &viewport);
        r.bufferize(ImagePayload::from_file("/tmp/a.jpg"));
        let job = r.render_cycle().unwrap();

        let outcome = r.settle(job.ticket, Ok(image(352, 288)), &viewport);

        assert_eq!(r.surface().size, (704, 576));
        let SettleOutcome::Drawn(frame) = outcome else { panic!("expected draw") };
        assert_eq!(frame.ratio, 2.0);
        assert_eq!(r.surface().calls, vec!["resize", "clear", "draw"]);
    }
}
