//! CanvasCam Preview
//!
//! Drives a full capture session against a simulated camera and keeps the
//! rendered surfaces for inspection.

pub mod engine;

pub use engine::SimulatedEngine;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use canvas_renderer::{ImageFileDecoder, RasterSurface, SurfaceRole};
use capture_coordinator::{CaptureCoordinator, CaptureOptions, CaptureSession, SessionConfig, Surfaces};
use event_bus::{EventBus, EventData, LifecycleEvent};
use frame_geometry::Viewport;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Initialize logging
pub fn init_logging() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Install the Prometheus recorder behind the `metrics` facade
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

/// Rendered `canvascam_*` samples, comments and other families skipped
pub fn metrics_summary(handle: &PrometheusHandle) -> Vec<String> {
    handle
        .render()
        .lines()
        .filter(|line| line.starts_with("canvascam_"))
        .map(str::to_owned)
        .collect()
}

/// Preview run settings
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    pub options: CaptureOptions,
    pub viewport: Viewport,
    /// Streaming time before and after the simulated rotation
    pub phase: Duration,
    /// Where frames and final surfaces are written
    pub output_dir: PathBuf,
}

/// Per-surface result of a preview run
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceReport {
    pub role: SurfaceRole,
    pub frames_drawn: u64,
    pub decode_failures: u64,
    pub snapshot: PathBuf,
}

/// Stream, rotate once, stop, and save each surface as PNG
pub async fn run_preview(config: PreviewConfig) -> anyhow::Result<Vec<SurfaceReport>> {
    std::fs::create_dir_all(&config.output_dir)?;

    let bus = EventBus::shared();
    bus.subscribe(LifecycleEvent::AfterRenderingPresets, |event| {
        if let EventData::Presets(presets) = event.data {
            info!(
                "Presets: fullsize={:?} thumbnail={:?} ({})",
                presets.fullsize,
                presets.thumbnail,
                presets.orientation.as_str()
            );
        }
    });

    let engine = SimulatedEngine::new(config.output_dir.join("frames"));
    let mut coordinator = CaptureCoordinator::new(bus, engine, config.viewport);
    coordinator.initialize(Surfaces {
        fullsize: RasterSurface::default(),
        thumbnail: Some(RasterSurface::default()),
    });

    let delivered = Arc::new(AtomicU64::new(0));
    let counter = delivered.clone();
    coordinator.set_on_capture(Box::new(move |_| {
        counter.fetch_add(1, Ordering::Relaxed);
    }));

    let handle = CaptureSession::spawn(coordinator, Arc::new(ImageFileDecoder::new()), SessionConfig::default());

    handle.start(config.options.clone()).await?;
    tokio::time::sleep(config.phase).await;

    let rotated = config.viewport.rotated();
    info!("Rotating device to {:.0}x{:.0}", rotated.width, rotated.height);
    handle.rotate(rotated).await?;
    tokio::time::sleep(config.phase).await;

    handle.stop().await?;
    let coordinator = handle.shutdown().await?;
    info!("Engine delivered {} payloads", delivered.load(Ordering::Relaxed));

    let mut reports = Vec::new();
    for role in [SurfaceRole::Fullsize, SurfaceRole::Thumbnail] {
        if let Some(renderer) = coordinator.renderer(role) {
            reports.push(save_surface(role, renderer.surface(), renderer.stats(), &config.output_dir)?);
        }
    }
    Ok(reports)
}

fn save_surface(
    role: SurfaceRole,
    surface: &RasterSurface,
    stats: canvas_renderer::RenderStats,
    dir: &Path,
) -> anyhow::Result<SurfaceReport> {
    let snapshot = dir.join(format!("{}.png", role.as_str()));
    surface.save(&snapshot)?;
    info!(
        "{}: {} drawn, {} failed, {} dropped on rotation -> {}",
        role.as_str(),
        stats.frames_drawn,
        stats.decode_failures,
        stats.orientation_dropped,
        snapshot.display()
    );
    Ok(SurfaceReport {
        role,
        frames_drawn: stats.frames_drawn,
        decode_failures: stats.decode_failures,
        snapshot,
    })
}
