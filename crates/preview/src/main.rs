//! CanvasCam Preview - Main Entry Point

use std::path::PathBuf;
use std::time::Duration;

use canvascam_preview::{init_logging, init_metrics, metrics_summary, run_preview, PreviewConfig};
use capture_coordinator::CaptureOptions;
use frame_geometry::Viewport;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    let metrics = init_metrics()?;

    info!("=== CanvasCam Preview v{} ===", env!("CARGO_PKG_VERSION"));

    // Optional options file; CANVASCAM_* variables override it
    let options_path = std::env::args().nth(1).map(PathBuf::from);
    let options = CaptureOptions::load(options_path.as_deref())?;

    let output_dir = std::env::temp_dir().join(format!("canvascam-{}", uuid::Uuid::new_v4()));
    info!("Writing output to {}", output_dir.display());

    let reports = run_preview(PreviewConfig {
        options,
        viewport: Viewport::new(800.0, 600.0).with_angle(90),
        phase: Duration::from_secs(2),
        output_dir,
    })
    .await?;

    let drawn: u64 = reports.iter().map(|r| r.frames_drawn).sum();
    info!("Preview finished: {} frames drawn across {} surfaces", drawn, reports.len());
    for line in metrics_summary(&metrics) {
        info!("{}", line);
    }
    Ok(())
}
