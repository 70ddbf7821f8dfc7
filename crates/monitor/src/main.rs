//! Vigilance Monitor - Main Entry Point

use monitor::{init_logging, run, MonitorConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    info!("=== Vigil Drowsiness Monitor v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Press Ctrl-C to stop.");

    let stats = run(MonitorConfig::default()).await?;

    info!(
        "Session ended: {} frames processed, {} alerts emitted",
        stats.frames_processed, stats.alerts_emitted
    );
    Ok(())
}
