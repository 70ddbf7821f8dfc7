//! Vigilance Monitor
//!
//! Drives the per-frame pipeline strictly in sequence: capture →
//! landmark extraction → drowsiness decision → alert dispatch. The loop
//! itself is synchronous per frame; only alert emission is queued off
//! the loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use alerting::{AlertChannel, AlertDispatcher, DispatchConfig, TerminalBell};
use camera_capture::{CameraConfig, FrameSource, SyntheticSource};
use drowsiness::{DrowsinessConfig, DrowsinessMonitor};
use face_landmarks::{LandmarkProvider, OnnxLandmarkProvider, ProviderConfig};
use thiserror::Error;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Monitor error types
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Drowsiness engine: {0}")]
    Drowsiness(#[from] drowsiness::DrowsinessError),

    #[error("Alerting: {0}")]
    Alerting(#[from] alerting::AlertError),

    #[error("Landmark provider: {0}")]
    Landmarks(#[from] face_landmarks::LandmarkError),

    #[error("Camera: {0}")]
    Camera(#[from] camera_capture::CameraError),
}

/// Full monitor configuration
#[derive(Debug, Clone, Default)]
pub struct MonitorConfig {
    pub camera: CameraConfig,
    pub provider: ProviderConfig,
    pub drowsiness: DrowsinessConfig,
    pub dispatch: DispatchConfig,
}

/// Loop lifetime counters
#[derive(Debug, Clone, Copy, Default)]
pub struct MonitorStats {
    pub frames_processed: u64,
    pub alerts_emitted: u64,
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Validate configuration, provision model assets, and run the monitor
/// until Ctrl-C or source exhaustion.
pub async fn run(config: MonitorConfig) -> Result<MonitorStats, MonitorError> {
    // Configuration errors are fatal here, before any frame is processed
    config.drowsiness.validate()?;
    config.dispatch.validate()?;

    info!(
        "EAR threshold: {}, consecutive frames: {}, cooldown: {}s",
        config.drowsiness.ear_threshold,
        config.drowsiness.consecutive_frames,
        config.dispatch.cooldown_seconds
    );

    let provider_config = provision_models(config.provider.clone()).await;
    let provider = OnnxLandmarkProvider::new(&provider_config)?;
    let monitor = DrowsinessMonitor::new(config.drowsiness.clone(), provider)?;

    let handle = AlertChannel::spawn(Arc::new(TerminalBell));
    let dispatcher = AlertDispatcher::new(config.dispatch.clone(), handle);

    // Real camera I/O lives outside this repository; the synthetic
    // source keeps the pipeline runnable end to end.
    let source = SyntheticSource::new(&config.camera);
    run_loop(source, monitor, dispatcher, &config.camera).await
}

/// Fill in missing model paths from the asset cache, downloading on
/// first run. Provisioning failure degrades to mock geometry rather
/// than refusing to start.
async fn provision_models(mut config: ProviderConfig) -> ProviderConfig {
    if config.face_model_path.is_some() && config.landmark_model_path.is_some() {
        return config;
    }

    let base = match model_assets::executable_dir() {
        Ok(base) => base,
        Err(e) => {
            warn!("Cannot resolve asset directory: {}. Using mock geometry.", e);
            return config;
        }
    };

    match model_assets::ensure_assets(&base).await {
        Ok(paths) => {
            config
                .face_model_path
                .get_or_insert_with(|| paths.face_model.to_string_lossy().into_owned());
            config
                .landmark_model_path
                .get_or_insert_with(|| paths.landmark_model.to_string_lossy().into_owned());
        }
        Err(e) => {
            warn!("Model provisioning failed: {}. Using mock geometry.", e);
        }
    }
    config
}

/// The per-frame loop. Components run strictly in sequence for each
/// captured frame; only acquisition failures may end the loop.
pub async fn run_loop<S, P>(
    mut source: S,
    mut monitor: DrowsinessMonitor<P>,
    mut dispatcher: AlertDispatcher,
    camera: &CameraConfig,
) -> Result<MonitorStats, MonitorError>
where
    S: FrameSource,
    P: LandmarkProvider,
{
    let mut stats = MonitorStats::default();
    let mut interval =
        tokio::time::interval(Duration::from_secs_f64(1.0 / camera.fps.max(1) as f64));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("Monitoring started");
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            _ = interval.tick() => {
                let Some(frame) = source.next_frame()? else {
                    info!("Frame source exhausted");
                    break;
                };
                let frame = if camera.mirror { frame.mirrored() } else { frame };

                let analysis = monitor.analyze(&frame.to_grayscale());
                if dispatcher.maybe_alert(analysis.alarm_active, Instant::now()) {
                    stats.alerts_emitted += 1;
                }
                stats.frames_processed += 1;
            }
        }
    }

    info!(
        "Monitoring stopped: {} frames, {} alerts",
        stats.frames_processed, stats.alerts_emitted
    );
    Ok(stats)
}
