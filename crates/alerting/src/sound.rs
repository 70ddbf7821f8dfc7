//! Fire-and-forget alert emission

use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Boundary to the external audio capability.
///
/// `play` is best-effort: a failing sink is logged and degraded to the
/// terminal bell, never surfaced to the frame loop.
pub trait AlertSink: Send + Sync {
    /// Emit the alert sound once
    fn play(&self) -> std::io::Result<()>;
}

/// Minimal fallback sink: ASCII BEL on stdout
pub struct TerminalBell;

impl AlertSink for TerminalBell {
    fn play(&self) -> std::io::Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(b"\x07")?;
        stdout.flush()
    }
}

#[derive(Debug)]
pub(crate) enum AlertCommand {
    Ring,
}

/// Cheap, cloneable handle for enqueuing alerts from the frame loop.
///
/// Enqueuing never blocks; if the queue is full the alert is dropped
/// (the cooldown makes a lost duplicate harmless).
#[derive(Clone)]
pub struct AlertHandle {
    tx: mpsc::Sender<AlertCommand>,
}

impl AlertHandle {
    pub(crate) fn new(tx: mpsc::Sender<AlertCommand>) -> Self {
        Self { tx }
    }

    /// Enqueue one alert emission
    pub fn ring(&self) {
        if self.tx.try_send(AlertCommand::Ring).is_err() {
            debug!("Alert queue full or closed; dropping alert");
        }
    }
}

/// Background playback task
pub struct AlertChannel;

impl AlertChannel {
    /// Spawn the playback task over the given sink and return the
    /// enqueue handle. The task drains until every handle is dropped.
    pub fn spawn(sink: Arc<dyn AlertSink>) -> AlertHandle {
        let (tx, mut rx) = mpsc::channel(8);
        tokio::spawn(async move {
            while let Some(AlertCommand::Ring) = rx.recv().await {
                if let Err(e) = sink.play() {
                    warn!("Alert sink failed: {}; falling back to terminal bell", e);
                    if let Err(e) = TerminalBell.play() {
                        warn!("Terminal bell failed: {}", e);
                    }
                }
            }
        });
        AlertHandle::new(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingSink {
        plays: AtomicUsize,
    }

    impl AlertSink for CountingSink {
        fn play(&self) -> std::io::Result<()> {
            self.plays.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingSink;

    impl AlertSink for FailingSink {
        fn play(&self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "no device"))
        }
    }

    #[tokio::test]
    async fn test_channel_drains_rings_to_sink() {
        let sink = Arc::new(CountingSink {
            plays: AtomicUsize::new(0),
        });
        let handle = AlertChannel::spawn(sink.clone());

        handle.ring();
        handle.ring();
        handle.ring();

        for _ in 0..50 {
            if sink.plays.load(Ordering::SeqCst) == 3 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("sink saw {} plays, expected 3", sink.plays.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_failing_sink_never_panics_the_task() {
        let handle = AlertChannel::spawn(Arc::new(FailingSink));
        handle.ring();
        tokio::time::sleep(Duration::from_millis(50)).await;
        // Task is still alive and accepting work
        handle.ring();
    }
}
