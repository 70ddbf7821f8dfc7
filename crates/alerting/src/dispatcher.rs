//! Cooldown-limited alert dispatch

use crate::sound::AlertHandle;
use crate::AlertError;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Minimum interval between two alert emissions (seconds)
    pub cooldown_seconds: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: 2,
        }
    }
}

impl DispatchConfig {
    /// Validate the configuration before any frame is processed
    pub fn validate(&self) -> Result<(), AlertError> {
        if self.cooldown_seconds == 0 {
            return Err(AlertError::Config(
                "cooldown_seconds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_seconds)
    }
}

/// Rate-limits alert emission independent of frame rate.
///
/// However many frames request an alert during the cooldown window, at
/// most one is emitted per window. The caller supplies the monotonic
/// clock, so the cooldown is frame-rate independent and testable.
pub struct AlertDispatcher {
    config: DispatchConfig,
    last_alert: Option<Instant>,
    handle: AlertHandle,
}

impl AlertDispatcher {
    /// Create a dispatcher emitting through the given alert handle
    pub fn new(config: DispatchConfig, handle: AlertHandle) -> Self {
        Self {
            config,
            last_alert: None,
            handle,
        }
    }

    /// Emit an alert if the alarm is active and the cooldown allows it.
    ///
    /// Returns whether an alert was actually emitted. Emission itself is
    /// queued (fire-and-forget); this call never blocks on audio.
    pub fn maybe_alert(&mut self, alarm_active: bool, now: Instant) -> bool {
        if !alarm_active {
            return false;
        }

        if let Some(last) = self.last_alert {
            if now.duration_since(last) <= self.config.cooldown() {
                debug!("Alert suppressed: in cooldown period");
                return false;
            }
        }

        warn!("DROWSINESS ALERT");
        self.last_alert = Some(now);
        self.handle.ring();
        true
    }

    /// Time of the most recent emission, if any
    pub fn last_alert(&self) -> Option<Instant> {
        self.last_alert
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn dispatcher(cooldown_seconds: u64) -> (AlertDispatcher, mpsc::Receiver<crate::sound::AlertCommand>) {
        let (tx, rx) = mpsc::channel(64);
        (
            AlertDispatcher::new(
                DispatchConfig { cooldown_seconds },
                AlertHandle::new(tx),
            ),
            rx,
        )
    }

    #[test]
    fn test_inactive_alarm_never_emits() {
        let (mut d, mut rx) = dispatcher(2);
        let now = Instant::now();
        assert!(!d.maybe_alert(false, now));
        assert!(d.last_alert().is_none());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_first_alert_emits_immediately() {
        let (mut d, mut rx) = dispatcher(2);
        assert!(d.maybe_alert(true, Instant::now()));
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn test_cooldown_suppresses_within_window() {
        let (mut d, _rx) = dispatcher(2);
        let base = Instant::now();

        assert!(d.maybe_alert(true, base));
        assert!(!d.maybe_alert(true, base + Duration::from_millis(500)));
        assert!(!d.maybe_alert(true, base + Duration::from_millis(1999)));
        // Exactly the cooldown boundary is still suppressed
        assert!(!d.maybe_alert(true, base + Duration::from_secs(2)));
        assert!(d.maybe_alert(true, base + Duration::from_millis(2001)));
    }

    #[test]
    fn test_sustained_alarm_caps_emissions_over_time() {
        let (mut d, _rx) = dispatcher(2);
        let base = Instant::now();

        // 10 seconds of alarm at 10 fps
        let mut emitted = 0;
        for i in 0..100 {
            if d.maybe_alert(true, base + Duration::from_millis(i * 100)) {
                emitted += 1;
            }
        }
        assert!(emitted <= 5, "emitted {} alerts in 10s with 2s cooldown", emitted);
        assert!(emitted >= 4);
    }

    #[test]
    fn test_recovery_does_not_reset_cooldown() {
        let (mut d, _rx) = dispatcher(2);
        let base = Instant::now();

        assert!(d.maybe_alert(true, base));
        // Alarm clears, then reactivates inside the window
        assert!(!d.maybe_alert(false, base + Duration::from_millis(500)));
        assert!(!d.maybe_alert(true, base + Duration::from_millis(1000)));
        assert!(d.maybe_alert(true, base + Duration::from_millis(2500)));
    }

    #[test]
    fn test_zero_cooldown_rejected() {
        let config = DispatchConfig {
            cooldown_seconds: 0,
        };
        assert!(config.validate().is_err());
        assert!(DispatchConfig::default().validate().is_ok());
    }
}
