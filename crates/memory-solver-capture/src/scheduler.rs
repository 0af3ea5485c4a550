//! Display-refresh tick scheduling.

use crate::CaptureError;

/// Refresh rate assumed for display-synchronized sampling.
pub const DEFAULT_REFRESH_FPS: u32 = 60;

/// Refresh configuration used by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Refreshes per second.
    pub fps: u32,
}

impl RefreshConfig {
    /// Creates validated refresh configuration.
    ///
    /// # Errors
    /// Returns [`CaptureError::InvalidFps`] when `fps == 0`.
    pub fn new(fps: u32) -> Result<Self, CaptureError> {
        if fps == 0 {
            return Err(CaptureError::InvalidFps);
        }
        Ok(Self { fps })
    }

    /// Returns the refresh interval in milliseconds (at least 1).
    pub fn interval_ms(&self) -> u64 {
        (1_000 / self.fps as u64).max(1)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_REFRESH_FPS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickState {
    Stopped,
    /// Next tick fires on the first refresh at or after `due_ms`; `None`
    /// means the very next refresh.
    Waiting { due_ms: Option<u64> },
    InFlight,
}

/// Gates sampling ticks onto display refreshes.
///
/// At most one tick is pending at a time: a fired tick must be completed with
/// [`RefreshScheduler::finish_tick`] before the next one is scheduled.
/// [`RefreshScheduler::stop`] takes effect immediately; a tick already in
/// flight may still complete but schedules nothing further.
#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    config: RefreshConfig,
    state: TickState,
    ticks_fired: u64,
}

impl RefreshScheduler {
    /// Creates a stopped scheduler.
    pub fn new(config: RefreshConfig) -> Self {
        Self {
            config,
            state: TickState::Stopped,
            ticks_fired: 0,
        }
    }

    /// Requests ticks, the first one on the next refresh.
    pub fn start(&mut self) {
        if self.state == TickState::Stopped {
            self.state = TickState::Waiting { due_ms: None };
        }
    }

    /// Stops requesting ticks.
    pub fn stop(&mut self) {
        self.state = TickState::Stopped;
    }

    /// Returns `true` while ticks are requested or one is in flight.
    pub fn is_running(&self) -> bool {
        self.state != TickState::Stopped
    }

    /// Called on every display refresh; returns `true` when a tick fires.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.state {
            TickState::Waiting { due_ms } if due_ms.is_none_or(|due| now_ms >= due) => {
                self.state = TickState::InFlight;
                self.ticks_fired += 1;
                true
            }
            _ => false,
        }
    }

    /// Completes the in-flight tick and schedules the next one.
    pub fn finish_tick(&mut self, now_ms: u64) {
        if self.state == TickState::InFlight {
            self.state = TickState::Waiting {
                due_ms: Some(now_ms.saturating_add(self.config.interval_ms())),
            };
        }
    }

    /// Number of ticks fired since creation.
    pub fn ticks_fired(&self) -> u64 {
        self.ticks_fired
    }

    /// Active refresh configuration.
    pub fn config(&self) -> RefreshConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for tick gating.

    use super::*;

    #[test]
    fn rejects_zero_fps() {
        assert!(matches!(RefreshConfig::new(0), Err(CaptureError::InvalidFps)));
        assert_eq!(RefreshConfig::default().interval_ms(), 16);
    }

    #[test]
    fn fires_once_per_interval_after_completion() {
        let mut scheduler = RefreshScheduler::new(RefreshConfig::new(50).expect("valid fps"));
        assert!(!scheduler.poll(0));

        scheduler.start();
        assert!(scheduler.poll(0));
        // Tick is in flight: no overlap.
        assert!(!scheduler.poll(100));
        scheduler.finish_tick(0);

        assert!(!scheduler.poll(10));
        assert!(scheduler.poll(20));
        assert_eq!(scheduler.ticks_fired(), 2);
    }

    #[test]
    fn stop_during_tick_schedules_nothing() {
        let mut scheduler = RefreshScheduler::new(RefreshConfig::default());
        scheduler.start();
        assert!(scheduler.poll(0));

        scheduler.stop();
        scheduler.finish_tick(0);
        assert!(!scheduler.is_running());
        assert!(!scheduler.poll(1_000));
    }
}
