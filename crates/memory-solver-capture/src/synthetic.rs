//! Deterministic capture platform for tests and CI.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use memory_solver_core::Frame;

use crate::{CaptureError, CapturePlatform, SourceKind, VideoSource};

/// Shared view of the streams granted by a [`SyntheticPlatform`].
///
/// Tests keep a monitor to observe track release and to simulate the user
/// stopping the share from the platform's own controls.
#[derive(Debug, Clone, Default)]
pub struct StreamMonitor {
    live: Arc<AtomicUsize>,
    ended: Arc<AtomicBool>,
}

impl StreamMonitor {
    /// Number of granted tracks not yet stopped.
    pub fn live_tracks(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Ends the current stream as if the user stopped sharing.
    pub fn end_stream(&self) {
        self.ended.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once the current stream has ended.
    pub fn has_ended(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }
}

/// Platform that grants streams replaying a scripted frame list, or denies
/// every request.
#[derive(Debug, Default)]
pub struct SyntheticPlatform {
    frames: Vec<Frame>,
    denial: Option<String>,
    end_after_frames: Option<usize>,
    monitor: StreamMonitor,
    requests: usize,
}

impl SyntheticPlatform {
    /// Grants streams that present `frames` one per query, then repeat the
    /// last frame.
    pub fn with_frames(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            ..Self::default()
        }
    }

    /// Denies every request with `reason`.
    pub fn denying(reason: impl Into<String>) -> Self {
        Self {
            denial: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Ends each granted stream after it has presented `count` frames.
    pub fn ending_after(mut self, count: usize) -> Self {
        self.end_after_frames = Some(count);
        self
    }

    /// Monitor observing granted streams.
    pub fn monitor(&self) -> StreamMonitor {
        self.monitor.clone()
    }

    /// Number of stream requests received.
    pub fn request_count(&self) -> usize {
        self.requests
    }
}

impl CapturePlatform for SyntheticPlatform {
    fn request_display_stream(&mut self) -> Result<Box<dyn VideoSource>, CaptureError> {
        self.requests += 1;
        if let Some(reason) = &self.denial {
            return Err(CaptureError::Denied(reason.clone()));
        }

        self.monitor.ended.store(false, Ordering::SeqCst);
        self.monitor.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SyntheticStream {
            frames: self.frames.clone(),
            cursor: 0,
            presented: None,
            end_after_frames: self.end_after_frames,
            monitor: self.monitor.clone(),
            stopped: false,
        }))
    }
}

struct SyntheticStream {
    frames: Vec<Frame>,
    cursor: usize,
    presented: Option<usize>,
    end_after_frames: Option<usize>,
    monitor: StreamMonitor,
    stopped: bool,
}

impl VideoSource for SyntheticStream {
    fn kind(&self) -> SourceKind {
        SourceKind::LiveShare
    }

    fn advance(&mut self, _now_ms: u64) {
        if self.stopped || self.has_ended() || self.frames.is_empty() {
            self.presented = None;
            return;
        }

        let index = self.cursor.min(self.frames.len() - 1);
        self.cursor += 1;
        self.presented = Some(index);
        if self.end_after_frames.is_some_and(|limit| self.cursor >= limit) {
            self.monitor.end_stream();
        }
    }

    fn frame(&self) -> Option<&Frame> {
        if self.stopped {
            return None;
        }
        self.frames.get(self.presented?)
    }

    fn dimensions(&self) -> (u32, u32) {
        if self.stopped {
            return (0, 0);
        }
        self.frames
            .get(self.presented.unwrap_or(0))
            .map_or((0, 0), |frame| (frame.width, frame.height))
    }

    fn has_ended(&self) -> bool {
        self.monitor.has_ended()
    }

    fn live_tracks(&self) -> usize {
        usize::from(!self.stopped)
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.monitor.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for SyntheticStream {
    fn drop(&mut self) {
        self.stop();
    }
}
