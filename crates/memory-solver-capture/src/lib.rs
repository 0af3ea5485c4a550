#![warn(missing_docs)]
//! # memory-solver-capture
//!
//! ## Purpose
//! Provides the video source and capture platform abstractions that feed the
//! frame sampler.
//!
//! ## Responsibilities
//! - Define a backend-agnostic [`VideoSource`] and [`CapturePlatform`].
//! - Wrap uploaded frame sequences and finished recordings as playable
//!   [`PlaybackSource`] values.
//! - Buffer encoded chunks of a screen capture in a [`Recorder`].
//! - Gate sampling ticks to the display refresh with a [`RefreshScheduler`].
//! - Expose real display capture on supported platforms and deterministic
//!   synthetic capture for tests.
//!
//! ## Data flow
//! Controller requests a stream from a [`CapturePlatform`] or wraps an
//! [`UploadHandle`] -> the session owns a boxed [`VideoSource`] -> each due
//! refresh tick reads the current [`memory_solver_core::Frame`] from it.
//!
//! ## Ownership and lifetimes
//! A session owns exactly one source. Sources hand out borrowed frames that
//! live until the next `advance` call, so no frame buffer is copied on the
//! sampling path.
//!
//! ## Error model
//! Denied share requests, unknown displays, backend failures, and recording
//! codec failures are reported as [`CaptureError`] values.
//!
//! ## Privacy notes
//! Sources never persist frames to disk; recordings live in memory only.

mod playback;
mod recorder;
mod scheduler;
mod synthetic;

pub use playback::{PlaybackSource, TimedFrame, UploadHandle};
pub use recorder::{EncodedChunk, Recorder, RecordingBlob};
pub use scheduler::{DEFAULT_REFRESH_FPS, RefreshConfig, RefreshScheduler};
pub use synthetic::{StreamMonitor, SyntheticPlatform};

use memory_solver_core::{CoreError, Frame};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Origin of the frames feeding a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// User-provided video file.
    Upload,
    /// Live screen or window share.
    LiveShare,
    /// Replay of a finished screen recording.
    Recording,
}

/// Playable video source sampled by the scanner.
pub trait VideoSource: Send {
    /// Kind of source.
    fn kind(&self) -> SourceKind;

    /// Presents the frame due at `now_ms`.
    fn advance(&mut self, now_ms: u64);

    /// Frame presented by the last [`VideoSource::advance`].
    ///
    /// `None` when the source is not ready, has ended, or was stopped.
    fn frame(&self) -> Option<&Frame>;

    /// Native dimensions of the presented frame, `(0, 0)` until known.
    fn dimensions(&self) -> (u32, u32);

    /// Advances to `now_ms` and returns the presented frame.
    fn current_frame(&mut self, now_ms: u64) -> Option<&Frame> {
        self.advance(now_ms);
        self.frame()
    }

    /// Returns `true` once the source will not produce further frames.
    fn has_ended(&self) -> bool;

    /// Number of live capture tracks held by this source.
    fn live_tracks(&self) -> usize;

    /// Stops every capture track and releases buffered media.
    fn stop(&mut self);
}

/// Host facility that grants screen or window capture streams.
pub trait CapturePlatform: Send {
    /// Requests a display capture stream.
    ///
    /// # Errors
    /// Returns [`CaptureError::Denied`] when the user or platform refuses, and
    /// [`CaptureError::Backend`] for runtime failures.
    fn request_display_stream(&mut self) -> Result<Box<dyn VideoSource>, CaptureError>;
}

/// Metadata describing one available display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayInfo {
    /// Stable display identifier.
    pub id: String,
    /// Human-readable display name.
    pub name: String,
    /// Native display width in pixels.
    pub width: u32,
    /// Native display height in pixels.
    pub height: u32,
}

/// Real display capture platform for supported desktop targets.
///
/// # Notes
/// Display metadata is snapshotted at discovery; every frame reacquires the
/// current screen handle.
#[derive(Debug, Clone)]
pub struct ScreenCapturePlatform {
    displays: Vec<DisplayInfo>,
    selected: usize,
}

impl ScreenCapturePlatform {
    /// Discovers currently available displays.
    ///
    /// # Errors
    /// Returns [`CaptureError::Backend`] when enumeration fails, no display is
    /// reported, or the target has no capture backend.
    pub fn discover() -> Result<Self, CaptureError> {
        #[cfg(windows)]
        {
            use screenshots::Screen;

            let screens = Screen::all().map_err(|error| {
                CaptureError::Backend(format!("screen enumeration failed: {error}"))
            })?;

            if screens.is_empty() {
                return Err(CaptureError::Backend(
                    "no displays were reported by the OS".to_string(),
                ));
            }

            let displays = screens
                .iter()
                .enumerate()
                .map(|(index, screen)| DisplayInfo {
                    id: format!("display-{index}"),
                    name: format!("Display {}", index + 1),
                    width: screen.display_info.width.max(1) as u32,
                    height: screen.display_info.height.max(1) as u32,
                })
                .collect();

            Ok(Self {
                displays,
                selected: 0,
            })
        }

        #[cfg(not(windows))]
        {
            Err(CaptureError::Backend(
                "screen capture is currently implemented for Windows only".to_string(),
            ))
        }
    }

    /// Enumerates discovered displays.
    pub fn list_displays(&self) -> &[DisplayInfo] {
        &self.displays
    }

    /// Chooses the display future streams capture.
    ///
    /// # Errors
    /// Returns [`CaptureError::UnknownDisplay`] when `display_id` is unknown.
    pub fn select_display(&mut self, display_id: &str) -> Result<(), CaptureError> {
        self.selected = self
            .displays
            .iter()
            .position(|display| display.id == display_id)
            .ok_or_else(|| CaptureError::UnknownDisplay(display_id.to_string()))?;
        Ok(())
    }
}

impl CapturePlatform for ScreenCapturePlatform {
    fn request_display_stream(&mut self) -> Result<Box<dyn VideoSource>, CaptureError> {
        let info = self
            .displays
            .get(self.selected)
            .cloned()
            .ok_or_else(|| CaptureError::Backend("no display selected".to_string()))?;

        tracing::info!(display = %info.id, "screen capture stream granted");
        Ok(Box::new(ScreenStream {
            index: self.selected,
            info,
            current: None,
            ended: false,
            stopped: false,
        }))
    }
}

struct ScreenStream {
    #[cfg_attr(not(windows), allow(dead_code))]
    index: usize,
    info: DisplayInfo,
    current: Option<Frame>,
    ended: bool,
    stopped: bool,
}

impl ScreenStream {
    fn grab(&self, now_ms: u64) -> Result<Frame, CaptureError> {
        #[cfg(windows)]
        {
            use screenshots::Screen;

            let screens = Screen::all().map_err(|error| {
                CaptureError::Backend(format!("screen refresh failed: {error}"))
            })?;
            let screen = screens.get(self.index).ok_or_else(|| {
                CaptureError::Backend(format!(
                    "display index {} is not available anymore",
                    self.index
                ))
            })?;

            let captured = screen.capture().map_err(|error| {
                CaptureError::Backend(format!("screen capture failed: {error}"))
            })?;
            let width = captured.width();
            let height = captured.height();

            Ok(Frame::new(width, height, now_ms, captured.into_raw())?)
        }

        #[cfg(not(windows))]
        {
            let _ = now_ms;
            Err(CaptureError::Backend(
                "screen capture is currently implemented for Windows only".to_string(),
            ))
        }
    }
}

impl VideoSource for ScreenStream {
    fn kind(&self) -> SourceKind {
        SourceKind::LiveShare
    }

    fn dimensions(&self) -> (u32, u32) {
        match &self.current {
            Some(frame) => (frame.width, frame.height),
            None => (self.info.width, self.info.height),
        }
    }

    fn advance(&mut self, now_ms: u64) {
        if self.stopped || self.ended {
            self.current = None;
            return;
        }

        match self.grab(now_ms) {
            Ok(frame) => self.current = Some(frame),
            Err(error) => {
                // A display that can no longer be captured behaves like a
                // share the user stopped.
                tracing::warn!(display = %self.info.id, %error, "screen capture stream ended");
                self.ended = true;
                self.current = None;
            }
        }
    }

    fn frame(&self) -> Option<&Frame> {
        if self.stopped {
            return None;
        }
        self.current.as_ref()
    }

    fn has_ended(&self) -> bool {
        self.ended
    }

    fn live_tracks(&self) -> usize {
        usize::from(!self.stopped && !self.ended)
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.current = None;
    }
}

/// Platform used where no capture backend exists; every request is denied.
#[derive(Debug, Clone)]
pub struct UnavailablePlatform {
    reason: String,
}

impl UnavailablePlatform {
    /// Creates a platform that denies requests with `reason`.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl CapturePlatform for UnavailablePlatform {
    fn request_display_stream(&mut self) -> Result<Box<dyn VideoSource>, CaptureError> {
        Err(CaptureError::Denied(self.reason.clone()))
    }
}

/// Capture layer error type.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Refresh rate must be positive.
    #[error("invalid fps: must be greater than zero")]
    InvalidFps,
    /// User or platform refused the capture request.
    #[error("{0}")]
    Denied(String),
    /// Requested display is unknown to the platform.
    #[error("unknown display: {0}")]
    UnknownDisplay(String),
    /// Backend runtime failure.
    #[error("capture backend failure: {0}")]
    Backend(String),
    /// Upload handle or recording holds no frames.
    #[error("source contains no frames")]
    EmptySource,
    /// Recording chunk could not be encoded or decoded.
    #[error("recording codec failure: {0}")]
    Codec(#[from] image::ImageError),
    /// Frame validation failed.
    #[error("invalid frame: {0}")]
    Frame(#[from] CoreError),
}
