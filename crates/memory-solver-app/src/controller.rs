//! Capture lifecycle state machine.

use memory_solver_capture::{
    CaptureError, CapturePlatform, PlaybackSource, Recorder, RefreshConfig,
    RefreshScheduler, SourceKind, UploadHandle, VideoSource,
};
use memory_solver_core::Frame;
use memory_solver_ui::UiLifecycle;

use crate::AppError;

/// Default delay between a recording becoming ready and scanning starting.
pub const DEFAULT_AUTOSTART_DELAY_MS: u64 = 500;
/// Default cadence at which recordings buffer chunks and uploads play.
pub const DEFAULT_REPLAY_FPS: u32 = 30;
/// Default JPEG quality of recording chunks.
pub const DEFAULT_RECORDING_QUALITY: u8 = 85;

/// Lifecycle phase of the capture controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No source attached.
    Idle,
    /// Screen capture is being buffered for replay.
    Recording,
    /// Source attached, sampling paused.
    SourceReady,
    /// Source attached, sampling runs on every due refresh.
    Scanning,
}

impl From<CaptureState> for UiLifecycle {
    fn from(state: CaptureState) -> Self {
        match state {
            CaptureState::Idle => UiLifecycle::Idle,
            CaptureState::Recording => UiLifecycle::Recording,
            CaptureState::SourceReady => UiLifecycle::SourceReady,
            CaptureState::Scanning => UiLifecycle::Scanning,
        }
    }
}

/// Notable transition reported back to the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Upload attached, waiting for the user to start scanning.
    UploadAttached,
    /// Live share granted and scanning.
    ShareConnected,
    /// Recording started.
    RecordingStarted,
    /// Recording finalized and attached for replay.
    RecordingReady,
    /// Recording finished without any frame.
    RecordingEmpty,
    /// Live share stopped from the platform side.
    ShareEnded,
    /// Scanning resumed by the user.
    ScanResumed,
    /// Scanning paused by the user.
    ScanPaused,
    /// Scanning started after the recording grace delay.
    ScanAutoStarted,
    /// Everything released.
    Reset,
}

/// Controller tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Display refresh cadence driving sampling ticks.
    pub refresh: RefreshConfig,
    /// Chunk cadence for recordings and playback rate for frame uploads.
    pub replay_fps: u32,
    /// Delay before a finished recording starts scanning.
    pub autostart_delay_ms: u64,
    /// JPEG quality of recording chunks.
    pub recording_quality: u8,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            refresh: RefreshConfig::default(),
            replay_fps: DEFAULT_REPLAY_FPS,
            autostart_delay_ms: DEFAULT_AUTOSTART_DELAY_MS,
            recording_quality: DEFAULT_RECORDING_QUALITY,
        }
    }
}

struct CaptureSession {
    kind: SourceKind,
    media: Box<dyn VideoSource>,
    recorder: Option<Recorder>,
}

/// Pending scan autostart for a finished recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Autostart {
    Off,
    /// Waiting for the next refresh to fix the deadline.
    Armed,
    Due(u64),
}

/// Governs which source feeds the sampler and whether sampling is active.
///
/// At most one session exists; every new source tears the previous one down
/// first, and leaving [`CaptureState::Scanning`] stops the scheduler in the
/// same call.
pub struct CaptureController {
    config: ControllerConfig,
    platform: Box<dyn CapturePlatform>,
    state: CaptureState,
    session: Option<CaptureSession>,
    scheduler: RefreshScheduler,
    autostart: Autostart,
}

impl CaptureController {
    /// Creates an idle controller over `platform`.
    pub fn new(config: ControllerConfig, platform: Box<dyn CapturePlatform>) -> Self {
        Self {
            config,
            platform,
            state: CaptureState::Idle,
            session: None,
            scheduler: RefreshScheduler::new(config.refresh),
            autostart: Autostart::Off,
        }
    }

    /// Current lifecycle phase.
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Active configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Kind of the attached source.
    pub fn source_kind(&self) -> Option<SourceKind> {
        self.session.as_ref().map(|session| session.kind)
    }

    /// Returns `true` while a source is attached (or being recorded).
    pub fn has_source(&self) -> bool {
        self.session.is_some()
    }

    /// Live capture tracks held by the session.
    pub fn live_tracks(&self) -> usize {
        self.session
            .as_ref()
            .map_or(0, |session| session.media.live_tracks())
    }

    /// Returns `true` once the attached source produces no further frames.
    pub fn source_ended(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.media.has_ended())
    }

    /// Returns `true` while the refresh scheduler requests ticks.
    pub fn is_sampling(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Refresh time at which a finished recording starts scanning.
    ///
    /// A recording stopped by the user gets its deadline on the next
    /// [`CaptureController::advance`], so this is `None` until then.
    pub fn autostart_at_ms(&self) -> Option<u64> {
        match self.autostart {
            Autostart::Due(due) => Some(due),
            Autostart::Off | Autostart::Armed => None,
        }
    }

    /// Attaches an uploaded video, replacing any session.
    pub fn attach_upload(&mut self, handle: UploadHandle) -> LifecycleEvent {
        tracing::info!(
            upload = handle.name(),
            frames = handle.frame_count(),
            duration_ms = handle.duration_ms(),
            "upload attached"
        );
        self.teardown();
        self.session = Some(CaptureSession {
            kind: SourceKind::Upload,
            media: Box::new(PlaybackSource::from_upload(handle)),
            recorder: None,
        });
        self.state = CaptureState::SourceReady;
        LifecycleEvent::UploadAttached
    }

    /// Requests a live share and starts scanning it.
    ///
    /// # Errors
    /// Returns [`AppError::RecordingInProgress`] while recording and
    /// [`AppError::Acquisition`] when the platform refuses; the prior state is
    /// kept in both cases.
    pub fn start_live_share(&mut self) -> Result<LifecycleEvent, AppError> {
        let media = self.request_stream()?;
        self.teardown();
        self.session = Some(CaptureSession {
            kind: SourceKind::LiveShare,
            media,
            recorder: None,
        });
        self.state = CaptureState::Scanning;
        self.scheduler.start();
        tracing::info!("live share connected");
        Ok(LifecycleEvent::ShareConnected)
    }

    /// Requests a capture stream and starts buffering it for replay.
    ///
    /// # Errors
    /// Same as [`CaptureController::start_live_share`], plus
    /// [`AppError::Capture`] when the recorder configuration is invalid.
    pub fn start_recording(&mut self) -> Result<LifecycleEvent, AppError> {
        let recorder = Recorder::new(self.config.replay_fps, self.config.recording_quality)?;
        let media = self.request_stream()?;
        self.teardown();
        self.session = Some(CaptureSession {
            kind: SourceKind::Recording,
            media,
            recorder: Some(recorder),
        });
        self.state = CaptureState::Recording;
        tracing::info!("recording started");
        Ok(LifecycleEvent::RecordingStarted)
    }

    /// Finalizes the recording in progress and attaches it for replay.
    ///
    /// # Errors
    /// Returns [`AppError::NotRecording`] outside [`CaptureState::Recording`]
    /// and [`AppError::Capture`] when the recording cannot be decoded.
    pub fn stop_recording(&mut self) -> Result<LifecycleEvent, AppError> {
        if self.state != CaptureState::Recording {
            return Err(AppError::NotRecording);
        }
        self.finalize_recording(None)
    }

    /// Flips between [`CaptureState::SourceReady`] and
    /// [`CaptureState::Scanning`]; `None` when the request is ignored.
    pub fn toggle_scan(&mut self) -> Option<LifecycleEvent> {
        if self.session.is_none() {
            return None;
        }
        match self.state {
            CaptureState::SourceReady => {
                self.enter_scanning();
                Some(LifecycleEvent::ScanResumed)
            }
            CaptureState::Scanning => {
                self.state = CaptureState::SourceReady;
                self.scheduler.stop();
                tracing::info!("scan paused");
                Some(LifecycleEvent::ScanPaused)
            }
            CaptureState::Idle | CaptureState::Recording => None,
        }
    }

    /// Stops every track, releases the source, and returns to idle.
    pub fn reset(&mut self) -> LifecycleEvent {
        self.teardown();
        tracing::info!("controller reset");
        LifecycleEvent::Reset
    }

    /// Runs per-refresh housekeeping: buffers recording chunks, finalizes
    /// ended recordings, fires the scan autostart, and drops ended shares.
    ///
    /// # Errors
    /// Returns [`AppError::Capture`] when an ended recording cannot be
    /// decoded; the controller is idle afterwards.
    pub fn advance(&mut self, now_ms: u64) -> Result<Option<LifecycleEvent>, AppError> {
        match self.state {
            CaptureState::Recording => {
                let Some(session) = self.session.as_mut() else {
                    return Ok(None);
                };
                session.media.advance(now_ms);
                if let (Some(frame), Some(recorder)) =
                    (session.media.frame(), session.recorder.as_mut())
                    && let Err(error) = recorder.offer(frame, now_ms)
                {
                    tracing::warn!(%error, "recording chunk dropped");
                }
                if session.media.has_ended() {
                    return self.finalize_recording(Some(now_ms)).map(Some);
                }
                Ok(None)
            }
            CaptureState::SourceReady => {
                if self.autostart == Autostart::Armed {
                    self.autostart = self.deadline_from(now_ms);
                }
                if matches!(self.autostart, Autostart::Due(due) if now_ms >= due) {
                    self.enter_scanning();
                    return Ok(Some(LifecycleEvent::ScanAutoStarted));
                }
                Ok(None)
            }
            CaptureState::Scanning => {
                if self.source_kind() == Some(SourceKind::LiveShare) && self.source_ended() {
                    self.teardown();
                    tracing::info!("live share ended by the platform");
                    return Ok(Some(LifecycleEvent::ShareEnded));
                }
                Ok(None)
            }
            CaptureState::Idle => Ok(None),
        }
    }

    /// Returns `true` when a sampling tick fires on this refresh.
    pub fn poll_tick(&mut self, now_ms: u64) -> bool {
        self.state == CaptureState::Scanning && self.scheduler.poll(now_ms)
    }

    /// Completes the tick fired by [`CaptureController::poll_tick`].
    pub fn finish_tick(&mut self, now_ms: u64) {
        self.scheduler.finish_tick(now_ms);
    }

    /// Advances the attached source to `now_ms` and returns its frame with
    /// the dimensions it reports for that same frame.
    pub fn current_frame(&mut self, now_ms: u64) -> Option<(&Frame, (u32, u32))> {
        let session = self.session.as_mut()?;
        session.media.advance(now_ms);
        let reported = session.media.dimensions();
        session.media.frame().map(|frame| (frame, reported))
    }

    fn request_stream(&mut self) -> Result<Box<dyn VideoSource>, AppError> {
        if self.state == CaptureState::Recording {
            return Err(AppError::RecordingInProgress);
        }
        self.platform.request_display_stream().map_err(|error| {
            tracing::warn!(%error, "screen share request failed");
            AppError::Acquisition(error)
        })
    }

    fn enter_scanning(&mut self) {
        self.state = CaptureState::Scanning;
        self.autostart = Autostart::Off;
        self.scheduler.start();
        tracing::info!("scan started");
    }

    fn deadline_from(&self, now_ms: u64) -> Autostart {
        Autostart::Due(now_ms.saturating_add(self.config.autostart_delay_ms))
    }

    /// `now_ms` is the refresh that observed the end of the recording, or
    /// `None` for an explicit stop.
    fn finalize_recording(&mut self, now_ms: Option<u64>) -> Result<LifecycleEvent, AppError> {
        let recorder = self.session.as_mut().and_then(|session| session.recorder.take());
        self.teardown();

        let Some(recorder) = recorder else {
            return Ok(LifecycleEvent::RecordingEmpty);
        };
        let blob = match recorder.finish() {
            Ok(blob) => blob,
            Err(CaptureError::EmptySource) => {
                tracing::info!("recording ended without frames");
                return Ok(LifecycleEvent::RecordingEmpty);
            }
            Err(error) => return Err(error.into()),
        };

        tracing::info!(
            chunks = blob.chunks().len(),
            bytes = blob.byte_len(),
            duration_ms = blob.duration_ms(),
            "recording finalized"
        );
        let handle = blob.into_upload("recording")?;
        self.session = Some(CaptureSession {
            kind: SourceKind::Recording,
            media: Box::new(PlaybackSource::from_recording(handle)),
            recorder: None,
        });
        self.state = CaptureState::SourceReady;
        self.autostart = match now_ms {
            Some(now_ms) => self.deadline_from(now_ms),
            None => Autostart::Armed,
        };
        Ok(LifecycleEvent::RecordingReady)
    }

    fn teardown(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.media.stop();
            tracing::debug!(kind = ?session.kind, "session released");
        }
        self.scheduler.stop();
        self.autostart = Autostart::Off;
        self.state = CaptureState::Idle;
    }
}
