//! Owned aggregate wiring the controller, sampler, evidence, and view.

use memory_solver_capture::{CapturePlatform, UploadHandle};
use memory_solver_core::{ScanConfig, Sensitivity};
use memory_solver_scan::{EvidenceStore, SampleReport, Sampler};
use memory_solver_ui::{
    STATUS_PAUSED, STATUS_RECORDING, STATUS_RECORDING_EMPTY, STATUS_RECORDING_READY,
    STATUS_SCANNING, STATUS_SHARE_CONNECTED, STATUS_SHARE_ENDED, STATUS_UPLOAD_READY, ScannerView,
};

use crate::{AppError, CaptureController, CaptureState, ControllerConfig, LifecycleEvent, app_version};

/// One scanning instance: a capture controller, its sampler, the evidence
/// store, and the view state shown to the user.
pub struct Scanner {
    controller: CaptureController,
    sampler: Sampler,
    evidence: EvidenceStore,
    view: ScannerView,
}

impl Scanner {
    /// Creates an idle scanner.
    pub fn new(
        scan: ScanConfig,
        controller: ControllerConfig,
        platform: Box<dyn CapturePlatform>,
    ) -> Self {
        let mut view = ScannerView::new(app_version());
        view.threshold = scan.sensitivity.value();
        Self {
            controller: CaptureController::new(controller, platform),
            sampler: Sampler::new(scan),
            evidence: EvidenceStore::new(),
            view,
        }
    }

    /// Creates an idle scanner with default tuning.
    pub fn with_platform(platform: Box<dyn CapturePlatform>) -> Self {
        Self::new(ScanConfig::default(), ControllerConfig::default(), platform)
    }

    /// Attaches an uploaded video and clears the board.
    pub fn attach_upload(&mut self, handle: UploadHandle) {
        let event = self.controller.attach_upload(handle);
        self.begin_source(event);
    }

    /// Starts scanning a live screen share.
    ///
    /// # Errors
    /// See [`CaptureController::start_live_share`]. On acquisition failure the
    /// view shows the platform's reason and the board is kept.
    pub fn start_live_share(&mut self) -> Result<(), AppError> {
        let result = self.controller.start_live_share();
        self.finish_acquisition(result)
    }

    /// Starts a screen recording that is scanned once it ends.
    ///
    /// # Errors
    /// See [`CaptureController::start_recording`].
    pub fn start_recording(&mut self) -> Result<(), AppError> {
        let result = self.controller.start_recording();
        self.finish_acquisition(result)
    }

    /// Ends the recording in progress and schedules its scan.
    ///
    /// # Errors
    /// See [`CaptureController::stop_recording`].
    pub fn stop_recording(&mut self) -> Result<(), AppError> {
        match self.controller.stop_recording() {
            Ok(event) => {
                self.apply_event(event);
                Ok(())
            }
            Err(AppError::NotRecording) => Err(AppError::NotRecording),
            Err(error) => {
                self.sync_failure(&error);
                Err(error)
            }
        }
    }

    /// Pauses or resumes sampling.
    ///
    /// # Returns
    /// `true` when the request was acted on.
    pub fn toggle_scan(&mut self) -> bool {
        match self.controller.toggle_scan() {
            Some(event) => {
                self.apply_event(event);
                true
            }
            None => false,
        }
    }

    /// Releases every resource and clears the board.
    pub fn reset(&mut self) {
        let event = self.controller.reset();
        self.evidence.reset_all();
        self.apply_event(event);
    }

    /// Changes the sensitivity threshold from the next sampling pass on.
    ///
    /// # Errors
    /// Returns [`AppError::Core`] when `value` lies outside `[40, 150]`.
    pub fn set_threshold(&mut self, value: u32) -> Result<(), AppError> {
        let sensitivity = Sensitivity::new(value)?;
        self.sampler.set_sensitivity(sensitivity);
        self.view.threshold = sensitivity.value();
        tracing::debug!(threshold = value, "sensitivity changed");
        Ok(())
    }

    /// Drives the scanner for one display refresh at `now_ms`.
    ///
    /// # Returns
    /// The report of the sampling pass when a tick fired.
    pub fn on_refresh(&mut self, now_ms: u64) -> Option<SampleReport> {
        match self.controller.advance(now_ms) {
            Ok(Some(event)) => self.apply_event(event),
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(%error, "recording could not be finalized");
                self.sync_failure(&error);
            }
        }

        if !self.controller.poll_tick(now_ms) {
            return None;
        }
        let report = match self.controller.current_frame(now_ms) {
            Some((frame, reported)) => self.sampler.sample(frame, reported, &mut self.evidence),
            None => SampleReport {
                revealed: self.evidence.revealed_count(),
                empty_frame: true,
                ..SampleReport::default()
            },
        };
        self.controller.finish_tick(now_ms);

        if report.changed() {
            self.view.apply_progress(report.revealed);
        }
        Some(report)
    }

    /// Current lifecycle phase.
    pub fn state(&self) -> CaptureState {
        self.controller.state()
    }

    /// Per-cell evidence.
    pub fn evidence(&self) -> &EvidenceStore {
        &self.evidence
    }

    /// View state for the shell.
    pub fn view(&self) -> &ScannerView {
        &self.view
    }

    /// Status line.
    pub fn status(&self) -> &str {
        &self.view.status
    }

    /// Capture controller.
    pub fn controller(&self) -> &CaptureController {
        &self.controller
    }

    /// Active scan configuration.
    pub fn scan_config(&self) -> &ScanConfig {
        self.sampler.config()
    }

    /// Returns `true` once the attached source produces no further frames.
    pub fn source_ended(&self) -> bool {
        self.controller.source_ended()
    }

    fn finish_acquisition(&mut self, result: Result<LifecycleEvent, AppError>) -> Result<(), AppError> {
        match result {
            Ok(event) => {
                self.begin_source(event);
                Ok(())
            }
            Err(AppError::Acquisition(error)) => {
                self.view.report_error(&error.to_string());
                Err(AppError::Acquisition(error))
            }
            Err(error) => Err(error),
        }
    }

    fn begin_source(&mut self, event: LifecycleEvent) {
        self.evidence.reset_all();
        self.view.begin_source();
        self.apply_event(event);
    }

    fn sync_failure(&mut self, error: &AppError) {
        self.view.report_failure(error.to_string());
        self.view.lifecycle = self.controller.state().into();
        self.view.source = self.controller.source_kind();
    }

    fn apply_event(&mut self, event: LifecycleEvent) {
        let lifecycle = self.controller.state().into();
        let source = self.controller.source_kind();
        let status = match event {
            LifecycleEvent::Reset => {
                self.view.reset();
                return;
            }
            LifecycleEvent::UploadAttached => STATUS_UPLOAD_READY.to_string(),
            LifecycleEvent::ShareConnected => STATUS_SHARE_CONNECTED.to_string(),
            LifecycleEvent::RecordingStarted => STATUS_RECORDING.to_string(),
            LifecycleEvent::RecordingReady => STATUS_RECORDING_READY.to_string(),
            LifecycleEvent::RecordingEmpty => STATUS_RECORDING_EMPTY.to_string(),
            LifecycleEvent::ShareEnded => STATUS_SHARE_ENDED.to_string(),
            LifecycleEvent::ScanPaused => STATUS_PAUSED.to_string(),
            LifecycleEvent::ScanResumed | LifecycleEvent::ScanAutoStarted => {
                if self.view.revealed > 0 {
                    format!("{STATUS_SCANNING} {}", self.view.revealed_label())
                } else {
                    STATUS_SCANNING.to_string()
                }
            }
        };
        self.view.transition(lifecycle, source, status);
    }
}
