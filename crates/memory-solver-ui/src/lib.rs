#![warn(missing_docs)]
//! # memory-solver-ui
//!
//! ## Purpose
//! Defines the presentation-facing view state for `memory-solver`.
//!
//! ## Responsibilities
//! - Mirror the capture lifecycle and the attached source kind.
//! - Hold the status line and a separate error message.
//! - Expose control gates (toggle scan, start a new source) so the shell can
//!   disable controls that would be ignored.
//!
//! ## Data flow
//! Controller lifecycle events and sampler progress reports mutate
//! [`ScannerView`], which drives the rendered status and the board.
//!
//! ## Ownership and lifetimes
//! `ScannerView` owns all of its strings so the shell can clone or serialize
//! it without borrowing from the scanner.
//!
//! ## Error model
//! This crate favors explicit state over recoverable errors. Invalid
//! combinations are prevented by guard methods.
//!
//! ## Privacy notes
//! View state excludes frames and snapshot bytes.

use memory_solver_capture::SourceKind;
use memory_solver_core::{CELL_COUNT, DEFAULT_THRESHOLD};
use serde::{Deserialize, Serialize};

/// Status shown before any source is attached.
pub const STATUS_WAITING: &str = "Waiting for a video upload or screen share...";
/// Status shown after an upload is attached.
pub const STATUS_UPLOAD_READY: &str = "Video ready, press Start to scan";
/// Status shown after a live share is granted.
pub const STATUS_SHARE_CONNECTED: &str = "Screen share connected";
/// Status shown while a recording is buffered.
pub const STATUS_RECORDING: &str = "Recording screen...";
/// Status shown once a recording is attached for replay.
pub const STATUS_RECORDING_READY: &str = "Recording ready, scanning starts shortly";
/// Status shown when a recording ends without frames.
pub const STATUS_RECORDING_EMPTY: &str = "Recording contained no frames";
/// Status shown when a live share ends on the platform side.
pub const STATUS_SHARE_ENDED: &str = "Screen share ended";
/// Status shown when scanning is paused.
pub const STATUS_PAUSED: &str = "Scan paused";
/// Status shown when scanning resumes.
pub const STATUS_SCANNING: &str = "Scanning...";
/// Status shown after a full reset.
pub const STATUS_RESET: &str = "System reset";

/// Lifecycle phase as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiLifecycle {
    /// No source attached.
    Idle,
    /// Screen recording in progress.
    Recording,
    /// Source attached, sampling paused.
    SourceReady,
    /// Source attached, sampling running.
    Scanning,
}

impl UiLifecycle {
    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Recording => "Recording",
            Self::SourceReady => "Ready",
            Self::Scanning => "Scanning",
        }
    }
}

/// Aggregate view state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerView {
    /// App version string sourced from root `VERSION`.
    pub version: String,
    /// Current lifecycle phase.
    pub lifecycle: UiLifecycle,
    /// Kind of the attached source.
    pub source: Option<SourceKind>,
    /// Last significant event.
    pub status: String,
    /// Last user-visible failure, cleared by the next acquisition.
    pub error_message: Option<String>,
    /// Cells holding a snapshot.
    pub revealed: usize,
    /// Active sensitivity threshold.
    pub threshold: u8,
}

impl ScannerView {
    /// Creates the initial view.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            lifecycle: UiLifecycle::Idle,
            source: None,
            status: STATUS_WAITING.to_string(),
            error_message: None,
            revealed: 0,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Returns `true` when the scan control would act.
    pub fn can_toggle_scan(&self) -> bool {
        self.source.is_some()
            && matches!(
                self.lifecycle,
                UiLifecycle::SourceReady | UiLifecycle::Scanning
            )
    }

    /// Returns `true` when share and record controls would act.
    pub fn can_start_source(&self) -> bool {
        self.lifecycle != UiLifecycle::Recording
    }

    /// Returns `true` when the attached source is a live share.
    pub fn is_live(&self) -> bool {
        self.source == Some(SourceKind::LiveShare)
    }

    /// Returns `true` while sampling runs.
    pub fn is_scanning(&self) -> bool {
        self.lifecycle == UiLifecycle::Scanning
    }

    /// Moves to `lifecycle` with `source` attached and a new status line.
    pub fn transition(
        &mut self,
        lifecycle: UiLifecycle,
        source: Option<SourceKind>,
        status: impl Into<String>,
    ) {
        self.lifecycle = lifecycle;
        self.source = source;
        self.status = status.into();
    }

    /// Clears the board counter and any error for a fresh source.
    pub fn begin_source(&mut self) {
        self.revealed = 0;
        self.error_message = None;
    }

    /// Records sampler progress.
    pub fn apply_progress(&mut self, revealed: usize) {
        self.revealed = revealed;
        self.status = format!("Found more cards! {}", self.revealed_label());
    }

    /// Records a failed share request; the lifecycle is left unchanged.
    pub fn report_error(&mut self, reason: &str) {
        self.report_failure(format!("Unable to share screen: {reason}"));
    }

    /// Shows `message` as both status and error.
    pub fn report_failure(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.status = message.clone();
        self.error_message = Some(message);
    }

    /// Returns the view to its initial state, keeping version and threshold.
    pub fn reset(&mut self) {
        self.lifecycle = UiLifecycle::Idle;
        self.source = None;
        self.status = STATUS_RESET.to_string();
        self.error_message = None;
        self.revealed = 0;
    }

    /// Revealed counter as `n / 24`.
    pub fn revealed_label(&self) -> String {
        format!("{} / {CELL_COUNT}", self.revealed)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for view gates.

    use super::*;

    #[test]
    fn toggle_gate_requires_attached_source() {
        let mut view = ScannerView::new("v0.1.0");
        assert!(!view.can_toggle_scan());
        assert!(view.can_start_source());

        view.transition(UiLifecycle::Recording, Some(SourceKind::Recording), STATUS_RECORDING);
        assert!(!view.can_toggle_scan());
        assert!(!view.can_start_source());

        view.transition(UiLifecycle::SourceReady, Some(SourceKind::Recording), STATUS_RECORDING_READY);
        assert!(view.can_toggle_scan());
        assert!(view.can_start_source());
    }

    #[test]
    fn error_is_kept_until_next_source() {
        let mut view = ScannerView::new("v0.1.0");
        view.report_error("Permission denied");
        assert_eq!(view.status, "Unable to share screen: Permission denied");
        assert_eq!(view.error_message.as_deref(), Some("Unable to share screen: Permission denied"));
        assert_eq!(view.lifecycle, UiLifecycle::Idle);

        view.begin_source();
        assert!(view.error_message.is_none());
    }

    #[test]
    fn progress_formats_revealed_counter() {
        let mut view = ScannerView::new("v0.1.0");
        view.apply_progress(7);
        assert_eq!(view.status, "Found more cards! 7 / 24");

        view.reset();
        assert_eq!(view.revealed, 0);
        assert_eq!(view.status, STATUS_RESET);
    }

    #[test]
    fn view_serializes_for_the_shell() {
        let mut view = ScannerView::new("v0.1.0");
        view.transition(UiLifecycle::Scanning, Some(SourceKind::LiveShare), STATUS_SHARE_CONNECTED);
        let json = serde_json::to_value(&view).expect("view serializes");
        assert_eq!(json["lifecycle"], "Scanning");
        assert_eq!(json["source"], "LiveShare");
        assert!(view.is_live());
    }
}
