#![warn(missing_docs)]
//! # memory-solver-app
//!
//! ## Purpose
//! Orchestrates capture, sampling, evidence, and view state for
//! `memory-solver`.
//!
//! ## Responsibilities
//! - Run the capture lifecycle state machine ([`CaptureController`]).
//! - Own one [`Scanner`] aggregate per instance and drive it per display
//!   refresh.
//! - Read runtime configuration overrides from the environment.
//! - Install logging for the binary and project view state into flat status
//!   text.
//!
//! ## Data flow
//! Source request or upload -> controller session -> refresh scheduler tick ->
//! sampler pass over the current frame -> evidence store -> view status.
//!
//! ## Ownership and lifetimes
//! The [`Scanner`] owns the controller, sampler, evidence, and view outright;
//! a sampling pass borrows the current frame from the controller and the
//! store from the scanner for the duration of one call.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]. Acquisition failures keep
//! the prior lifecycle state and are mirrored into the view.

mod controller;
mod scanner;

pub use controller::{
    CaptureController, CaptureState, ControllerConfig, DEFAULT_AUTOSTART_DELAY_MS,
    DEFAULT_RECORDING_QUALITY, DEFAULT_REPLAY_FPS, LifecycleEvent,
};
pub use scanner::Scanner;

use std::path::{Path, PathBuf};
use std::sync::Once;

use memory_solver_capture::{CaptureError, RefreshConfig};
use memory_solver_core::{
    CoreError, Frame, GRID_COLS, GridCell, GridLayout, ScanConfig, Sensitivity,
};
use memory_solver_scan::EvidenceStore;
use memory_solver_ui::ScannerView;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("MEMORY_SOLVER_VERSION");

/// Sensitivity threshold override.
pub const ENV_THRESHOLD: &str = "MEMORY_SOLVER_THRESHOLD";
/// Refresh rate override.
pub const ENV_FPS: &str = "MEMORY_SOLVER_FPS";
/// Grid preset override (`canonical` or `overlay`).
pub const ENV_GRID_PRESET: &str = "MEMORY_SOLVER_GRID_PRESET";

static LOGGING: Once = Once::new();

/// Consolidated status snapshot for simple display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeStatus {
    /// Lifecycle phase label.
    pub lifecycle: String,
    /// Attached source kind, `None` when idle.
    pub source: Option<String>,
    /// Status line.
    pub status: String,
    /// Last error, if any.
    pub error: Option<String>,
    /// Revealed counter (`n / 24`).
    pub revealed: String,
    /// Active threshold.
    pub threshold: u8,
    /// Whether the scan control is enabled.
    pub scan_toggle_enabled: bool,
    /// Whether share and record controls are enabled.
    pub source_controls_enabled: bool,
    /// Whether a live share is attached.
    pub live: bool,
}

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Installs the global `tracing` subscriber once.
///
/// Reads `RUST_LOG`; falls back to `info`.
pub fn init_logging() {
    LOGGING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    });
}

/// Reads the sensitivity threshold override.
///
/// Semantics:
/// - Unset => default threshold.
/// - Integer in `[40, 150]` => that threshold.
/// - Anything else => default threshold, with a warning.
pub fn threshold_from_env() -> Sensitivity {
    let Ok(raw) = std::env::var(ENV_THRESHOLD) else {
        return Sensitivity::default();
    };
    match raw.trim().parse::<u32>().ok().map(Sensitivity::new) {
        Some(Ok(sensitivity)) => sensitivity,
        _ => {
            tracing::warn!(variable = ENV_THRESHOLD, value = %raw, "ignoring override");
            Sensitivity::default()
        }
    }
}

/// Reads the refresh rate override; invalid values fall back to the default.
pub fn refresh_from_env() -> RefreshConfig {
    let Ok(raw) = std::env::var(ENV_FPS) else {
        return RefreshConfig::default();
    };
    match raw.trim().parse::<u32>().ok().map(RefreshConfig::new) {
        Some(Ok(config)) => config,
        _ => {
            tracing::warn!(variable = ENV_FPS, value = %raw, "ignoring override");
            RefreshConfig::default()
        }
    }
}

/// Reads the grid preset override; unknown names fall back to canonical.
pub fn grid_layout_from_env() -> GridLayout {
    let Ok(raw) = std::env::var(ENV_GRID_PRESET) else {
        return GridLayout::canonical();
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "canonical" => GridLayout::canonical(),
        "overlay" => GridLayout::overlay(),
        _ => {
            tracing::warn!(variable = ENV_GRID_PRESET, value = %raw, "ignoring override");
            GridLayout::canonical()
        }
    }
}

/// Scan configuration with environment overrides applied.
pub fn scan_config_from_env() -> ScanConfig {
    ScanConfig {
        sensitivity: threshold_from_env(),
        layout: grid_layout_from_env(),
        ..ScanConfig::default()
    }
}

/// Controller configuration with environment overrides applied.
pub fn controller_config_from_env() -> ControllerConfig {
    ControllerConfig {
        refresh: refresh_from_env(),
        ..ControllerConfig::default()
    }
}

/// Startup summary of the active tuning, one line per concern.
///
/// # Errors
/// Returns [`AppError::Config`] when the scan configuration cannot be
/// serialized.
pub fn describe_config(scan: &ScanConfig, controller: &ControllerConfig) -> Result<String, AppError> {
    let scan_json = serde_json::to_string(scan)?;
    Ok(format!(
        "scan config: {scan_json}\nrefresh: {} fps, replay: {} fps, autostart delay: {} ms",
        controller.refresh.fps, controller.replay_fps, controller.autostart_delay_ms
    ))
}

/// Loads every PNG or JPEG image in `dir`, ordered by file name, as frames.
///
/// # Errors
/// Returns [`AppError::Io`] when the directory cannot be read,
/// [`AppError::Image`] when an image fails to decode, and
/// [`AppError::Capture`] with [`CaptureError::EmptySource`] when no image is
/// found.
pub fn load_frame_sequence(dir: &Path) -> Result<Vec<Frame>, AppError> {
    let mut paths = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<PathBuf>, _>>()?;
    paths.retain(|path| is_frame_image(path));
    paths.sort();

    if paths.is_empty() {
        return Err(AppError::Capture(CaptureError::EmptySource));
    }

    let mut frames = Vec::with_capacity(paths.len());
    for (index, path) in paths.iter().enumerate() {
        let image = image::open(path)?.to_rgba8();
        let (width, height) = image.dimensions();
        frames.push(Frame::new(width, height, index as u64, image.into_raw())?);
    }
    tracing::info!(dir = %dir.display(), frames = frames.len(), "frame sequence loaded");
    Ok(frames)
}

fn is_frame_image(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            matches!(
                extension.to_ascii_lowercase().as_str(),
                "png" | "jpg" | "jpeg"
            )
        })
}

/// Renders the board as three rows of eight cells: `#` revealed, `.` hidden.
pub fn render_revealed_map(evidence: &EvidenceStore) -> String {
    let mut out = String::new();
    for cell in GridCell::all() {
        out.push(if evidence.get(cell).is_revealed() { '#' } else { '.' });
        if cell.column() == GRID_COLS - 1 {
            out.push('\n');
        }
    }
    out
}

/// Projects view state into a flat status snapshot.
pub fn project_status(view: &ScannerView) -> RuntimeStatus {
    RuntimeStatus {
        lifecycle: view.lifecycle.label().to_string(),
        source: view.source.map(|kind| format!("{kind:?}")),
        status: view.status.clone(),
        error: view.error_message.clone(),
        revealed: view.revealed_label(),
        threshold: view.threshold,
        scan_toggle_enabled: view.can_toggle_scan(),
        source_controls_enabled: view.can_start_source(),
        live: view.is_live(),
    }
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// A recording is in progress; stop or reset it first.
    #[error("a recording is in progress")]
    RecordingInProgress,
    /// No recording is in progress.
    #[error("no recording in progress")]
    NotRecording,
    /// The platform refused or failed a capture request.
    #[error("{0}")]
    Acquisition(CaptureError),
    /// Capture subsystem error.
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),
    /// Input validation error.
    #[error("invalid input: {0}")]
    Core(#[from] CoreError),
    /// Frame sequence could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Frame image could not be decoded.
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
    /// Configuration could not be serialized.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}
