//! Playable sources built from uploaded frame sequences and finished
//! recordings.

use memory_solver_core::Frame;

use crate::{CaptureError, SourceKind, VideoSource};

/// Frame presented from `offset_ms` after playback starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedFrame {
    /// Presentation offset from the start of playback.
    pub offset_ms: u64,
    /// Decoded frame.
    pub frame: Frame,
}

/// Handle to an uploaded video, already decoded into presentation-ordered
/// frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadHandle {
    name: String,
    frames: Vec<TimedFrame>,
    duration_ms: u64,
}

impl UploadHandle {
    /// Wraps frames played back at a constant `fps`.
    ///
    /// # Errors
    /// Returns [`CaptureError::EmptySource`] for an empty sequence and
    /// [`CaptureError::InvalidFps`] when `fps == 0`.
    pub fn from_frames(
        name: impl Into<String>,
        frames: Vec<Frame>,
        fps: u32,
    ) -> Result<Self, CaptureError> {
        if fps == 0 {
            return Err(CaptureError::InvalidFps);
        }
        let interval_ms = (1_000 / fps as u64).max(1);
        let timed = frames
            .into_iter()
            .enumerate()
            .map(|(index, frame)| TimedFrame {
                offset_ms: index as u64 * interval_ms,
                frame,
            })
            .collect::<Vec<_>>();
        let duration_ms = timed.len() as u64 * interval_ms;
        Self::from_timed(name, timed, duration_ms)
    }

    /// Wraps frames carrying explicit presentation offsets.
    ///
    /// Frames are sorted by offset; `duration_ms` is raised to cover the last
    /// frame when shorter.
    ///
    /// # Errors
    /// Returns [`CaptureError::EmptySource`] for an empty sequence.
    pub fn from_timed(
        name: impl Into<String>,
        mut frames: Vec<TimedFrame>,
        duration_ms: u64,
    ) -> Result<Self, CaptureError> {
        if frames.is_empty() {
            return Err(CaptureError::EmptySource);
        }
        frames.sort_by_key(|timed| timed.offset_ms);
        let last_offset = frames.last().map_or(0, |timed| timed.offset_ms);

        Ok(Self {
            name: name.into(),
            frames,
            duration_ms: duration_ms.max(last_offset + 1),
        })
    }

    /// Display name of the upload.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Total playback duration.
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}

/// Source that plays a fixed frame sequence against the scanner clock.
///
/// The playback clock starts on the first `advance` call. Playback
/// sources hold no capture tracks.
#[derive(Debug)]
pub struct PlaybackSource {
    kind: SourceKind,
    frames: Vec<TimedFrame>,
    duration_ms: u64,
    started_at_ms: Option<u64>,
    position_ms: u64,
    released: bool,
}

impl PlaybackSource {
    /// Plays an uploaded video.
    pub fn from_upload(handle: UploadHandle) -> Self {
        Self::with_kind(SourceKind::Upload, handle)
    }

    /// Plays a finished recording.
    pub fn from_recording(handle: UploadHandle) -> Self {
        Self::with_kind(SourceKind::Recording, handle)
    }

    fn with_kind(kind: SourceKind, handle: UploadHandle) -> Self {
        Self {
            kind,
            frames: handle.frames,
            duration_ms: handle.duration_ms,
            started_at_ms: None,
            position_ms: 0,
            released: false,
        }
    }

    /// Number of frames still held by the source.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Playback position at the last query.
    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    fn frame_index_at(&self, position_ms: u64) -> Option<usize> {
        // Last frame whose offset is not after the position.
        let upper = self
            .frames
            .partition_point(|timed| timed.offset_ms <= position_ms);
        upper.checked_sub(1)
    }
}

impl VideoSource for PlaybackSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn dimensions(&self) -> (u32, u32) {
        if self.released {
            return (0, 0);
        }
        let index = self.frame_index_at(self.position_ms).unwrap_or(0);
        self.frames
            .get(index)
            .map_or((0, 0), |timed| (timed.frame.width, timed.frame.height))
    }

    fn advance(&mut self, now_ms: u64) {
        if self.released {
            return;
        }
        let started_at = *self.started_at_ms.get_or_insert(now_ms);
        self.position_ms = now_ms.saturating_sub(started_at);
    }

    fn frame(&self) -> Option<&Frame> {
        if self.has_ended() {
            return None;
        }
        let index = self.frame_index_at(self.position_ms)?;
        self.frames.get(index).map(|timed| &timed.frame)
    }

    fn has_ended(&self) -> bool {
        self.released || (self.started_at_ms.is_some() && self.position_ms >= self.duration_ms)
    }

    fn live_tracks(&self) -> usize {
        0
    }

    fn stop(&mut self) {
        self.released = true;
        self.frames = Vec::new();
    }
}
