//! In-memory screen recording: encoded chunks buffered during capture and
//! finalized into a replayable blob.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};
use memory_solver_core::Frame;

use crate::{CaptureError, TimedFrame, UploadHandle};

/// One encoded frame of a recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedChunk {
    /// Offset from the start of the recording.
    pub offset_ms: u64,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// JPEG bytes.
    pub jpeg: Vec<u8>,
}

/// Buffers JPEG-encoded chunks of a capture stream at a fixed cadence.
#[derive(Debug)]
pub struct Recorder {
    interval_ms: u64,
    quality: u8,
    started_at_ms: Option<u64>,
    next_due_ms: u64,
    chunks: Vec<EncodedChunk>,
}

impl Recorder {
    /// Creates a recorder that keeps one chunk per `1000 / fps` milliseconds.
    ///
    /// # Errors
    /// Returns [`CaptureError::InvalidFps`] when `fps == 0`.
    pub fn new(fps: u32, quality: u8) -> Result<Self, CaptureError> {
        if fps == 0 {
            return Err(CaptureError::InvalidFps);
        }
        Ok(Self {
            interval_ms: (1_000 / fps as u64).max(1),
            quality: quality.clamp(1, 100),
            started_at_ms: None,
            next_due_ms: 0,
            chunks: Vec::new(),
        })
    }

    /// Offers the stream's current frame; encodes it when a chunk is due.
    ///
    /// # Returns
    /// `Ok(true)` when a chunk was appended.
    ///
    /// # Errors
    /// Returns [`CaptureError::Codec`] when JPEG encoding fails.
    pub fn offer(&mut self, frame: &Frame, now_ms: u64) -> Result<bool, CaptureError> {
        if frame.is_empty() {
            return Ok(false);
        }
        let started_at = *self.started_at_ms.get_or_insert(now_ms);
        let offset_ms = now_ms.saturating_sub(started_at);
        if !self.chunks.is_empty() && offset_ms < self.next_due_ms {
            return Ok(false);
        }

        let jpeg = encode_jpeg(frame, self.quality)?;
        self.chunks.push(EncodedChunk {
            offset_ms,
            width: frame.width,
            height: frame.height,
            jpeg,
        });
        self.next_due_ms = offset_ms + self.interval_ms;
        Ok(true)
    }

    /// Number of buffered chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Finalizes the buffered chunks into one recording.
    ///
    /// # Errors
    /// Returns [`CaptureError::EmptySource`] when nothing was recorded.
    pub fn finish(self) -> Result<RecordingBlob, CaptureError> {
        if self.chunks.is_empty() {
            return Err(CaptureError::EmptySource);
        }
        let last_offset = self.chunks.last().map_or(0, |chunk| chunk.offset_ms);

        Ok(RecordingBlob {
            duration_ms: last_offset + self.interval_ms,
            chunks: self.chunks,
        })
    }
}

/// Finished recording: ordered encoded chunks plus total duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingBlob {
    chunks: Vec<EncodedChunk>,
    duration_ms: u64,
}

impl RecordingBlob {
    /// Encoded chunks in capture order.
    pub fn chunks(&self) -> &[EncodedChunk] {
        &self.chunks
    }

    /// Total duration.
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Total encoded size in bytes.
    pub fn byte_len(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.jpeg.len()).sum()
    }

    /// Decodes every chunk into a playable upload-style handle.
    ///
    /// # Errors
    /// Returns [`CaptureError::Codec`] when a chunk fails to decode.
    pub fn into_upload(self, name: impl Into<String>) -> Result<UploadHandle, CaptureError> {
        let mut frames = Vec::with_capacity(self.chunks.len());
        for chunk in self.chunks {
            let decoded =
                image::load_from_memory_with_format(&chunk.jpeg, ImageFormat::Jpeg)?.to_rgba8();
            let (width, height) = decoded.dimensions();
            frames.push(TimedFrame {
                offset_ms: chunk.offset_ms,
                frame: Frame::new(width, height, chunk.offset_ms, decoded.into_raw())?,
            });
        }
        UploadHandle::from_timed(name, frames, self.duration_ms)
    }
}

fn encode_jpeg(frame: &Frame, quality: u8) -> Result<Vec<u8>, CaptureError> {
    let rgba = RgbaImage::from_raw(frame.width, frame.height, frame.rgba.clone())
        .ok_or_else(|| CaptureError::Backend("frame buffer does not match its size".to_string()))?;
    let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();

    let mut bytes = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut bytes, quality).encode_image(&rgb)?;
    Ok(bytes.into_inner())
}

#[cfg(test)]
mod tests {
    //! Unit tests for chunk cadence and replay decoding.

    use super::*;

    fn gray(value: u8) -> Frame {
        Frame::solid(16, 8, 0, [value, value, value]).expect("frame should build")
    }

    #[test]
    fn keeps_one_chunk_per_interval() {
        let mut recorder = Recorder::new(10, 90).expect("valid fps");
        assert!(recorder.offer(&gray(50), 1_000).expect("encode"));
        assert!(!recorder.offer(&gray(50), 1_050).expect("encode"));
        assert!(recorder.offer(&gray(50), 1_100).expect("encode"));
        assert_eq!(recorder.chunk_count(), 2);

        let blob = recorder.finish().expect("recording has chunks");
        assert_eq!(blob.duration_ms(), 200);
        assert!(blob.byte_len() > 0);
    }

    #[test]
    fn empty_recording_cannot_finish() {
        let recorder = Recorder::new(10, 90).expect("valid fps");
        assert!(matches!(recorder.finish(), Err(CaptureError::EmptySource)));
    }

    #[test]
    fn blob_decodes_into_playable_frames() {
        let mut recorder = Recorder::new(30, 95).expect("valid fps");
        recorder.offer(&gray(200), 0).expect("encode");

        let handle = recorder
            .finish()
            .expect("recording has chunks")
            .into_upload("recording")
            .expect("chunks decode");
        assert_eq!(handle.frame_count(), 1);

        let mut source = crate::PlaybackSource::from_recording(handle);
        let frame = crate::VideoSource::current_frame(&mut source, 0).expect("frame at start");
        assert_eq!((frame.width, frame.height), (16, 8));
        // Lossy coding keeps a flat gray close to its original value.
        assert!(frame.rgba[0].abs_diff(200) <= 3);
    }
}
