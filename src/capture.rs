// THEORY:
// Frame acquisition is deliberately pull-based: the pipeline asks for the
// next frame only after it has finished processing the current one, so
// ordering and backpressure fall out of the call shape instead of needing a
// queue. `next_frame` may block while the device waits for readiness;
// `reset` discards anything the source buffered between iterations so the
// following pull starts clean.
//
// Hardware drivers live behind this trait and out of the engine. The in-tree
// implementation plays a sorted directory of still images, which is enough
// to run the whole pipeline end to end anywhere; a camera integration is
// just another `FrameSource`.

use crate::core_modules::frame::{CapturedFrame, RgbFrame};
use chrono::Utc;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// Device-level failure (disconnect, read timeout). Fatal to the loop.
    #[error("capture device error: {0}")]
    Device(String),
    #[error("capture io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame decode error: {0}")]
    Decode(#[from] image::ImageError),
    /// The source has no further frames. Ends the loop cleanly.
    #[error("end of frame stream")]
    EndOfStream,
}

/// Blocking, pull-based frame acquisition.
pub trait FrameSource {
    /// Blocks until the next frame is available.
    fn next_frame(&mut self) -> Result<CapturedFrame, CaptureError>;

    /// Discards any buffered frame so the next pull starts fresh.
    fn reset(&mut self);
}

/// Plays the images of a directory, in name order, as a frame stream.
pub struct ImageSequenceSource {
    files: Vec<PathBuf>,
    cursor: usize,
    buffered: Option<CapturedFrame>,
}

impl ImageSequenceSource {
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(CaptureError::Device(
                "frame directory contains no files".into(),
            ));
        }

        Ok(Self {
            files,
            cursor: 0,
            buffered: None,
        })
    }

    pub fn remaining(&self) -> usize {
        self.files.len() - self.cursor
    }
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Result<CapturedFrame, CaptureError> {
        if let Some(frame) = self.buffered.take() {
            return Ok(frame);
        }

        if self.cursor >= self.files.len() {
            return Err(CaptureError::EndOfStream);
        }
        let path = self.files[self.cursor].clone();
        self.cursor += 1;

        let decoded = image::open(&path)?.into_rgb8();
        let (width, height) = decoded.dimensions();
        Ok(CapturedFrame {
            image: RgbFrame::new(width, height, decoded.into_raw()),
            timestamp: Utc::now(),
        })
    }

    fn reset(&mut self) {
        self.buffered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_directory_is_a_device_error() {
        let dir = std::env::temp_dir().join(format!("svn-capture-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let result = ImageSequenceSource::from_dir(&dir);
        assert!(matches!(result, Err(CaptureError::Device(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn plays_frames_in_name_order_then_ends() {
        let dir = std::env::temp_dir().join(format!("svn-capture-seq-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for (name, shade) in [("b.png", 200u8), ("a.png", 10u8)] {
            let img = image::RgbImage::from_pixel(4, 4, image::Rgb([shade, shade, shade]));
            img.save(dir.join(name)).unwrap();
        }

        let mut source = ImageSequenceSource::from_dir(&dir).unwrap();
        assert_eq!(source.remaining(), 2);

        let first = source.next_frame().unwrap();
        assert_eq!(first.image.pixel(0, 0), (10, 10, 10)); // a.png sorts first
        let second = source.next_frame().unwrap();
        assert_eq!(second.image.pixel(0, 0), (200, 200, 200));
        assert!(matches!(
            source.next_frame(),
            Err(CaptureError::EndOfStream)
        ));

        std::fs::remove_dir_all(&dir).ok();
    }
}
