// Optional live-view surface. The engine only needs two things from a
// preview: somewhere to hand the annotated display frame, and a per-call
// answer to "did the operator ask to stop?". Windowed implementations
// (OpenCV highgui and friends) belong to an integration harness; in-tree we
// ship a headless snapshot preview and a null sink.

use crate::core_modules::frame::RgbFrame;
use image::{ExtendedColorType, ImageEncoder, codecs::png::PngEncoder};
use std::path::PathBuf;
use tracing::warn;

/// Receives annotated frames for display; returns true when a stop was
/// requested.
pub trait PreviewSink {
    fn display(&mut self, frame: &RgbFrame) -> bool;
}

/// Headless preview: keeps overwriting one PNG with the latest annotated
/// frame so an operator can watch the feed with any file viewer.
pub struct SnapshotPreview {
    path: PathBuf,
}

impl SnapshotPreview {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn write(&self, frame: &RgbFrame) -> Result<(), image::ImageError> {
        let output = std::fs::File::create(&self.path)?;
        let encoder = PngEncoder::new(output);
        encoder.write_image(
            &frame.pixels,
            frame.width,
            frame.height,
            ExtendedColorType::Rgb8,
        )?;
        Ok(())
    }
}

impl PreviewSink for SnapshotPreview {
    fn display(&mut self, frame: &RgbFrame) -> bool {
        if let Err(error) = self.write(frame) {
            // Preview is best-effort; never stop the stream over it.
            warn!(%error, "failed to write preview snapshot");
        }
        false
    }
}

/// Discards every frame and never requests a stop.
pub struct NullPreview;

impl PreviewSink for NullPreview {
    fn display(&mut self, _frame: &RgbFrame) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_preview_overwrites_the_same_file() {
        let path = std::env::temp_dir().join(format!("svn-preview-{}.png", std::process::id()));
        let mut preview = SnapshotPreview::new(&path);

        assert!(!preview.display(&RgbFrame::filled(8, 8, 10)));
        assert!(!preview.display(&RgbFrame::filled(8, 8, 250)));

        let latest = image::open(&path).unwrap().into_rgb8();
        assert_eq!(latest.get_pixel(0, 0).0, [250, 250, 250]);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn null_preview_never_stops() {
        let mut preview = NullPreview;
        assert!(!preview.display(&RgbFrame::filled(2, 2, 0)));
    }
}
