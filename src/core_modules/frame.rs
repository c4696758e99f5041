// THEORY:
// The `frame` module holds the "dumb" data containers the rest of the engine
// operates on. A frame is immutable once captured; every derived view
// (resized, grayscale, delta) is a new value produced by a later stage, never
// a mutated alias of the original buffer.
//
// Key architectural principles:
// 1.  **Dumb containers**: `RgbFrame` and `GrayFrame` hold dimensions and a
//     flat pixel buffer and know nothing about analysis. All comparison and
//     decision logic lives in higher modules (`BackgroundModel`,
//     `OccupancyClassifier`).
// 2.  **Fail-fast preconditions**: a buffer whose length disagrees with its
//     declared dimensions indicates misconfiguration upstream, not a
//     recoverable condition. Constructors panic instead of returning errors.
// 3.  **Capture timestamping**: `CapturedFrame` pairs the color image with the
//     wall-clock instant it left the source. That timestamp is the `now` the
//     upload gate clocks its cooldown against.

use chrono::{DateTime, Utc};

/// Wall-clock instant a frame was captured.
pub type Timestamp = DateTime<Utc>;

const RGB_CHANNELS: usize = 3;

/// A "dumb" container for an interleaved 8-bit RGB image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbFrame {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Row-major interleaved RGB bytes, `width * height * 3` long.
    pub pixels: Vec<u8>,
}

impl RgbFrame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        assert_eq!(
            pixels.len(),
            (width * height) as usize * RGB_CHANNELS,
            "RGB buffer length does not match {width}x{height}",
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// A frame of the given dimensions with every channel set to `value`.
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self::new(
            width,
            height,
            vec![value; (width * height) as usize * RGB_CHANNELS],
        )
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let i = ((y * self.width + x) as usize) * RGB_CHANNELS;
        (self.pixels[i], self.pixels[i + 1], self.pixels[i + 2])
    }

    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: (u8, u8, u8)) {
        let i = ((y * self.width + x) as usize) * RGB_CHANNELS;
        self.pixels[i] = rgb.0;
        self.pixels[i + 1] = rgb.1;
        self.pixels[i + 2] = rgb.2;
    }
}

/// A "dumb" container for a single-channel 8-bit intensity grid.
///
/// Used both for preprocessed analysis frames and for the per-pixel delta
/// magnitude grid the background model emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayFrame {
    /// Grid width in pixels.
    pub width: u32,
    /// Grid height in pixels.
    pub height: u32,
    /// Row-major intensity bytes, `width * height` long.
    pub pixels: Vec<u8>,
}

impl GrayFrame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        assert_eq!(
            pixels.len(),
            (width * height) as usize,
            "gray buffer length does not match {width}x{height}",
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self::new(width, height, vec![value; (width * height) as usize])
    }

    #[inline]
    pub fn at(&self, x: u32, y: u32) -> u8 {
        self.pixels[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        self.pixels[(y * self.width + x) as usize] = value;
    }
}

/// A raw color frame tagged with the instant it left the frame source.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub image: RgbFrame,
    pub timestamp: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_pixel_round_trip() {
        let mut frame = RgbFrame::filled(4, 3, 0);
        frame.set_pixel(2, 1, (10, 20, 30));
        assert_eq!(frame.pixel(2, 1), (10, 20, 30));
        assert_eq!(frame.pixel(0, 0), (0, 0, 0));
    }

    #[test]
    #[should_panic]
    fn mismatched_buffer_length_panics() {
        let _ = GrayFrame::new(10, 10, vec![0u8; 99]);
    }
}
