// THEORY:
// The `FrameAnalyzer` is the preprocessing front of the pipeline. It turns a
// raw color frame of arbitrary camera resolution into the small, smoothed
// intensity grid the background model consumes: resize to the fixed analysis
// dimensions, collapse to grayscale, then Gaussian-blur to knock down sensor
// noise before any differencing happens.
//
// Key architectural principles:
// 1.  **Fixed analysis geometry**: every downstream stage (background model,
//     classifier) assumes one consistent grid size. The analyzer is the single
//     place that establishes it, so a dimension mismatch later in the pipeline
//     is a hard precondition violation rather than something to handle.
// 2.  **Noise first, logic later**: the blur exists purely so that single-pixel
//     sensor flicker cannot masquerade as scene change. Semantic filtering
//     (area floors, debouncing) belongs to later stages.
// 3.  **Raw-buffer math**: all three steps are plain buffer walks with no
//     external imaging runtime, keeping the analysis core dependency-free.

use crate::core_modules::frame::{GrayFrame, RgbFrame};

/// Width of the grid every frame is analyzed at.
pub const ANALYSIS_WIDTH: u32 = 500;
/// Height of the grid every frame is analyzed at.
pub const ANALYSIS_HEIGHT: u32 = 300;

const BLUR_KERNEL_SIZE: usize = 21;

/// Rec. 601 luma weights.
const LUMA_RED: f32 = 0.299;
const LUMA_GREEN: f32 = 0.587;
const LUMA_BLUE: f32 = 0.114;

/// Stateless per-frame preprocessor: resize, grayscale, blur.
pub struct FrameAnalyzer {
    width: u32,
    height: u32,
    blur_kernel: Vec<f32>,
}

impl FrameAnalyzer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            blur_kernel: gaussian_kernel(BLUR_KERNEL_SIZE),
        }
    }

    /// Analyzer at the engine's standard 500x300 analysis geometry.
    pub fn standard() -> Self {
        Self::new(ANALYSIS_WIDTH, ANALYSIS_HEIGHT)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Full preprocessing chain: the returned grid is what the background
    /// model observes.
    pub fn prepare(&self, frame: &RgbFrame) -> GrayFrame {
        self.prepare_resized(&self.resize(frame))
    }

    /// Grayscale + blur for a frame already at analysis dimensions; lets the
    /// pipeline reuse the resize it needed for the display frame anyway.
    pub fn prepare_resized(&self, resized: &RgbFrame) -> GrayFrame {
        self.blur(&grayscale(resized))
    }

    /// Bilinear resize to the analysis dimensions. Also used by the pipeline
    /// to produce the display frame annotations are drawn on.
    pub fn resize(&self, frame: &RgbFrame) -> RgbFrame {
        if frame.width == self.width && frame.height == self.height {
            return frame.clone();
        }

        let mut out = Vec::with_capacity((self.width * self.height) as usize * 3);
        let x_scale = frame.width as f32 / self.width as f32;
        let y_scale = frame.height as f32 / self.height as f32;

        for y in 0..self.height {
            // Sample at the pixel center of the source grid.
            let src_y = ((y as f32 + 0.5) * y_scale - 0.5).max(0.0);
            let y0 = src_y.floor() as u32;
            let y1 = (y0 + 1).min(frame.height - 1);
            let fy = src_y - y0 as f32;

            for x in 0..self.width {
                let src_x = ((x as f32 + 0.5) * x_scale - 0.5).max(0.0);
                let x0 = src_x.floor() as u32;
                let x1 = (x0 + 1).min(frame.width - 1);
                let fx = src_x - x0 as f32;

                let p00 = frame.pixel(x0, y0);
                let p10 = frame.pixel(x1, y0);
                let p01 = frame.pixel(x0, y1);
                let p11 = frame.pixel(x1, y1);

                let lerp = |a: u8, b: u8, c: u8, d: u8| -> u8 {
                    let top = a as f32 * (1.0 - fx) + b as f32 * fx;
                    let bottom = c as f32 * (1.0 - fx) + d as f32 * fx;
                    (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8
                };

                out.push(lerp(p00.0, p10.0, p01.0, p11.0));
                out.push(lerp(p00.1, p10.1, p01.1, p11.1));
                out.push(lerp(p00.2, p10.2, p01.2, p11.2));
            }
        }

        RgbFrame::new(self.width, self.height, out)
    }

    /// Separable Gaussian blur, horizontal then vertical pass, edges clamped.
    fn blur(&self, gray: &GrayFrame) -> GrayFrame {
        let width = gray.width as i64;
        let height = gray.height as i64;
        let radius = (self.blur_kernel.len() / 2) as i64;

        let mut horizontal = vec![0f32; (width * height) as usize];
        for y in 0..height {
            for x in 0..width {
                let mut acc = 0f32;
                for (k, weight) in self.blur_kernel.iter().enumerate() {
                    let sx = (x + k as i64 - radius).clamp(0, width - 1);
                    acc += weight * gray.pixels[(y * width + sx) as usize] as f32;
                }
                horizontal[(y * width + x) as usize] = acc;
            }
        }

        let mut out = vec![0u8; (width * height) as usize];
        for y in 0..height {
            for x in 0..width {
                let mut acc = 0f32;
                for (k, weight) in self.blur_kernel.iter().enumerate() {
                    let sy = (y + k as i64 - radius).clamp(0, height - 1);
                    acc += weight * horizontal[(sy * width + x) as usize];
                }
                out[(y * width + x) as usize] = acc.round().clamp(0.0, 255.0) as u8;
            }
        }

        GrayFrame::new(gray.width, gray.height, out)
    }
}

/// Rec. 601 luma grayscale conversion.
pub fn grayscale(frame: &RgbFrame) -> GrayFrame {
    let mut out = Vec::with_capacity((frame.width * frame.height) as usize);
    for chunk in frame.pixels.chunks_exact(3) {
        let luma = LUMA_RED * chunk[0] as f32
            + LUMA_GREEN * chunk[1] as f32
            + LUMA_BLUE * chunk[2] as f32;
        out.push(luma.round().clamp(0.0, 255.0) as u8);
    }
    GrayFrame::new(frame.width, frame.height, out)
}

/// Normalized 1D Gaussian kernel with sigma derived from the kernel size the
/// same way OpenCV derives it: 0.3 * ((k - 1) * 0.5 - 1) + 0.8.
fn gaussian_kernel(size: usize) -> Vec<f32> {
    let sigma = 0.3 * ((size - 1) as f32 * 0.5 - 1.0) + 0.8;
    let center = (size / 2) as f32;
    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for weight in &mut kernel {
        *weight /= sum;
    }
    kernel
}
