// THEORY:
// The `BackgroundModel` is the temporal memory of the engine: an
// exponentially weighted running average of scene intensity, one f64 per
// analysis pixel. Transient motion perturbs the current frame away from this
// slowly adapting average; the per-pixel magnitude of that perturbation is
// the delta signal every later stage reasons about.
//
// Key architectural principles:
// 1.  **Seed once, never reset**: the first observed frame becomes the model
//     verbatim and the model then persists for the process lifetime. There is
//     no adaptive re-seeding; a deliberate simplification that keeps the
//     state machine downstream easy to reason about.
// 2.  **Cold-start contract**: the seeding frame produces no delta (`None`),
//     and the caller must skip motion analysis for it. A zero grid would be
//     indistinguishable from a genuinely still scene, so the absence of a
//     verdict is made explicit in the type.
// 3.  **Update before differencing**: the model absorbs the new frame first,
//     then the delta is taken against the updated (rounded) model. The
//     smoothing factor is fixed at 0.5, so a constant scene halves its
//     distance to the model every frame.

use crate::core_modules::frame::GrayFrame;

/// Fixed exponential smoothing factor for the running average.
const SMOOTHING_FACTOR: f64 = 0.5;

/// Exponentially weighted running average of per-pixel scene intensity.
pub struct BackgroundModel {
    accumulator: Option<Vec<f64>>,
    width: u32,
    height: u32,
}

impl BackgroundModel {
    pub fn new() -> Self {
        Self {
            accumulator: None,
            width: 0,
            height: 0,
        }
    }

    /// Whether the model has absorbed its seeding frame yet.
    pub fn is_seeded(&self) -> bool {
        self.accumulator.is_some()
    }

    /// Read-only view of the model grid, for inspection and tests.
    pub fn model(&self) -> Option<&[f64]> {
        self.accumulator.as_deref()
    }

    /// Feeds one analysis frame into the model.
    ///
    /// Returns `None` for the seeding frame (no delta exists yet); afterwards
    /// returns the per-pixel `|frame - round(model)|` magnitude grid.
    ///
    /// Precondition: every call uses the same dimensions as the seeding call.
    /// The analyzer upstream guarantees this; a mismatch is a wiring bug and
    /// fails fast.
    pub fn observe(&mut self, frame: &GrayFrame) -> Option<GrayFrame> {
        let Some(model) = self.accumulator.as_mut() else {
            self.accumulator = Some(frame.pixels.iter().map(|&p| p as f64).collect());
            self.width = frame.width;
            self.height = frame.height;
            return None;
        };

        assert_eq!(
            (frame.width, frame.height),
            (self.width, self.height),
            "frame dimensions changed after the background model was seeded",
        );

        let mut delta = Vec::with_capacity(model.len());
        for (value, pixel) in model.iter_mut().zip(frame.pixels.iter()) {
            *value = (1.0 - SMOOTHING_FACTOR) * *value + SMOOTHING_FACTOR * *pixel as f64;
            let magnitude = (*pixel as f64 - value.round()).abs();
            delta.push(magnitude.clamp(0.0, 255.0) as u8);
        }

        Some(GrayFrame::new(frame.width, frame.height, delta))
    }
}

impl Default for BackgroundModel {
    fn default() -> Self {
        Self::new()
    }
}
