// THEORY:
// The `pipeline` module is the top-level API for the motion engine. It owns
// every piece of per-stream state — the preprocessing analyzer, the
// background model and the upload gate — as one explicit context object, so
// several independent streams (or tests) can coexist in one process without
// any ambient globals.
//
// Per frame, the stages run in a fixed order:
//   1. Preprocess the raw capture into the analysis grid (resize, grayscale,
//      blur) and keep the resized color frame for annotation and evidence.
//   2. Feed the grid to the background model; the seeding frame ends the
//      pipeline early with no report.
//   3. Classify the delta grid into a verdict plus motion regions.
//   4. Run the verdict and the capture timestamp through the upload gate.
//
// The pipeline decides; it never publishes. Uploading (and surviving upload
// failures) is the caller's concern, which is what keeps the gate state
// progression independent of transport outcomes.

use crate::core_modules::analyzer::FrameAnalyzer;
use crate::core_modules::background::BackgroundModel;
use crate::core_modules::classifier::OccupancyClassifier;
use crate::core_modules::gate::UploadGate;
use tracing::debug;

// Re-export the key data structures for the public API.
pub use crate::core_modules::classifier::{MotionRegion, OccupancyVerdict};
pub use crate::core_modules::frame::{CapturedFrame, RgbFrame, Timestamp};
pub use crate::core_modules::gate::{GateState, UploadDecision};

/// Tunable behavior of one pipeline instance, fixed at construction.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Binarization threshold for the background delta (0-255).
    pub delta_threshold: u8,
    /// Inclusive pixel-count floor a motion component must reach.
    pub min_contour_area: usize,
    /// Cooldown between uploads, in seconds.
    pub min_upload_interval_seconds: i64,
    /// Consecutive Occupied frames required before an upload fires.
    pub min_consecutive_motion_frames: u32,
}

/// Everything the pipeline concluded about one analyzed frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub verdict: OccupancyVerdict,
    pub regions: Vec<MotionRegion>,
    pub decision: UploadDecision,
}

/// Per-frame output: the resized display frame (annotation, preview and
/// evidence all work on this) and the report, absent while the background
/// model is still seeding.
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    pub display: RgbFrame,
    pub report: Option<FrameReport>,
}

/// The per-stream context object owning all mutable pipeline state.
pub struct MotionPipeline {
    analyzer: FrameAnalyzer,
    background: BackgroundModel,
    classifier: OccupancyClassifier,
    gate: UploadGate,
}

impl MotionPipeline {
    /// `started_at` seeds the gate's cooldown clock (normally the process
    /// start instant).
    pub fn new(config: &PipelineConfig, started_at: Timestamp) -> Self {
        Self {
            analyzer: FrameAnalyzer::standard(),
            background: BackgroundModel::new(),
            classifier: OccupancyClassifier::new(config.delta_threshold, config.min_contour_area),
            gate: UploadGate::new(
                config.min_upload_interval_seconds,
                config.min_consecutive_motion_frames,
                started_at,
            ),
        }
    }

    /// Runs one captured frame through preprocess → model → classify → gate.
    pub fn process(&mut self, captured: &CapturedFrame) -> FrameOutcome {
        let display = self.analyzer.resize(&captured.image);
        let gray = self.analyzer.prepare_resized(&display);

        let Some(delta) = self.background.observe(&gray) else {
            debug!("background model seeded; skipping motion analysis for this frame");
            return FrameOutcome {
                display,
                report: None,
            };
        };

        let (verdict, regions) = self.classifier.classify(&delta);
        let decision = self.gate.evaluate(verdict, captured.timestamp);

        FrameOutcome {
            display,
            report: Some(FrameReport {
                verdict,
                regions,
                decision,
            }),
        }
    }

    /// Current gate state, for inspection and tests.
    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::analyzer::{ANALYSIS_HEIGHT, ANALYSIS_WIDTH};
    use crate::publish::{EvidencePublisher, PublishError};
    use chrono::{Duration, TimeZone, Utc};

    fn epoch() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            delta_threshold: 25,
            min_contour_area: 500,
            min_upload_interval_seconds: 0,
            min_consecutive_motion_frames: 1,
        }
    }

    /// A dark scene at analysis dimensions.
    fn still_frame(at_seconds: i64) -> CapturedFrame {
        CapturedFrame {
            image: RgbFrame::filled(ANALYSIS_WIDTH, ANALYSIS_HEIGHT, 0),
            timestamp: epoch() + Duration::seconds(at_seconds),
        }
    }

    /// The dark scene with a large bright block dropped into the middle.
    fn motion_frame(at_seconds: i64) -> CapturedFrame {
        let mut image = RgbFrame::filled(ANALYSIS_WIDTH, ANALYSIS_HEIGHT, 0);
        for y in 100..200 {
            for x in 200..320 {
                image.set_pixel(x, y, (255, 255, 255));
            }
        }
        CapturedFrame {
            image,
            timestamp: epoch() + Duration::seconds(at_seconds),
        }
    }

    struct AcceptingPublisher;
    impl EvidencePublisher for AcceptingPublisher {
        fn publish(&self, _frame: &RgbFrame, _timestamp: Timestamp) -> Result<(), PublishError> {
            Ok(())
        }
    }

    struct RefusingPublisher;
    impl EvidencePublisher for RefusingPublisher {
        fn publish(&self, _frame: &RgbFrame, _timestamp: Timestamp) -> Result<(), PublishError> {
            Err(PublishError::Rejected(503))
        }
    }

    #[test]
    fn seeding_frame_produces_no_report() {
        let mut pipeline = MotionPipeline::new(&config(), epoch());
        let outcome = pipeline.process(&still_frame(1));
        assert!(outcome.report.is_none());
        assert_eq!(outcome.display.width, ANALYSIS_WIDTH);
        // The gate was not consulted: the streak is untouched.
        assert_eq!(pipeline.gate_state().consecutive_motion_frames, 0);
        assert_eq!(pipeline.gate_state().last_upload, epoch());
    }

    #[test]
    fn still_scene_reports_unoccupied() {
        let mut pipeline = MotionPipeline::new(&config(), epoch());
        pipeline.process(&still_frame(1));
        let report = pipeline.process(&still_frame(2)).report.unwrap();
        assert_eq!(report.verdict, OccupancyVerdict::Unoccupied);
        assert!(report.regions.is_empty());
        assert!(!report.decision.should_upload);
    }

    #[test]
    fn large_scene_change_fires_the_gate() {
        let mut pipeline = MotionPipeline::new(&config(), epoch());
        pipeline.process(&still_frame(1));
        let report = pipeline.process(&motion_frame(2)).report.unwrap();
        assert_eq!(report.verdict, OccupancyVerdict::Occupied);
        assert!(!report.regions.is_empty());
        assert!(report.decision.should_upload);
        assert_eq!(pipeline.gate_state().last_upload, epoch() + Duration::seconds(2));
    }

    #[test]
    fn gate_progression_is_independent_of_publish_outcome() {
        // The gate advances when the decision fires; whether the publisher
        // then succeeds or fails must not change the state it advanced to.
        let run = |publisher: &dyn EvidencePublisher| -> GateState {
            let mut pipeline = MotionPipeline::new(&config(), epoch());
            pipeline.process(&still_frame(1));
            let outcome = pipeline.process(&motion_frame(2));
            let report = outcome.report.unwrap();
            assert!(report.decision.should_upload);
            let _ = publisher.publish(&outcome.display, epoch() + Duration::seconds(2));
            pipeline.gate_state()
        };

        let after_success = run(&AcceptingPublisher);
        let after_failure = run(&RefusingPublisher);
        assert_eq!(after_success, after_failure);
        assert_eq!(after_failure.consecutive_motion_frames, 0);
        assert_eq!(after_failure.last_upload, epoch() + Duration::seconds(2));
    }
}
