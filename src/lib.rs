// THEORY:
// This file is the main entry point for the `sentry_vision` library crate.
// It exposes the `MotionPipeline` and its data structures as the high-level
// interface of the engine, together with the three collaborator seams a
// deployment has to plug hardware into: `FrameSource` (acquisition),
// `EvidencePublisher` (persistent/cloud storage) and `PreviewSink`
// (operator display). The analysis internals live in `core_modules` and stay
// behind the pipeline API.

pub mod capture;
pub mod config;
pub mod core_modules;
pub mod pipeline;
pub mod preview;
pub mod publish;

pub use capture::{CaptureError, FrameSource, ImageSequenceSource};
pub use config::{ConfigError, MonitorConfig};
pub use pipeline::{
    CapturedFrame, FrameOutcome, FrameReport, GateState, MotionPipeline, MotionRegion,
    OccupancyVerdict, PipelineConfig, RgbFrame, Timestamp, UploadDecision,
};
pub use preview::{NullPreview, PreviewSink, SnapshotPreview};
pub use publish::{EvidencePublisher, PublishError, RemotePublisher};
