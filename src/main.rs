use anyhow::Context;
use chrono::Utc;
use sentry_vision::capture::{CaptureError, FrameSource, ImageSequenceSource};
use sentry_vision::config::MonitorConfig;
use sentry_vision::core_modules::overlay;
use sentry_vision::pipeline::{MotionPipeline, PipelineConfig};
use sentry_vision::preview::{NullPreview, PreviewSink, SnapshotPreview};
use sentry_vision::publish::{EvidencePublisher, RemotePublisher};
use std::time::Duration;
use tracing::{error, info, warn};

const PREVIEW_SNAPSHOT_PATH: &str = "preview.png";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // --- 1. Argument Parsing & Configuration ---
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        println!("Usage: sentry_vision <frame_directory> [config_path]");
        return Ok(());
    }
    let frame_dir = &args[1];
    let config_path = args.get(2).map(String::as_str).unwrap_or("monitor.json");
    let config = MonitorConfig::load(config_path)
        .with_context(|| format!("loading configuration from {config_path}"))?;

    // --- 2. Collaborator Wiring ---
    let publisher: Option<RemotePublisher> = if config.use_remote_upload {
        let publisher = RemotePublisher::new(
            config.remote_access_token.clone(),
            config.remote_base_path.clone(),
        )?;
        info!("remote upload enabled");
        Some(publisher)
    } else {
        None
    };

    let mut preview: Box<dyn PreviewSink> = if config.show_preview {
        Box::new(SnapshotPreview::new(PREVIEW_SNAPSHOT_PATH))
    } else {
        Box::new(NullPreview)
    };

    // --- 3. Camera Warmup & Pipeline Construction ---
    info!(
        warmup_seconds = config.camera_warmup_seconds,
        "warming up..."
    );
    std::thread::sleep(Duration::from_secs_f64(config.camera_warmup_seconds));

    let mut source = ImageSequenceSource::from_dir(frame_dir)
        .with_context(|| format!("opening frame source at {frame_dir}"))?;
    let mut pipeline = MotionPipeline::new(
        &PipelineConfig {
            delta_threshold: config.delta_threshold,
            min_contour_area: config.min_contour_area,
            min_upload_interval_seconds: config.min_upload_interval_seconds,
            min_consecutive_motion_frames: config.min_consecutive_motion_frames,
        },
        Utc::now(),
    );
    let frame_interval = Duration::from_secs_f64(1.0 / config.fps as f64);

    // --- 4. Main Processing Loop ---
    loop {
        let captured = match source.next_frame() {
            Ok(frame) => frame,
            Err(CaptureError::EndOfStream) => {
                info!("frame stream ended");
                break;
            }
            Err(e) => {
                error!(error = %e, "fatal capture error, stopping");
                return Err(e.into());
            }
        };

        let outcome = pipeline.process(&captured);
        let Some(report) = outcome.report else {
            info!("starting background model...");
            source.reset();
            continue;
        };

        // --- 5. Annotation & Publication ---
        let mut display = outcome.display;
        overlay::annotate(&mut display, report.verdict, &report.regions);

        if report.decision.should_upload {
            info!(timestamp = %captured.timestamp, regions = report.regions.len(), "upload");
            if let Some(publisher) = &publisher {
                if let Err(e) = publisher.publish(&display, captured.timestamp) {
                    // Non-fatal: the gate already advanced, the stream goes on.
                    warn!(error = %e, "evidence upload failed");
                }
            }
        }

        // --- 6. Preview & Pacing ---
        if config.show_preview && preview.display(&display) {
            info!("stop requested from preview");
            break;
        }

        source.reset();
        std::thread::sleep(frame_interval);
    }

    Ok(())
}
