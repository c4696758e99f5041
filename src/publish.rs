// THEORY:
// Publishing evidence is the only stage that touches the outside world, and
// it is fenced off behind a small trait so the decision pipeline never
// learns about transports. The contract for an implementation:
//
//   encode the frame → write it to a transient location → upload → release
//   the transient resource on every exit path, success or failure.
//
// The transient file is a scoped RAII guard; dropping it removes the file,
// so an encoding error, an IO error and a transport error all clean up the
// same way. Upload failures come back as `Err` to be logged by the caller —
// the frame stream continues regardless, and the gate state has already
// advanced, so a failed upload still consumes the debounce window
// (at-most-once-attempt; there is no retry queue).
//
// `RemotePublisher` drives its async HTTP client to completion on a private
// current-thread runtime, which keeps the publish call blocking: temp
// cleanup happens strictly after the upload returns or fails.

use crate::core_modules::frame::{RgbFrame, Timestamp};
use image::{ExtendedColorType, ImageEncoder, codecs::jpeg::JpegEncoder};
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Timestamp rendering used in the upload destination name.
const DESTINATION_TIME_FORMAT: &str = "%A %d %B %Y %I:%M:%S%p";

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("evidence encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("evidence io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("upload transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("remote rejected upload with status {0}")]
    Rejected(u16),
}

/// Hands one evidence frame to persistent storage.
pub trait EvidencePublisher {
    fn publish(&self, frame: &RgbFrame, timestamp: Timestamp) -> Result<(), PublishError>;
}

/// Scoped temp file: removed when the guard goes out of scope, whichever way
/// the publish attempt ended.
struct TempEvidence {
    path: PathBuf,
}

impl TempEvidence {
    fn create() -> std::io::Result<Self> {
        let name = format!(
            "evidence-{}-{}.jpg",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default(),
        );
        let path = std::env::temp_dir().join(name);
        // Touch the file now so a later failure has something to clean up.
        File::create(&path)?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempEvidence {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Uploads JPEG evidence over HTTP with a bearer token.
pub struct RemotePublisher {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    access_token: String,
    base_path: String,
}

impl RemotePublisher {
    pub fn new(access_token: String, base_path: String) -> Result<Self, PublishError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            client: reqwest::Client::new(),
            runtime,
            access_token,
            base_path: base_path.trim_end_matches('/').to_string(),
        })
    }

    fn destination(&self, timestamp: Timestamp) -> String {
        format!(
            "{}/{}.jpg",
            self.base_path,
            timestamp.format(DESTINATION_TIME_FORMAT),
        )
    }
}

impl EvidencePublisher for RemotePublisher {
    fn publish(&self, frame: &RgbFrame, timestamp: Timestamp) -> Result<(), PublishError> {
        let temp = TempEvidence::create()?;
        encode_jpeg(frame, temp.path())?;
        let bytes = std::fs::read(temp.path())?;

        let url = self.destination(timestamp);
        let response = self.runtime.block_on(
            self.client
                .put(&url)
                .bearer_auth(&self.access_token)
                .header(reqwest::header::CONTENT_TYPE, "image/jpeg")
                .body(bytes)
                .send(),
        )?;

        if !response.status().is_success() {
            return Err(PublishError::Rejected(response.status().as_u16()));
        }
        Ok(())
        // `temp` drops here (and on every early return above), removing the
        // transient file after the upload has returned or failed.
    }
}

fn encode_jpeg(frame: &RgbFrame, path: &Path) -> Result<(), PublishError> {
    let output = File::create(path)?;
    let encoder = JpegEncoder::new(output);
    encoder.write_image(
        &frame.pixels,
        frame.width,
        frame.height,
        ExtendedColorType::Rgb8,
    )?;
    Ok(())
}
