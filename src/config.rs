// Startup configuration: one JSON file, loaded once before the first frame
// and immutable afterwards. Any load, parse or validation failure is fatal;
// the process must not start capturing with a half-valid configuration.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Validation(String),
}

/// All recognized options. Camera geometry and rates up top, pipeline tuning
/// in the middle, optional surfaces (preview, remote upload) at the bottom.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Requested capture resolution as (width, height).
    pub resolution: (u32, u32),
    /// Capture rate in frames per second.
    pub fps: u32,
    /// Seconds to let the camera settle before the first frame.
    pub camera_warmup_seconds: f64,
    /// Binarization threshold for the background delta (0-255).
    pub delta_threshold: u8,
    /// Inclusive pixel-count floor for motion regions.
    pub min_contour_area: usize,
    /// Cooldown between uploads, in seconds.
    pub min_upload_interval_seconds: i64,
    /// Consecutive motion frames required before an upload fires.
    pub min_consecutive_motion_frames: u32,
    /// Enable the preview sink.
    #[serde(default)]
    pub show_preview: bool,
    /// Enable the remote evidence publisher.
    #[serde(default)]
    pub use_remote_upload: bool,
    /// Bearer token for the remote upload transport.
    #[serde(default)]
    pub remote_access_token: String,
    /// URL base the evidence destination path is built under.
    #[serde(default)]
    pub remote_base_path: String,
}

impl MonitorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: MonitorConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution.0 == 0 || self.resolution.1 == 0 {
            return Err(ConfigError::Validation(
                "resolution must be non-zero in both dimensions".into(),
            ));
        }
        if self.fps == 0 {
            return Err(ConfigError::Validation("fps must be at least 1".into()));
        }
        if self.min_upload_interval_seconds < 0 {
            return Err(ConfigError::Validation(
                "min_upload_interval_seconds must not be negative".into(),
            ));
        }
        if self.camera_warmup_seconds < 0.0 {
            return Err(ConfigError::Validation(
                "camera_warmup_seconds must not be negative".into(),
            ));
        }
        if self.use_remote_upload {
            if self.remote_access_token.is_empty() {
                return Err(ConfigError::Validation(
                    "remote_access_token is required when use_remote_upload is set".into(),
                ));
            }
            if self.remote_base_path.is_empty() {
                return Err(ConfigError::Validation(
                    "remote_base_path is required when use_remote_upload is set".into(),
                ));
            }
        }
        Ok(())
    }
}
