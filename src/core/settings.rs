use crate::shared::paths::ensure_dir;
use crate::types::{FrameFormat, Resolution};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Recorder configuration, persisted as camelCase JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderSettings {
    /// Max duration in seconds of one video shot.
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: u32,
    /// Number of frames captured per second.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Native size of one eye. Videos are captured at half of it.
    #[serde(default = "default_eye_width")]
    pub eye_width: u32,
    #[serde(default = "default_eye_height")]
    pub eye_height: u32,
    #[serde(default = "default_thumbnail_frame_index")]
    pub thumbnail_frame_index: u32,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    #[serde(default = "default_screenshot_size")]
    pub screenshot_width: u32,
    #[serde(default = "default_screenshot_size")]
    pub screenshot_height: u32,
    #[serde(default)]
    pub frame_format: FrameFormat,
    #[serde(default)]
    pub gallery_dir: Option<PathBuf>,
}

fn default_max_duration_secs() -> u32 {
    300
}

fn default_frame_rate() -> u32 {
    10
}

fn default_eye_width() -> u32 {
    1536
}

fn default_eye_height() -> u32 {
    1404
}

fn default_thumbnail_frame_index() -> u32 {
    15
}

fn default_jpeg_quality() -> u8 {
    60
}

fn default_screenshot_size() -> u32 {
    1024
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            max_duration_secs: default_max_duration_secs(),
            frame_rate: default_frame_rate(),
            eye_width: default_eye_width(),
            eye_height: default_eye_height(),
            thumbnail_frame_index: default_thumbnail_frame_index(),
            jpeg_quality: default_jpeg_quality(),
            screenshot_width: default_screenshot_size(),
            screenshot_height: default_screenshot_size(),
            frame_format: FrameFormat::default(),
            gallery_dir: None,
        }
    }
}

impl RecorderSettings {
    /// Resolution frames are captured and encoded at (half of one eye).
    pub fn capture_resolution(&self) -> Resolution {
        Resolution::new(self.eye_width, self.eye_height).halved()
    }

    /// Number of frames after which a recording stops on its own.
    pub fn max_frames(&self) -> u32 {
        self.max_duration_secs.saturating_mul(self.frame_rate)
    }

    pub fn screenshot_resolution(&self) -> Resolution {
        Resolution::new(self.screenshot_width, self.screenshot_height)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.frame_rate == 0 {
            return Err(SettingsError::Invalid("frameRate must be positive".to_string()));
        }
        if self.max_duration_secs == 0 {
            return Err(SettingsError::Invalid(
                "maxDurationSecs must be positive".to_string(),
            ));
        }
        if self.capture_resolution().is_empty() {
            return Err(SettingsError::Invalid(format!(
                "eye resolution {}x{} is too small to capture",
                self.eye_width, self.eye_height
            )));
        }
        if self.screenshot_resolution().is_empty() {
            return Err(SettingsError::Invalid(
                "screenshot resolution must be positive".to_string(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(SettingsError::Invalid(format!(
                "jpegQuality {} is outside 1..=100",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Load settings from disk, returning defaults if the file doesn't exist or is invalid.
pub fn load_settings(path: &Path) -> RecorderSettings {
    if !path.exists() {
        tracing::info!(target: "recorder", "[SETTINGS] Settings file not found, using defaults");
        return RecorderSettings::default();
    }

    match load_settings_from_file(path) {
        Ok(settings) => {
            tracing::info!(target: "recorder", "[SETTINGS] Settings loaded from {:?}", path);
            settings
        }
        Err(e) => {
            tracing::warn!(target: "recorder", "[SETTINGS] Failed to load settings: {}, using defaults", e);
            RecorderSettings::default()
        }
    }
}

fn load_settings_from_file(path: &Path) -> Result<RecorderSettings, SettingsError> {
    let contents = std::fs::read_to_string(path)?;
    let settings: RecorderSettings = serde_json::from_str(&contents)?;
    settings.validate()?;
    Ok(settings)
}

/// Save settings to disk, creating the parent directory if needed.
pub fn save_settings(path: &Path, settings: &RecorderSettings) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let contents = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, contents)?;

    tracing::debug!(target: "recorder", "[SETTINGS] Settings saved to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_headset() {
        let settings = RecorderSettings::default();

        assert_eq!(settings.capture_resolution(), Resolution::new(768, 702));
        assert_eq!(settings.max_frames(), 3000);
        assert_eq!(settings.thumbnail_frame_index, 15);
        assert_eq!(settings.jpeg_quality, 60);
        assert_eq!(settings.frame_format, FrameFormat::Yuv420sp);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: RecorderSettings =
            serde_json::from_str(r#"{ "frameRate": 30, "maxDurationSecs": 2 }"#).unwrap();

        assert_eq!(settings.frame_rate, 30);
        assert_eq!(settings.max_frames(), 60);
        assert_eq!(settings.eye_width, 1536);
        assert!(settings.gallery_dir.is_none());
    }

    #[test]
    fn test_validate_rejects_zero_frame_rate() {
        let settings = RecorderSettings {
            frame_rate: 0,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_bad_jpeg_quality() {
        let settings = RecorderSettings {
            jpeg_quality: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("recorder.json");

        let settings = RecorderSettings {
            frame_rate: 24,
            gallery_dir: Some(tmp.path().join("gallery")),
            ..Default::default()
        };
        save_settings(&path, &settings).unwrap();

        assert_eq!(load_settings(&path), settings);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("recorder.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert_eq!(load_settings(&path), RecorderSettings::default());

        std::fs::write(&path, r#"{ "frameRate": 0 }"#).unwrap();
        assert_eq!(load_settings(&path), RecorderSettings::default());
    }
}
