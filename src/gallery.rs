//! On-device gallery where screenshots, videos and video thumbnails are stored.
//!
//! File names carry the capture time: `screen_2021-11-02_18-03-04.jpg`,
//! `video_2021-11-02_18-03-04.mp4` and `video_2021-11-02_18-03-04_lynxthumb.jpg`.

use crate::core::settings::RecorderSettings;
use crate::shared::errors::StorageError;
use crate::shared::paths::{default_gallery_dir, ensure_dir};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Suffix that marks a JPEG as the thumbnail of a video.
pub const THUMBNAIL_KEYWORD: &str = "_lynxthumb";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
const TIMESTAMP_LEN: usize = "2021-11-02_18-03-04".len();
const TITLE_FORMAT: &str = "%m.%d.%Y  %H:%M";

const SCREENSHOT_PREFIX: &str = "screen_";
const VIDEO_PREFIX: &str = "video_";
/// Only names whose timestamp starts in the 2000s are recognized as videos.
const VIDEO_MARKER: &str = "video_2";

#[derive(Debug, Clone, PartialEq)]
pub struct Gallery {
    root: PathBuf,
}

impl Gallery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_settings(settings: &RecorderSettings) -> Self {
        match &settings.gallery_dir {
            Some(dir) => Self::new(dir),
            None => Self::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the gallery directory if it doesn't exist yet.
    pub fn ensure(&self) -> Result<&Path, StorageError> {
        if !self.root.exists() {
            tracing::info!(target: "gallery", "[GALLERY] Creating gallery folder {:?}", self.root);
        }
        ensure_dir(&self.root).map_err(|e| StorageError::directory(&self.root, e))?;
        Ok(&self.root)
    }

    pub fn video_path(&self, at: NaiveDateTime) -> PathBuf {
        self.root
            .join(format!("{}{}.mp4", VIDEO_PREFIX, at.format(TIMESTAMP_FORMAT)))
    }

    pub fn screenshot_path(&self, at: NaiveDateTime) -> PathBuf {
        self.root
            .join(format!("{}{}.jpg", SCREENSHOT_PREFIX, at.format(TIMESTAMP_FORMAT)))
    }

    /// Thumbnail path for a video, or `None` if the video name carries no timestamp.
    pub fn thumbnail_path_for(&self, video_path: &Path) -> Option<PathBuf> {
        let name = video_path.file_name()?.to_str()?;
        let start = name.find(VIDEO_MARKER)?;
        let stem = Path::new(&name[start..]).file_stem()?.to_str()?;

        Some(self.root.join(format!("{}{}.jpg", stem, THUMBNAIL_KEYWORD)))
    }

    /// Removes the thumbnail belonging to `video_path`. Returns true if a file was deleted.
    pub fn delete_video_thumbnail(&self, video_path: &Path) -> Result<bool, StorageError> {
        let Some(thumbnail) = self.thumbnail_path_for(video_path) else {
            return Ok(false);
        };

        if !thumbnail.exists() {
            return Ok(false);
        }

        std::fs::remove_file(&thumbnail)?;
        tracing::debug!(target: "gallery", "[GALLERY] Deleted thumbnail {:?}", thumbnail);
        Ok(true)
    }
}

impl Default for Gallery {
    fn default() -> Self {
        Self::new(default_gallery_dir())
    }
}

/// Display title for a gallery file, e.g. `11.02.2021  18:03` for
/// `screen_2021-11-02_18-03-04.jpg`. Files not named by the headset fall back
/// to their stem.
pub fn thumbnail_title_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let timestamp = stem
        .strip_prefix(SCREENSHOT_PREFIX)
        .or_else(|| stem.strip_prefix(VIDEO_PREFIX))
        .and_then(|rest| rest.get(..TIMESTAMP_LEN))
        .and_then(|ts| NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).ok());

    match timestamp {
        Some(at) => at.format(TITLE_FORMAT).to_string(),
        None => {
            tracing::warn!(target: "gallery",
                "[GALLERY] {:?} is not a headset screenshot or video, using file name as title", path);
            stem
        }
    }
}
