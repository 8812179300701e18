use std::path::{Path, PathBuf};

/// Gallery folder used by the headset's media browser.
#[cfg(target_os = "android")]
const ANDROID_GALLERY_DIR: &str = "/sdcard/DCIM/Lynx/ScreenAndVideoShots";

#[cfg(not(target_os = "android"))]
const GALLERY_DIR_NAME: &str = "ScreenAndVideoShots";

/// Get the base storage directory following XDG Base Directory Specification.
/// Returns `$XDG_DATA_HOME/lynx`, falling back to the platform data dir.
pub fn get_storage_dir() -> PathBuf {
    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg_data).join("lynx");
    }

    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("lynx")
}

/// Get the logs directory path.
/// Returns `{storage_dir}/logs`.
pub fn get_log_dir() -> PathBuf {
    get_storage_dir().join("logs")
}

/// Get the settings file path.
/// Returns `{storage_dir}/recorder.json`.
pub fn get_settings_path() -> PathBuf {
    get_storage_dir().join("recorder.json")
}

/// Directory where screenshots, videos and their thumbnails are stored.
pub fn default_gallery_dir() -> PathBuf {
    #[cfg(target_os = "android")]
    {
        PathBuf::from(ANDROID_GALLERY_DIR)
    }

    #[cfg(not(target_os = "android"))]
    {
        get_storage_dir().join(GALLERY_DIR_NAME)
    }
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_dir_structure() {
        let storage = get_storage_dir();
        assert!(storage.ends_with("lynx"));

        let logs = get_log_dir();
        assert!(logs.ends_with("logs"));

        let settings = get_settings_path();
        assert!(settings.ends_with("recorder.json"));
    }

    #[cfg(not(target_os = "android"))]
    #[test]
    fn test_gallery_dir_lives_under_storage() {
        let gallery = default_gallery_dir();
        assert!(gallery.ends_with(GALLERY_DIR_NAME));
        assert!(gallery.starts_with(get_storage_dir()));
    }

    #[test]
    fn test_ensure_dir_creates_nested_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");

        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());

        // Second call is a no-op
        ensure_dir(&nested).unwrap();
    }
}
