//! User settings read from `settings.json` in the platform config directory.
//!
//! The file is optional and never written by this crate. Every key may be omitted.
//!
//! ```json
//! {
//!   "default_crs": "EPSG:3857",
//!   "auto_close_polygons": true,
//!   "log_to_file": true,
//!   "max_file_size": 52428800,
//!   "preview_lines": 5
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crs::Crs;
use crate::io::file::MAX_FILE_SIZE;

/// Persisted user preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// CRS of new layers when none is given.
    pub default_crs: Crs,

    /// Close open polygon rings by repeating the first coordinate.
    pub auto_close_polygons: bool,

    /// Write log files under the home directory in addition to stderr.
    pub log_to_file: bool,

    /// Largest coordinate file accepted for import, in bytes.
    pub max_file_size: u64,

    /// Number of coordinates shown by a preview.
    pub preview_lines: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_crs: Crs::wgs84(),
            auto_close_polygons: true,
            log_to_file: true,
            max_file_size: MAX_FILE_SIZE,
            preview_lines: 5,
        }
    }
}

/// Result of loading settings from disk.
#[derive(Debug)]
pub struct LoadedSettings {
    pub settings: Settings,
    /// Why defaults were used instead of the file, if the file was unusable.
    pub reset_reason: Option<String>,
}

/// `<config dir>/coordgeom/settings.json`, if the platform has a config directory.
pub fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("coordgeom").join("settings.json"))
}

impl Settings {
    /// Load settings from the default location.
    pub fn load() -> LoadedSettings {
        match settings_path() {
            Some(path) => Self::load_from(&path),
            None => LoadedSettings {
                settings: Settings::default(),
                reset_reason: None,
            },
        }
    }

    /// Load settings from a file. A missing file gives defaults; an unreadable or corrupt
    /// one gives defaults and a reason.
    ///
    /// Runs before logging is set up, so nothing is logged here; callers report
    /// [`LoadedSettings::reset_reason`] once a subscriber is installed.
    pub fn load_from(path: &Path) -> LoadedSettings {
        if !path.exists() {
            return LoadedSettings {
                settings: Settings::default(),
                reset_reason: None,
            };
        }

        let (settings, reset_reason) = match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => (settings, None),
                Err(e) => (
                    Settings::default(),
                    Some(format!("Settings file was corrupted: {}", e)),
                ),
            },
            Err(e) => (
                Settings::default(),
                Some(format!("Settings file could not be read: {}", e)),
            ),
        };
        LoadedSettings {
            settings,
            reset_reason,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let loaded = Settings::load_from(Path::new("/no/such/settings.json"));
        assert_eq!(loaded.settings, Settings::default());
        assert!(loaded.reset_reason.is_none());
    }

    #[test]
    fn partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"default_crs": "EPSG:2056", "preview_lines": 10}"#).unwrap();

        let loaded = Settings::load_from(&path);
        assert!(loaded.reset_reason.is_none());
        assert_eq!(loaded.settings.default_crs.code(), "2056");
        assert_eq!(loaded.settings.preview_lines, 10);
        assert!(loaded.settings.auto_close_polygons);
        assert_eq!(loaded.settings.max_file_size, MAX_FILE_SIZE);
    }

    #[test]
    fn unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::create_dir(&path).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.settings, Settings::default());
        assert!(loaded
            .reset_reason
            .unwrap()
            .starts_with("Settings file could not be read"));
    }

    #[test]
    fn corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"default_crs": "not a crs"}"#).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.settings, Settings::default());
        assert!(loaded
            .reset_reason
            .unwrap()
            .starts_with("Settings file was corrupted"));
    }
}
