//! Engine configuration stored as JSON

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::{Color, BLACK};
use crate::error::{Error, Result};
use crate::rasterizer::DEFAULT_AMBIENT;

/// Window, loop and rasterizer settings.
///
/// Every field has a default, so a file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub title: String,
    /// Rasterizer width in pixels
    pub width: u32,
    /// Rasterizer height in pixels
    pub height: u32,
    /// Window size multiplier applied at presentation
    pub scale: f32,
    pub vsync: bool,
    /// Render only after an update step ran
    pub capped: bool,
    pub show_fps: bool,
    pub clear_color: Color,
    pub ambient_color: Color,
    /// Glyph atlas used for text, if any
    pub font: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "softraster".to_string(),
            width: 1080,
            height: 720,
            scale: 1.0,
            vsync: true,
            capped: false,
            show_fps: true,
            clear_color: BLACK,
            ambient_color: DEFAULT_AMBIENT,
            font: None,
        }
    }
}

impl Config {
    /// Window size after scaling, never smaller than 1x1
    pub fn window_size(&self) -> (u32, u32) {
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        (
            ((self.width as f32 * scale) as u32).max(1),
            ((self.height as f32 * scale) as u32).max(1),
        )
    }

    /// Save to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Load from a JSON file, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.as_ref().display());
                config
            }
            Err(e) => {
                log::warn!("{}, using default config", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("softraster-{}-{}.json", std::process::id(), name))
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!((config.width, config.height), (1080, 720));
        assert_eq!(config.clear_color, BLACK);
        assert_eq!(config.ambient_color, DEFAULT_AMBIENT);
        assert!(config.font.is_none());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{ "width": 320, "vsync": false }"#).unwrap();
        assert_eq!(config.width, 320);
        assert!(!config.vsync);
        assert_eq!(config.height, 720);
        assert_eq!(config.title, "softraster");
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("roundtrip");
        let config = Config {
            title: "demo".to_string(),
            scale: 2.0,
            ambient_color: 0xFF40_4040,
            font: Some(PathBuf::from("fonts/basic.png")),
            ..Config::default()
        };
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Config::load(temp_path("missing")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_load_malformed_file_is_config_error() {
        let path = temp_path("malformed");
        fs::write(&path, "{ width: ").unwrap();
        let err = Config::load(&path).unwrap_err();
        let _ = fs::remove_file(&path);
        assert!(matches!(err, Error::Config(_)));
    }

    #[test_log::test]
    fn test_load_or_default_falls_back() {
        let config = Config::load_or_default(temp_path("absent"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_window_size_scales() {
        let config = Config {
            width: 200,
            height: 100,
            scale: 2.5,
            ..Config::default()
        };
        assert_eq!(config.window_size(), (500, 250));

        let bad = Config {
            scale: -1.0,
            ..config
        };
        assert_eq!(bad.window_size(), (200, 100));
    }
}
