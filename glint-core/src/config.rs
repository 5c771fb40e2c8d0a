//! Runtime configuration of the demo.
//!
//! Every field has a default, so a config file only needs to name what it changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    dictionary::{DictionaryError, DictionaryLayout},
    material::GlintMaterial,
};

/// Directory name used below the platform config directory.
pub const APP_DIR: &str = "realtime-glint";
pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// MSAA samples, 0 disables multisampling.
    pub samples: u8,
    pub vsync: bool,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Real Time Glint".to_string(),
            width: 1600,
            height: 800,
            samples: 0,
            vsync: true,
            resizable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlConfig {
    pub major: u8,
    pub minor: u8,
    /// Requests a debug context and forwards driver messages to the log.
    pub debug: bool,
}

impl Default for GlConfig {
    fn default() -> Self {
        Self {
            major: 4,
            minor: 1,
            debug: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding `glint.vert.glsl` and `glint.frag.glsl`. The shaders built into the
    /// binary are used when unset.
    pub shader_dir: Option<PathBuf>,
    /// OBJ file to render. A procedural sphere is used when unset.
    pub model: Option<PathBuf>,
    pub dictionary_base: PathBuf,
    pub dictionary_levels: u32,
    pub dictionary_dists_per_channel: u32,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            shader_dir: None,
            model: None,
            dictionary_base: PathBuf::from("media/dictionary/dict_16_192_64_0p5_0p02"),
            dictionary_levels: 16,
            dictionary_dists_per_channel: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Homogeneous position, `w = 1` for a point light.
    pub position: [f32; 4],
    pub radiance: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: [5.0, 5.0, 5.0, 1.0],
            radiance: [100.0; 3],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 2.2],
            fov_degrees: 60.0,
            near: 0.3,
            far: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlintConfig {
    pub window: WindowConfig,
    pub gl: GlConfig,
    pub assets: AssetConfig,
    pub material: GlintMaterial,
    pub light: LightConfig,
    pub camera: CameraConfig,
}

impl GlintConfig {
    /// Reads a config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Location of the per-user config file, if the platform has a config directory.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Picks the config to run with.
    ///
    /// An explicit path must exist. Without one, the per-user file is used when present and
    /// the defaults otherwise.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::user_config_path() {
            Some(path) if path.is_file() => {
                log::info!("Using config {}", path.display());
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn dictionary_layout(&self) -> Result<DictionaryLayout, DictionaryError> {
        DictionaryLayout::new(
            &self.assets.dictionary_base,
            self.assets.dictionary_levels,
            self.assets.dictionary_dists_per_channel,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: GlintConfig = serde_json::from_str(
            r#"{ "window": { "width": 800 }, "material": { "alpha_x": 0.2 } }"#,
        )
        .unwrap();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 800);
        assert_eq!(config.window.title, "Real Time Glint");
        assert_eq!(config.material.alpha_x, 0.2);
        assert_eq!(config.material.alpha_y, 0.5);
        assert_eq!(config.assets.dictionary_levels, 16);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut expected = GlintConfig::default();
        expected.gl.debug = true;
        expected.assets.shader_dir = Some(PathBuf::from("shader"));
        std::fs::write(&path, serde_json::to_string_pretty(&expected).unwrap()).unwrap();

        assert_eq!(GlintConfig::resolve(Some(&path)).unwrap(), expected);
    }

    #[test]
    fn test_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            GlintConfig::load(&missing),
            Err(ConfigError::Read { path, .. }) if path == missing
        ));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            GlintConfig::load(&broken),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_default_dictionary_layout() {
        let layout = GlintConfig::default().dictionary_layout().unwrap();
        assert_eq!(layout.layer_count(), 16 * 64);
    }
}
