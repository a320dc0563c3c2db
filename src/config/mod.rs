//! Application Configuration
//!
//! Render toggles, paint style and preview settings stored in TOML format.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::overlay::{OverlayStyle, RenderConfig};

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// What gets labeled and how
    pub render: RenderConfig,
    /// Outline and label style
    pub style: OverlayStyle,
    /// Preview settings
    pub preview: PreviewSettings,
}

/// Preview-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// Frames come from a front-facing camera
    pub mirrored: bool,
    /// Still image shown behind the overlay
    pub image: Option<PathBuf>,
    /// Poll interval for detection file changes in the viewer
    pub reload_interval_ms: u64,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            mirrored: false,
            image: None,
            reload_interval_ms: 500,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {:?}", path))?;
    let config: AppConfig =
        toml::from_str(&content).with_context(|| format!("Invalid config: {:?}", path))?;
    Ok(config)
}

/// Save configuration to file, creating its directory if needed
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config: {:?}", path))?;
    info!("Saved configuration to {:?}", path);
    Ok(())
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("io", "textoverlay", "TextOverlay")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    Ok(proj_dirs.config_dir().to_path_buf())
}

/// Location of config.toml in the config directory
pub fn default_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}

/// Load `path`, or the default config file, or fall back to defaults
///
/// An explicit path must exist; the default location is optional.
pub fn load_or_default(path: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = path {
        let config = load_config(path)?;
        info!("Loaded configuration from {:?}", path);
        return Ok(config);
    }

    if let Ok(config_path) = default_config_path() {
        if config_path.exists() {
            let config = load_config(&config_path)?;
            info!("Loaded configuration from {:?}", config_path);
            return Ok(config);
        }
    }

    info!("Using default configuration");
    Ok(AppConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        // Check render defaults
        assert!(!config.render.group_by_block);
        assert!(!config.render.show_language_tag);
        assert!(!config.render.show_confidence);

        // Check style defaults
        assert!((config.style.stroke_width - 1.0).abs() < 0.01);
        assert!((config.style.text_size - 20.0).abs() < 0.01);

        // Check preview defaults
        assert!(!config.preview.mirrored);
        assert!(config.preview.image.is_none());
        assert_eq!(config.preview.reload_interval_ms, 500);
    }

    #[test]
    fn test_config_with_custom_values() {
        let mut config = AppConfig::default();
        config.render.group_by_block = true;
        config.render.show_confidence = true;
        config.style.text_size = 32.0;
        config.style.label_background = Some([0.0, 0.0, 0.0, 0.6]);
        config.preview.image = Some(PathBuf::from("frame.png"));

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert!(parsed.render.group_by_block);
        assert!(parsed.render.show_confidence);
        assert!((parsed.style.text_size - 32.0).abs() < 0.01);
        assert_eq!(parsed.style.label_background, Some([0.0, 0.0, 0.0, 0.6]));
        assert_eq!(parsed.preview.image, Some(PathBuf::from("frame.png")));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: AppConfig = toml::from_str("[render]\nshow_language_tag = true\n").unwrap();

        assert!(parsed.render.show_language_tag);
        assert!(!parsed.render.group_by_block);
        assert!((parsed.style.text_size - 20.0).abs() < 0.01);
    }

    #[test]
    fn test_save_and_load_config() {
        let mut config = AppConfig::default();
        config.preview.mirrored = true;

        let temp_file = NamedTempFile::new().unwrap();
        save_config(&config, temp_file.path()).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert!(loaded.preview.mirrored);
        assert_eq!(config.render, loaded.render);
    }

    #[test]
    fn test_save_config_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.render.group_by_block = true;
        save_config(&config, &path).unwrap();

        assert!(load_or_default(Some(&path)).unwrap().render.group_by_block);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_default_explicit_missing() {
        assert!(load_or_default(Some(Path::new("/nonexistent/path/config.toml"))).is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }
}
