//! Configuration management for the content client
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (headless.toml)
//! - Environment variables (HEADLESS__*)
//!
//! ## Example config file (headless.toml):
//! ```toml
//! [api]
//! host = "https://cms.example.com"
//! language = "en"
//! site_path = "site"
//! home_path = "home"
//!
//! [thumbs]
//! quality = 80
//! hires = true
//! srcset_widths = [400, 800, 1200]
//!
//! [form]
//! mode = "live"
//! reset_after_submit = true
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::form::{Mode, SubmitOptions};
use crate::thumb::ThumbOptions;

/// Main configuration for the content client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Content API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Thumb defaults
    #[serde(default)]
    pub thumbs: ThumbConfig,

    /// Form behaviour
    #[serde(default)]
    pub form: FormConfig,
}

/// Content API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the content API
    #[serde(default)]
    pub host: Option<String>,

    /// Language requested when the transport has no current language
    #[serde(default)]
    pub language: Option<String>,

    /// Request path of the site resource
    #[serde(default = "default_site_path")]
    pub site_path: String,

    /// Request path of the home page
    #[serde(default = "default_home_path")]
    pub home_path: String,
}

/// Thumb defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbConfig {
    /// JPEG/WebP quality, 0 keeps the server default
    #[serde(default)]
    pub quality: u32,

    /// Request double-density files
    #[serde(default)]
    pub hires: bool,

    /// Widths used for `srcset`
    #[serde(default = "default_srcset_widths")]
    pub srcset_widths: Vec<u32>,
}

/// Form configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    /// Validation mode
    #[serde(default)]
    pub mode: Mode,

    /// Validate before sending
    #[serde(default = "default_true")]
    pub validate_before_submit: bool,

    /// Reset the form after a submit
    #[serde(default = "default_true")]
    pub reset_after_submit: bool,
}

// Default value functions
fn default_site_path() -> String {
    "site".to_string()
}

fn default_home_path() -> String {
    "home".to_string()
}

fn default_srcset_widths() -> Vec<u32> {
    vec![400, 800, 1200]
}

fn default_true() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: None,
            language: None,
            site_path: default_site_path(),
            home_path: default_home_path(),
        }
    }
}

impl Default for ThumbConfig {
    fn default() -> Self {
        Self {
            quality: 0,
            hires: false,
            srcset_widths: default_srcset_widths(),
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            validate_before_submit: true,
            reset_after_submit: true,
        }
    }
}

impl ThumbConfig {
    /// Base options carrying the configured quality and density
    pub fn options(&self) -> ThumbOptions {
        ThumbOptions::new().quality(self.quality).hires(self.hires)
    }
}

impl FormConfig {
    pub fn submit_options(&self) -> SubmitOptions {
        SubmitOptions {
            validate: self.validate_before_submit,
            reset: self.reset_after_submit,
        }
    }
}

impl ClientConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, adding an explicit file that must exist
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = ["headless.toml", ".headless.toml", "config/headless.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "headless", "content") {
            let xdg_config = config_dir.config_dir().join("headless.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // Load from environment variables (HEADLESS__*)
        builder = builder.add_source(
            Environment::with_prefix("HEADLESS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api.site_path, "site");
        assert_eq!(config.thumbs.srcset_widths, vec![400, 800, 1200]);
        assert!(config.form.reset_after_submit);
        assert_eq!(config.form.mode, Mode::OnSubmit);
    }

    #[test]
    fn test_thumb_defaults_match_serde_defaults() {
        let parsed: ThumbConfig = toml::from_str("").unwrap();
        let built = ThumbConfig::default();
        assert_eq!(built.srcset_widths, parsed.srcset_widths);
        assert_eq!((built.quality, built.hires), (parsed.quality, parsed.hires));
    }

    #[test]
    fn test_serialize_config() {
        let config = ClientConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[thumbs]"));
        assert!(toml_str.contains("[form]"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(
            &path,
            "[api]\nhost = \"https://cms.example.com\"\n\n[thumbs]\nquality = 70\n\n[form]\nmode = \"live\"\n",
        )
        .unwrap();

        let config = ClientConfig::load_from(Some(&path)).unwrap();
        assert_eq!(config.api.host.as_deref(), Some("https://cms.example.com"));
        assert_eq!(config.api.home_path, "home");
        assert_eq!(config.thumbs.options().quality, 70);
        assert_eq!(config.form.mode, Mode::Live);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = ClientConfig::default();
        config.thumbs.hires = true;
        config.save(&path).unwrap();

        let loaded = ClientConfig::load_from(Some(&path)).unwrap();
        assert!(loaded.thumbs.hires);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ClientConfig::load_from(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
