//! Configuration system
//!
//! Every tool accepts an optional configuration file in TOML or RON. Values given on
//! the command line take precedence over the file.

pub use serde::{Deserialize, Serialize};

use std::path::Path;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => {
                toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            ConfigFormat::Ron => {
                ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
            }
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Ron,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Settings shared by the build tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Default log level when `RUST_LOG` is unset
    pub log_level: String,
    /// Shader compilation settings
    pub shaders: ShaderSettings,
    /// ICD manifest patching settings
    pub icd: IcdSettings,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            shaders: ShaderSettings::default(),
            icd: IcdSettings::default(),
        }
    }
}

impl Config for ToolsConfig {}

/// Shader compilation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderSettings {
    /// File extensions (without the dot) treated as shader stage sources
    pub extensions: Vec<String>,
    /// Exit with a failure status when any single shader fails to compile
    pub fail_on_error: bool,
}

impl Default for ShaderSettings {
    fn default() -> Self {
        Self {
            extensions: crate::shaders::DEFAULT_STAGE_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
            fail_on_error: false,
        }
    }
}

/// ICD manifest patching settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcdSettings {
    /// Framework directory relative to the bundled executable
    pub framework_path: String,
}

impl Default for IcdSettings {
    fn default() -> Self {
        Self {
            framework_path: crate::icd::DEFAULT_FRAMEWORK_PATH.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = ToolsConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.shaders.extensions, vec!["vert", "frag"]);
        assert!(!config.shaders.fail_on_error);
        assert_eq!(config.icd.framework_path, "../../../Frameworks");
    }

    #[test]
    fn test_load_partial_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tools.toml");
        std::fs::write(
            &path,
            "log_level = \"debug\"\n\n[shaders]\nextensions = [\"vert\", \"frag\", \"comp\"]\n",
        )
        .unwrap();

        let config = ToolsConfig::load_from_file(&path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.shaders.extensions, vec!["vert", "frag", "comp"]);
        assert!(!config.shaders.fail_on_error);
        assert_eq!(config.icd, IcdSettings::default());
    }

    #[test]
    fn test_load_ron() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tools.ron");
        std::fs::write(
            &path,
            "(shaders: (fail_on_error: true), icd: (framework_path: \"../Frameworks\"))",
        )
        .unwrap();

        let config = ToolsConfig::load_from_file(&path).unwrap();
        assert!(config.shaders.fail_on_error);
        assert_eq!(config.icd.framework_path, "../Frameworks");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_save_and_reload_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = ToolsConfig::default();
        config.shaders.fail_on_error = true;

        config.save_to_file(&path).unwrap();
        assert_eq!(ToolsConfig::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_unsupported_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tools.yaml");
        std::fs::write(&path, "log_level: debug").unwrap();

        assert!(matches!(
            ToolsConfig::load_from_file(&path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            ToolsConfig::load_from_file(dir.path().join("absent.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
