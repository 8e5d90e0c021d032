//! # Configuration File Loading
//!
//! Loads dialogue configuration from TOML or YAML files, detecting the
//! format from the file extension.

use std::path::Path;

use errors::DialogueError;

use crate::config::DialogueConfig;

/// Configuration file loading error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse {format} config: {reason}")]
    Parse {
        format: ConfigFormat,
        reason: String
    },

    #[error("Config file has no extension")]
    NoExtension,

    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(String)
}

impl From<ConfigFileError> for DialogueError {
    fn from(err: ConfigFileError) -> Self {
        DialogueError::configuration(err.to_string())
    }
}

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml
}

impl ConfigFormat {
    /// Detect the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ConfigFileError> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigFileError::NoExtension)?;

        match extension.to_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(ConfigFileError::UnsupportedFormat(other.to_string()))
        }
    }
}

impl std::fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Toml => f.write_str("TOML"),
            Self::Yaml => f.write_str("YAML")
        }
    }
}

/// Parse configuration text in the given format.
pub fn load_from_str(contents: &str, format: ConfigFormat) -> Result<DialogueConfig, ConfigFileError> {
    let parsed = match format {
        ConfigFormat::Toml => toml::from_str(contents).map_err(|e| e.to_string()),
        ConfigFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| e.to_string())
    };

    parsed.map_err(|reason| ConfigFileError::Parse { format, reason })
}

/// Load configuration from file with auto-detection.
///
/// # M-CANONICAL-DOCS
///
/// ## Supported Formats
/// - `.toml`: TOML format
/// - `.yaml` / `.yml`: YAML format
///
/// ## Usage
/// ```rust,no_run
/// use config::load_from_file;
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = load_from_file(Path::new("guide.toml"))?;
///     println!("Endpoint host: {}", config.endpoint.host);
///     Ok(())
/// }
/// ```
///
/// ## Error Handling
/// Returns `ConfigFileError` for a missing file, an unknown extension or a
/// parse failure. Omitted sections fall back to their defaults.
pub fn load_from_file(path: &Path) -> Result<DialogueConfig, ConfigFileError> {
    let format = ConfigFormat::from_path(path)?;
    let contents = std::fs::read_to_string(path)
        .map_err(|_e| ConfigFileError::FileNotFound(path.display().to_string()))?;

    tracing::debug!(path = %path.display(), %format, "Loading configuration file");
    load_from_str(&contents, format)
}
