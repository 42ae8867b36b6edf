//! Loader for batch configuration files.
//!
//! A configuration file holds a single top-level `feeds` sequence. YAML is
//! the primary format; TOML and JSON are accepted by file extension.
//! Unknown top-level keys are accepted and logged as a warning.
use std::path::Path;

use thiserror::Error;

use crate::feed::Batch;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML in configuration file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML in configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON in configuration file: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file exceeds maximum allowed size.
    #[error("Configuration file too large: {0}")]
    TooLarge(String),

    #[error("Configuration file is empty: {0}")]
    Empty(String),
}

// ============================================================================
// Format Detection
// ============================================================================

/// Serialization format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigFormat {
    /// Picks the format from the file extension. Anything that is not
    /// `.toml` or `.json` is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => ConfigFormat::Toml,
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

const KNOWN_KEYS: [&str; 1] = ["feeds"];

impl Batch {
    /// Maximum configuration file size (10 MB).
    const MAX_FILE_SIZE: u64 = 10 * 1_048_576;

    /// Loads a batch from a configuration file.
    ///
    /// - Missing or unreadable file → `Err(ConfigError::Io)`
    /// - Empty or whitespace-only file → `Err(ConfigError::Empty)`
    /// - Malformed document → the format's parse error, with location info
    /// - Unknown top-level keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let meta = std::fs::metadata(path)?;
        if meta.len() > Self::MAX_FILE_SIZE {
            return Err(ConfigError::TooLarge(format!(
                "Configuration file is {} bytes (max {} bytes)",
                meta.len(),
                Self::MAX_FILE_SIZE
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let format = ConfigFormat::from_path(path);
        let batch = Self::from_str_with_format(&content, format).map_err(|e| match e {
            ConfigError::Empty(_) => ConfigError::Empty(path.display().to_string()),
            other => other,
        })?;

        tracing::info!(
            path = %path.display(),
            format = ?format,
            feeds = batch.feeds.len(),
            "Loaded feed configuration"
        );
        Ok(batch)
    }

    /// Parses a batch from configuration text in the given format.
    pub fn from_str_with_format(content: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Err(ConfigError::Empty("<input>".to_string()));
        }

        for key in top_level_keys(content, format) {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                tracing::warn!(key = %key, "Unknown key in configuration file, ignoring");
            }
        }

        let batch = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        Ok(batch)
    }
}

/// Top-level keys of the document, or nothing if it is not a mapping.
fn top_level_keys(content: &str, format: ConfigFormat) -> Vec<String> {
    match format {
        ConfigFormat::Yaml => serde_yaml::from_str::<serde_yaml::Mapping>(content)
            .map(|m| {
                m.keys()
                    .filter_map(|k| k.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default(),
        ConfigFormat::Toml => content
            .parse::<toml::Table>()
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default(),
        ConfigFormat::Json => serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(
            content,
        )
        .map(|m| m.keys().cloned().collect())
        .unwrap_or_default(),
    }
}

// ============================================================================
// Tests
// ============================================================================
