//! Parser limits and URL-resolution settings, optionally loaded from TOML.
//!
//! The config file is optional: a missing file yields `ParseConfig::default()`.
//! Unknown keys are logged as warnings since they are most likely typos.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Settings shared by XML parsing, dialect parsing, and link resolution.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// SEC-003: Maximum element nesting depth accepted by the XML reader.
    pub max_depth: usize,

    /// Largest document, in bytes, the XML reader will accept.
    pub max_document_bytes: usize,

    /// Scheme prepended to protocol-relative (`//host/path`) feed links.
    pub protocol_relative_scheme: String,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_document_bytes: 10 * 1024 * 1024,
            protocol_relative_scheme: "http".to_string(),
        }
    }
}

impl ParseConfig {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 3] = [
        "max_depth",
        "max_document_bytes",
        "protocol_relative_scheme",
    ];

    /// Reads limits from a TOML file.
    ///
    /// A missing or empty file gives `ParseConfig::default()`. Keys the struct
    /// does not know are logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::TooLarge`] when the file exceeds 1 MiB
    /// - [`ConfigError::Io`] when the file exists but cannot be read
    /// - [`ConfigError::Parse`] for invalid TOML or a wrongly typed value
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let Some(content) = read_capped(path, Self::MAX_FILE_SIZE)? else {
            tracing::debug!(path = %path.display(), "No parser config file, using defaults");
            return Ok(Self::default());
        };

        let config = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            max_depth = config.max_depth,
            max_document_bytes = config.max_document_bytes,
            "Loaded parser configuration"
        );
        Ok(config)
    }

    /// Parse configuration from TOML text. Blank text yields the defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!("Config text is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse the TOML content first as a raw table to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        Ok(toml::from_str(content)?)
    }
}

/// SEC-014: Reads `path` only after its size has been checked against `max_bytes`.
///
/// `Ok(None)` means the file does not exist, including when it vanishes
/// between the size check and the read.
fn read_capped(path: &Path, max_bytes: u64) -> Result<Option<String>, ConfigError> {
    let not_found = |e: &std::io::Error| e.kind() == std::io::ErrorKind::NotFound;

    let size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if not_found(&e) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if size > max_bytes {
        return Err(ConfigError::TooLarge(format!(
            "{} is {size} bytes (max {max_bytes} bytes)",
            path.display()
        )));
    }

    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if not_found(&e) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ============================================================================
// Tests
// ============================================================================
