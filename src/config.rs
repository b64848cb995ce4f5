//! Dashboard configuration
//! CSV format and expected column names, optionally read from a JSON file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// File looked up in the working directory at startup.
pub const CONFIG_FILE_NAME: &str = "transfer_dashboard.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Separator must be a single ASCII character, got {0:?}")]
    InvalidSeparator(char),
    #[error("Preview row count must be at least 1")]
    EmptyPreview,
}

/// Text encoding of the uploaded files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// ISO-8859-1, one byte per character
    Latin1,
    Utf8,
}

/// Delimited-text format of the uploads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvFormat {
    pub separator: char,
    pub encoding: TextEncoding,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            separator: ';',
            encoding: TextEncoding::Latin1,
        }
    }
}

impl CsvFormat {
    /// Separator as the single byte the CSV parser expects.
    pub fn separator_byte(&self) -> Result<u8, ConfigError> {
        u8::try_from(self.separator)
            .ok()
            .filter(u8::is_ascii)
            .ok_or(ConfigError::InvalidSeparator(self.separator))
    }
}

/// Names of the columns the views read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub state: String,
    pub municipality: String,
    pub generation_time: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            state: "SG_UF_ORIGEM".to_string(),
            municipality: "NM_MUNICIPIO_ORIGEM".to_string(),
            generation_time: "HH_GERACAO".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub csv: CsvFormat,
    pub columns: ColumnNames,
    pub preview_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            csv: CsvFormat::default(),
            columns: ColumnNames::default(),
            preview_rows: 5,
        }
    }
}

impl DashboardConfig {
    /// Parse and validate a config from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        tracing::info!("loaded config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.csv.separator_byte()?;
        if self.preview_rows == 0 {
            return Err(ConfigError::EmptyPreview);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_electoral_export_format() {
        let config = DashboardConfig::default();
        assert_eq!(config.csv.separator_byte().unwrap(), b';');
        assert_eq!(config.csv.encoding, TextEncoding::Latin1);
        assert_eq!(config.columns.municipality, "NM_MUNICIPIO_ORIGEM");
        assert_eq!(config.preview_rows, 5);
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config =
            DashboardConfig::from_json(r#"{"csv": {"encoding": "utf8"}, "preview_rows": 10}"#)
                .unwrap();
        assert_eq!(config.csv.encoding, TextEncoding::Utf8);
        assert_eq!(config.csv.separator, ';');
        assert_eq!(config.columns, ColumnNames::default());
        assert_eq!(config.preview_rows, 10);
    }

    #[test]
    fn rejects_non_ascii_separator() {
        let err = DashboardConfig::from_json(r#"{"csv": {"separator": "§"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSeparator('§')));
    }

    #[test]
    fn rejects_zero_preview_rows() {
        let err = DashboardConfig::from_json(r#"{"preview_rows": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPreview));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig::load_or_default(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn loads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"columns": {{"state": "SG_UF"}}}}"#).unwrap();

        let config = DashboardConfig::load_or_default(&path).unwrap();
        assert_eq!(config.columns.state, "SG_UF");
        assert_eq!(config.columns.generation_time, "HH_GERACAO");
    }
}
