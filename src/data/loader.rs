//! CSV Data Loader Module
//! Reads uploaded transfer files and parses them with Polars.

use crate::config::{ConfigError, CsvFormat, TextEncoding};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid CSV format: {0}")]
    Format(#[from] ConfigError),
    #[error("File is not valid UTF-8")]
    InvalidUtf8,
}

/// A file picked by the user, held fully in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Handles CSV ingestion with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Read a picked file into memory.
    pub fn read_upload(path: &Path) -> Result<UploadedFile, LoaderError> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        tracing::debug!("read {} ({} bytes)", name, bytes.len());
        Ok(UploadedFile { name, bytes })
    }

    /// Parse an upload if one was supplied.
    pub fn load_upload(
        upload: Option<&UploadedFile>,
        format: &CsvFormat,
    ) -> Result<Option<DataFrame>, LoaderError> {
        let Some(upload) = upload else {
            return Ok(None);
        };

        let df = Self::parse_csv_bytes(&upload.bytes, format)?;
        tracing::info!(
            "parsed {}: {} rows, {} columns",
            upload.name,
            df.height(),
            df.width()
        );
        Ok(Some(df))
    }

    /// Decode and parse delimited text with a header row.
    ///
    /// Every column is read as text so that pass-through columns keep their
    /// original representation.
    pub fn parse_csv_bytes(bytes: &[u8], format: &CsvFormat) -> Result<DataFrame, LoaderError> {
        let separator = format.separator_byte()?;
        let text = Self::decode(bytes, format.encoding)?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .map_parse_options(|opts| opts.with_separator(separator))
            .into_reader_with_file_handle(Cursor::new(text.into_bytes()))
            .finish()?;

        Ok(df)
    }

    /// Convert raw bytes to a UTF-8 string.
    pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<String, LoaderError> {
        match encoding {
            // Every ISO-8859-1 byte is the Unicode code point of the same value.
            TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            TextEncoding::Utf8 => {
                String::from_utf8(bytes.to_vec()).map_err(|_| LoaderError::InvalidUtf8)
            }
        }
    }
}
