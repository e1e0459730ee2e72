//! Preset file formats and the preset catalog.
//!
//! Two formats feed the grading engine: `.cube` 3D lookup tables and XMP
//! sidecars carrying camera-raw tonal settings. The catalog maps preset ids
//! to one of those files on disk.

pub mod catalog;
pub mod cube;
pub mod xmp;

use std::path::{Path, PathBuf};
use thiserror::Error;

use color_grade::{ColorTable, ToneAdjustments};

pub use catalog::{PresetCatalog, PresetEntry, PresetKind};
pub use cube::parse_cube;
pub use xmp::parse_xmp;

/// Error from reading or parsing a preset
#[derive(Debug, Error)]
pub enum PresetError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Color table has no LUT_3D_SIZE declaration")]
    MissingSize,

    #[error("Color table contains no entries")]
    NoEntries,

    #[error("Invalid LUT_3D_SIZE on line {line}: {text}")]
    InvalidSize { line: usize, text: String },

    #[error("Invalid color entry on line {line}: {text}")]
    InvalidEntry { line: usize, text: String },

    #[error("1D lookup tables are not supported")]
    Unsupported1d,

    #[error("Invalid color table: {0}")]
    Table(#[from] color_grade::TableError),

    #[error("Preset has no rdf:Description node")]
    MissingDescription,

    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Preset not found: {0}")]
    NotFound(String),

    #[error("Preset {0} has no file")]
    NoFile(String),

    #[error("Invalid preset catalog: {0}")]
    Catalog(String),
}

async fn read_text(path: &Path) -> Result<String, PresetError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| PresetError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Read and parse a `.cube` file
pub async fn load_table(path: &Path) -> Result<ColorTable, PresetError> {
    let text = read_text(path).await?;
    let table = parse_cube(&text)?;
    tracing::debug!(path = %path.display(), size = table.size(), "Parsed color table");
    Ok(table)
}

/// Read and parse an XMP preset
pub async fn load_adjustments(path: &Path) -> Result<ToneAdjustments, PresetError> {
    let text = read_text(path).await?;
    let adjustments = parse_xmp(&text)?;
    tracing::debug!(path = %path.display(), ?adjustments, "Parsed tonal preset");
    Ok(adjustments)
}
