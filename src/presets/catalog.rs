use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::PresetError;

/// What kind of file a preset points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetKind {
    None,
    #[serde(alias = "cube")]
    Table,
    #[serde(alias = "xmp")]
    Adjustment,
}

impl PresetKind {
    /// Sub-directory of the catalog root holding files of this kind
    fn folder(self) -> Option<&'static str> {
        match self {
            PresetKind::None => None,
            PresetKind::Table => Some("luts"),
            PresetKind::Adjustment => Some("xmp"),
        }
    }
}

/// One entry of presets.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetEntry {
    pub id: String,
    pub name: String,
    #[serde(alias = "type")]
    pub kind: PresetKind,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    presets: Vec<PresetEntry>,
}

/// Static preset catalog, resolved relative to the directory holding it
#[derive(Debug, Clone, Default)]
pub struct PresetCatalog {
    root: PathBuf,
    presets: Vec<PresetEntry>,
}

impl PresetCatalog {
    /// Parse catalog JSON; files resolve against `root`
    pub fn from_json(json: &str, root: impl Into<PathBuf>) -> Result<Self, PresetError> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| PresetError::Catalog(e.to_string()))?;
        Ok(Self {
            root: root.into(),
            presets: file.presets,
        })
    }

    /// Read a catalog file from disk
    pub fn load(path: &Path) -> Result<Self, PresetError> {
        let json = std::fs::read_to_string(path).map_err(|source| PresetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let catalog = Self::from_json(&json, root)?;
        tracing::info!(
            path = %path.display(),
            presets = catalog.presets.len(),
            "Loaded preset catalog"
        );
        Ok(catalog)
    }

    pub fn entries(&self) -> &[PresetEntry] {
        &self.presets
    }

    pub fn get(&self, id: &str) -> Option<&PresetEntry> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Resolve a preset id to its kind and on-disk file.
    ///
    /// `None`-kind presets resolve to `(PresetKind::None, None)`.
    pub fn resolve(&self, id: &str) -> Result<(PresetKind, Option<PathBuf>), PresetError> {
        let entry = self
            .get(id)
            .ok_or_else(|| PresetError::NotFound(id.to_string()))?;

        let Some(folder) = entry.kind.folder() else {
            return Ok((PresetKind::None, None));
        };

        let file = entry
            .file
            .as_deref()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| PresetError::NoFile(id.to_string()))?;

        let file = Path::new(file);
        let path = if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.root.join(folder).join(file)
        };

        Ok((entry.kind, Some(path)))
    }
}
