//! The single active color transform shared by the worker and the API.

use color_grade::{ColorTable, Grade, ToneAdjustments};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::TransformSelector;
use crate::presets::{self, PresetCatalog, PresetError, PresetKind};

/// Exactly one transform, or none
#[derive(Debug, Clone, Default)]
pub enum ActiveTransform {
    #[default]
    None,
    Table {
        table: Arc<ColorTable>,
        selector: TransformSelector,
    },
    Adjustment {
        adjustments: ToneAdjustments,
        selector: TransformSelector,
    },
}

impl ActiveTransform {
    /// Borrow as a grade for the pixel engine
    pub fn grade(&self) -> Option<Grade<'_>> {
        match self {
            ActiveTransform::None => None,
            ActiveTransform::Table { table, .. } => Some(Grade::Table(table.as_ref())),
            ActiveTransform::Adjustment { adjustments, .. } => Some(Grade::Tone(adjustments)),
        }
    }

    pub fn selector(&self) -> TransformSelector {
        match self {
            ActiveTransform::None => TransformSelector::None,
            ActiveTransform::Table { selector, .. }
            | ActiveTransform::Adjustment { selector, .. } => selector.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, ActiveTransform::None)
    }
}

/// Description of the active transform for the control API
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformInfo {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustments: Option<BTreeMap<&'static str, f32>>,
}

impl From<&ActiveTransform> for TransformInfo {
    fn from(active: &ActiveTransform) -> Self {
        let selector = active.selector();
        let (file, preset) = match selector {
            TransformSelector::None => (None, None),
            TransformSelector::Table { file, preset }
            | TransformSelector::Adjustment { file, preset } => (Some(file), preset),
        };
        Self {
            kind: active.selector().kind(),
            file,
            preset,
            table_size: match active {
                ActiveTransform::Table { table, .. } => Some(table.size()),
                _ => None,
            },
            adjustments: match active {
                ActiveTransform::Adjustment { adjustments, .. } => {
                    Some(adjustments.fields().into_iter().collect())
                }
                _ => None,
            },
        }
    }
}

/// Holder for the active transform.
///
/// Files are parsed before the swap, so a failed activation leaves the
/// previous transform in place.
#[derive(Debug, Default)]
pub struct TransformSlot {
    active: RwLock<ActiveTransform>,
}

impl TransformSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cheap clone of the current transform
    pub async fn current(&self) -> ActiveTransform {
        self.active.read().await.clone()
    }

    pub async fn selector(&self) -> TransformSelector {
        self.active.read().await.selector()
    }

    pub async fn info(&self) -> TransformInfo {
        TransformInfo::from(&*self.active.read().await)
    }

    /// Parse a `.cube` file and make it the only active transform
    pub async fn activate_table(
        &self,
        path: &Path,
        preset: Option<String>,
    ) -> Result<TransformInfo, PresetError> {
        let table = presets::load_table(path).await?;
        tracing::info!(path = %path.display(), size = table.size(), "Activated color table");
        Ok(self
            .set(ActiveTransform::Table {
                table: Arc::new(table),
                selector: TransformSelector::Table {
                    file: path.to_path_buf(),
                    preset,
                },
            })
            .await)
    }

    /// Parse an XMP preset and make it the only active transform
    pub async fn activate_adjustment(
        &self,
        path: &Path,
        preset: Option<String>,
    ) -> Result<TransformInfo, PresetError> {
        let adjustments = presets::load_adjustments(path).await?;
        tracing::info!(path = %path.display(), "Activated tonal preset");
        Ok(self
            .set(ActiveTransform::Adjustment {
                adjustments,
                selector: TransformSelector::Adjustment {
                    file: path.to_path_buf(),
                    preset,
                },
            })
            .await)
    }

    /// Activate a catalog preset by id; `none` presets clear the slot
    pub async fn activate_preset(
        &self,
        catalog: &PresetCatalog,
        id: &str,
    ) -> Result<TransformInfo, PresetError> {
        match catalog.resolve(id)? {
            (PresetKind::Table, Some(path)) => {
                self.activate_table(&path, Some(id.to_string())).await
            }
            (PresetKind::Adjustment, Some(path)) => {
                self.activate_adjustment(&path, Some(id.to_string())).await
            }
            _ => Ok(self.remove().await),
        }
    }

    pub async fn remove(&self) -> TransformInfo {
        let info = self.set(ActiveTransform::None).await;
        tracing::info!("Removed active transform");
        info
    }

    /// Re-activate a persisted selector.
    ///
    /// A source file that no longer parses leaves no transform active.
    pub async fn restore(&self, selector: &TransformSelector) {
        let result = match selector {
            TransformSelector::None => return,
            TransformSelector::Table { file, preset } => {
                self.activate_table(file, preset.clone()).await
            }
            TransformSelector::Adjustment { file, preset } => {
                self.activate_adjustment(file, preset.clone()).await
            }
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, kind = selector.kind(), "Could not restore transform");
        }
    }

    async fn set(&self, transform: ActiveTransform) -> TransformInfo {
        let mut active = self.active.write().await;
        *active = transform;
        TransformInfo::from(&*active)
    }
}
