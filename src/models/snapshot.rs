use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Files observed, delivered and failed since the last reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunCounters {
    pub total_files: u64,
    pub uploaded_count: u64,
    pub failed_count: u64,
}

/// Which transform to re-activate after a restart.
///
/// Stores the source file rather than the parsed data; the file is parsed
/// again on restore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransformSelector {
    #[default]
    None,
    Table {
        file: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        preset: Option<String>,
    },
    Adjustment {
        file: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        preset: Option<String>,
    },
}

impl TransformSelector {
    /// Short kind label: "none", "table" or "adjustment"
    pub fn kind(&self) -> &'static str {
        match self {
            TransformSelector::None => "none",
            TransformSelector::Table { .. } => "table",
            TransformSelector::Adjustment { .. } => "adjustment",
        }
    }
}

/// The persisted state document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    /// Pending paths, head first
    #[serde(default)]
    pub queue: Vec<PathBuf>,
    /// Delivered base names
    #[serde(default)]
    pub ledger_entries: Vec<String>,
    #[serde(default)]
    pub counters: RunCounters,
    #[serde(default)]
    pub active_transform_selector: TransformSelector,
    #[serde(default)]
    pub session_binding: Option<String>,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_document_field_names() {
        let state = PersistedState {
            queue: vec![PathBuf::from("/in/a.jpg")],
            ledger_entries: vec!["b.jpg".to_string()],
            counters: RunCounters {
                total_files: 2,
                uploaded_count: 1,
                failed_count: 0,
            },
            active_transform_selector: TransformSelector::Table {
                file: PathBuf::from("/presets/luts/warm.cube"),
                preset: Some("warm".to_string()),
            },
            session_binding: Some("S-1".to_string()),
            saved_at: None,
        };

        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["queue"][0], "/in/a.jpg");
        assert_eq!(json["ledgerEntries"][0], "b.jpg");
        assert_eq!(json["counters"]["uploadedCount"], 1);
        assert_eq!(json["activeTransformSelector"]["kind"], "table");
        assert_eq!(json["activeTransformSelector"]["preset"], "warm");
        assert_eq!(json["sessionBinding"], "S-1");
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let state: PersistedState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, PersistedState::default());
        assert_eq!(state.active_transform_selector.kind(), "none");
    }

    #[test]
    fn test_selector_round_trip_without_preset() {
        let selector = TransformSelector::Adjustment {
            file: PathBuf::from("look.xmp"),
            preset: None,
        };
        let json = serde_json::to_string(&selector).unwrap();
        assert_eq!(json, r#"{"kind":"adjustment","file":"look.xmp"}"#);
        let back: TransformSelector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, selector);
    }
}
