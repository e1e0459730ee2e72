use std::collections::HashSet;
use std::path::Path;

/// Identity used by the ledger and queue: the file's base name
pub fn base_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
}

/// Base names of files that have been delivered at least once.
///
/// Only the delivery worker adds names, and only a full reset removes them.
#[derive(Debug, Clone, Default)]
pub struct DeliveryLedger {
    names: HashSet<String>,
}

impl DeliveryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted names
    pub fn from_names<I: IntoIterator<Item = String>>(names: I) -> Self {
        Self {
            names: names.into_iter().collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Record a delivery; returns false if the name was already present
    pub fn record(&mut self, name: String) -> bool {
        self.names.insert(name)
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in sorted order, for stable snapshots
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.iter().cloned().collect();
        names.sort();
        names
    }
}
