use chrono::{DateTime, Utc};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use super::ledger::base_name;

/// A file waiting to be delivered
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    pub path: PathBuf,
    pub enqueued_at: DateTime<Utc>,
}

impl QueueEntry {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            enqueued_at: Utc::now(),
        }
    }
}

/// FIFO of pending files, unique by base name.
///
/// Only the delivery worker removes or rotates entries; everyone else
/// appends.
#[derive(Debug, Clone, Default)]
pub struct UploadQueue {
    entries: VecDeque<QueueEntry>,
    members: HashSet<String>,
}

impl UploadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore persisted paths verbatim, head first.
    ///
    /// Skips nothing except exact duplicates, which a valid snapshot never
    /// contains.
    pub fn from_paths<I: IntoIterator<Item = PathBuf>>(paths: I) -> Self {
        let mut queue = Self::new();
        for path in paths {
            queue.push(path);
        }
        queue
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a file with this base name is pending
    pub fn contains_name(&self, name: &str) -> bool {
        self.members.contains(name)
    }

    /// Append to the tail; false if the base name is already queued
    pub fn push(&mut self, path: PathBuf) -> bool {
        let Some(name) = base_name(&path) else {
            return false;
        };
        if !self.members.insert(name) {
            return false;
        }
        self.entries.push_back(QueueEntry::new(path));
        true
    }

    pub fn peek(&self) -> Option<&QueueEntry> {
        self.entries.front()
    }

    /// Remove an entry, normally the head; returns whether it was present
    pub fn remove(&mut self, path: &Path) -> bool {
        let Some(pos) = self.entries.iter().position(|e| e.path == path) else {
            return false;
        };
        if let Some(entry) = self.entries.remove(pos) {
            if let Some(name) = base_name(&entry.path) {
                self.members.remove(&name);
            }
        }
        true
    }

    /// Move an entry, normally the head, to the tail
    pub fn rotate(&mut self, path: &Path) -> bool {
        let Some(pos) = self.entries.iter().position(|e| e.path == path) else {
            return false;
        };
        if let Some(entry) = self.entries.remove(pos) {
            self.entries.push_back(entry);
        }
        true
    }

    pub fn entries(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries.iter()
    }

    /// Pending paths, head first
    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|e| e.path.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(s: &str) -> PathBuf {
        PathBuf::from(s)
    }

    #[test]
    fn test_push_is_fifo() {
        let mut queue = UploadQueue::new();
        assert!(queue.push(p("/in/a.jpg")));
        assert!(queue.push(p("/in/b.jpg")));
        assert_eq!(queue.peek().unwrap().path, p("/in/a.jpg"));
        assert_eq!(queue.paths(), vec![p("/in/a.jpg"), p("/in/b.jpg")]);
    }

    #[test]
    fn test_push_rejects_duplicate_base_name() {
        let mut queue = UploadQueue::new();
        assert!(queue.push(p("/in/a.jpg")));
        assert!(!queue.push(p("/in/a.jpg")));
        assert!(!queue.push(p("/in/sub/a.jpg")));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_remove_frees_name() {
        let mut queue = UploadQueue::new();
        queue.push(p("/in/a.jpg"));
        assert!(queue.remove(&p("/in/a.jpg")));
        assert!(!queue.remove(&p("/in/a.jpg")));
        assert!(!queue.contains_name("a.jpg"));
        assert!(queue.push(p("/in/a.jpg")));
    }

    #[test]
    fn test_rotate_moves_behind_everything() {
        let mut queue = UploadQueue::from_paths(vec![p("/a.jpg"), p("/b.jpg"), p("/c.jpg")]);
        assert!(queue.rotate(&p("/a.jpg")));
        assert_eq!(queue.paths(), vec![p("/b.jpg"), p("/c.jpg"), p("/a.jpg")]);
        // Name is still reserved while the entry waits at the tail
        assert!(queue.contains_name("a.jpg"));
    }

    #[test]
    fn test_rotate_unknown_path() {
        let mut queue = UploadQueue::from_paths(vec![p("/a.jpg")]);
        assert!(!queue.rotate(&p("/zzz.jpg")));
        assert_eq!(queue.paths(), vec![p("/a.jpg")]);
    }
}
