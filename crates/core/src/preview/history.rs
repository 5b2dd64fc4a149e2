use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Documents kept per file path unless configured otherwise.
pub const DEFAULT_ENTRIES_PER_PATH: usize = 16;

/// File paths tracked unless configured otherwise.
pub const DEFAULT_MAX_PATHS: usize = 256;

/// History store shared between a tool and whoever owns it.
pub type SharedHistory = Arc<Mutex<FileHistory>>;

/// Generated documents per file path, oldest first.
///
/// The store is bounded twice: each path keeps at most `entries_per_path`
/// documents, and at most `max_paths` paths are tracked. Past either bound
/// the oldest document (or the least recently written path) is dropped.
#[derive(Debug, Clone)]
pub struct FileHistory {
    entries: HashMap<PathBuf, VecDeque<String>>,
    // Least recently written path at the front.
    order: VecDeque<PathBuf>,
    entries_per_path: usize,
    max_paths: usize,
}

impl Default for FileHistory {
    fn default() -> Self {
        Self::new(DEFAULT_ENTRIES_PER_PATH, DEFAULT_MAX_PATHS)
    }
}

impl FileHistory {
    /// Both bounds are clamped to at least one.
    pub fn new(entries_per_path: usize, max_paths: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            entries_per_path: entries_per_path.max(1),
            max_paths: max_paths.max(1),
        }
    }

    pub fn shared(self) -> SharedHistory {
        Arc::new(Mutex::new(self))
    }

    /// Append a document for `path`.
    pub fn record(&mut self, path: &Path, document: impl Into<String>) {
        if let Some(pos) = self.order.iter().position(|p| p == path) {
            self.order.remove(pos);
        }
        self.order.push_back(path.to_path_buf());

        let documents = self.entries.entry(path.to_path_buf()).or_default();
        documents.push_back(document.into());
        while documents.len() > self.entries_per_path {
            documents.pop_front();
        }

        while self.order.len() > self.max_paths {
            if let Some(evicted) = self.order.pop_front() {
                self.entries.remove(&evicted);
            }
        }
    }

    /// Documents recorded for `path`, oldest first.
    pub fn entries(&self, path: &Path) -> Vec<String> {
        self.entries
            .get(path)
            .map(|docs| docs.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn latest(&self, path: &Path) -> Option<&str> {
        self.entries
            .get(path)
            .and_then(|docs| docs.back())
            .map(String::as_str)
    }

    pub fn path_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
