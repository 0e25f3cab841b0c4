use crate::config::ServiceConfig;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A configured sequence store: an identifier and the FASTA file behind it.
/// `backing_path` is the path exactly as configured and is what requests
/// match against; `fasta_path` is where the file is opened from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    store_id: String,
    backing_path: String,
    fasta_path: PathBuf,
}

impl IndexEntry {
    /// Returns `None` for an empty backing path; such entries can never be
    /// fetched from.
    pub fn new(store_id: &str, backing_path: &str) -> Option<Self> {
        if backing_path.is_empty() {
            return None;
        }
        Some(Self {
            store_id: store_id.to_string(),
            backing_path: backing_path.to_string(),
            fasta_path: PathBuf::from(backing_path),
        })
    }

    pub fn with_fasta_path(mut self, fasta_path: PathBuf) -> Self {
        self.fasta_path = fasta_path;
        self
    }

    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    pub fn backing_path(&self) -> &str {
        &self.backing_path
    }

    pub fn fasta_path(&self) -> &Path {
        &self.fasta_path
    }
}

/// Ordered, read-only list of configured stores.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexRegistry {
    entries: Vec<IndexEntry>,
}

impl IndexRegistry {
    pub fn new(entries: Vec<IndexEntry>) -> Self {
        Self { entries }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        let mut entries = Vec::new();
        for (i, raw) in config.index_files.entries().iter().enumerate() {
            let store_id = raw.store_id.as_deref().unwrap_or_default();
            let Some(fasta) = raw.fasta.as_deref().filter(|f| !f.is_empty()) else {
                warn!(index = i, store_id, "index entry has no Fasta path, skipping");
                continue;
            };
            if let Some(entry) = IndexEntry::new(store_id, fasta) {
                entries.push(entry.with_fasta_path(config.locate_fasta(fasta)));
            }
        }
        if entries.is_empty() {
            warn!("no usable index entries configured");
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
