use crate::models::ListingRecord;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the combined dataset file inside the output directory
pub const DATASET_FILE: &str = "listings.json";
/// Per-record files live here, one JSON file each
pub const RECORDS_DIR: &str = "raw_scrape";

const MAX_FILE_STEM: usize = 120;

/// Outcome of [`ListingStore::upsert`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

/// Insertion-ordered listings keyed by [`ListingRecord::identity_key`].
///
/// Writing the same listing twice keeps one record, the latest.
#[derive(Debug, Default)]
pub struct ListingStore {
    records: Vec<ListingRecord>,
    index: HashMap<String, usize>,
}

impl ListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ListingRecord] {
        &self.records
    }

    pub fn get(&self, key: &str) -> Option<&ListingRecord> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    pub fn upsert(&mut self, record: ListingRecord) -> Upsert {
        let key = record.identity_key();
        match self.index.get(&key) {
            Some(&i) => {
                self.records[i] = record;
                Upsert::Replaced
            }
            None => {
                self.index.insert(key, self.records.len());
                self.records.push(record);
                Upsert::Inserted
            }
        }
    }

    pub fn into_records(self) -> Vec<ListingRecord> {
        self.records
    }

    /// Reads a dataset written by [`save`](Self::save). A missing file is an empty store.
    pub async fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(DATASET_FILE);
        let exists = tokio::fs::try_exists(&path)
            .await
            .with_context(|| format!("Failed to check dataset {}", path.display()))?;
        if !exists {
            debug!("No existing dataset at {}", path.display());
            return Ok(Self::new());
        }

        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;
        let records: Vec<ListingRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse dataset {}", path.display()))?;

        let mut store = Self::new();
        for record in records {
            store.upsert(record);
        }
        info!("Loaded {} listings from {}", store.len(), path.display());
        Ok(store)
    }

    /// Writes the combined dataset plus one file per record. Returns the dataset path.
    pub async fn save(&self, dir: &Path) -> Result<PathBuf> {
        let records_dir = dir.join(RECORDS_DIR);
        tokio::fs::create_dir_all(&records_dir)
            .await
            .with_context(|| format!("Failed to create {}", records_dir.display()))?;

        let path = dir.join(DATASET_FILE);
        let json = serde_json::to_string_pretty(&self.records)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        for record in &self.records {
            let file = records_dir.join(format!("{}.json", file_stem(&record.identity_key())));
            let json = serde_json::to_string_pretty(record)?;
            tokio::fs::write(&file, json)
                .await
                .with_context(|| format!("Failed to write {}", file.display()))?;
        }

        info!("💾 Saved {} listings to {}", self.records.len(), path.display());
        Ok(path)
    }
}

/// File-system-safe name for an identity key.
pub fn file_stem(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .take(MAX_FILE_STEM)
        .collect()
}
