//! SWIFT code store - ordered in-memory index with JSON snapshots.
//!
//! Records are kept in a `BTreeMap` keyed by identifier. Since a headquarter
//! and its branches share an 8-character prefix, they sit next to each other
//! in the index and a branch lookup is a single range scan.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::ops::Bound;
use std::path::{Path, PathBuf};

use crate::dataset::normalize_text;
use crate::error::{StoreError, StoreResult};
use crate::hierarchy::{branches_of, BaseLookup};
use crate::models::SwiftCodeRecord;

/// Default snapshot location (relative to current dir)
pub const DEFAULT_STORE_PATH: &str = ".swiftcodes/store.json";

/// On-disk snapshot format
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreSnapshot {
    saved_at: String,
    records: Vec<SwiftCodeRecord>,
}

/// Outcome of a bulk load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    /// Records added to the store
    pub inserted: usize,
    /// Records skipped because their identifier was already present
    pub skipped: usize,
}

/// Store of normalized SWIFT code records.
#[derive(Debug, Default)]
pub struct SwiftCodeStore {
    /// Snapshot file, if persistence is enabled
    path: Option<PathBuf>,
    /// Records (identifier -> record)
    records: BTreeMap<String, SwiftCodeRecord>,
}

impl SwiftCodeStore {
    /// Create an empty, memory-only store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store backed by a snapshot file, loading it if it exists.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut store = Self {
            path: Some(path.clone()),
            records: BTreeMap::new(),
        };

        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let snapshot: StoreSnapshot = serde_json::from_str(&content)?;

            for mut record in snapshot.records {
                // the flag is derived from the code, whatever the file says
                record.is_headquarter = record.swift_code.is_headquarter();
                let key = record.swift_code.to_string();
                if store.records.contains_key(&key) {
                    tracing::warn!(path = %path.display(), code = %key, "duplicate code in store snapshot, keeping first");
                    continue;
                }
                store.records.insert(key, record);
            }

            tracing::info!(
                path = %path.display(),
                records = store.records.len(),
                saved_at = %snapshot.saved_at,
                "loaded store snapshot"
            );
        }

        Ok(store)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &SwiftCodeRecord> {
        self.records.values()
    }

    /// Get a record by exact identifier.
    pub fn get(&self, code: &str) -> Option<&SwiftCodeRecord> {
        self.records.get(code)
    }

    /// All records of one country, in identifier order.
    ///
    /// The country code is trimmed and upper-cased before matching.
    pub fn by_country(&self, country_iso2: &str) -> Vec<&SwiftCodeRecord> {
        let country_iso2 = normalize_text(country_iso2);
        self.records
            .values()
            .filter(|r| r.country_iso2 == country_iso2)
            .collect()
    }

    /// Branches of a headquarter, see [`branches_of`].
    pub fn branches(&self, hq_code: &str) -> Vec<&SwiftCodeRecord> {
        branches_of(hq_code, self)
    }

    /// Hand off a parsed dataset.
    ///
    /// Identifiers already present are skipped, never overwritten.
    pub fn load(&mut self, records: Vec<SwiftCodeRecord>) -> LoadSummary {
        self.load_tracked(records).0
    }

    /// [`load`](Self::load), then [`save`](Self::save).
    ///
    /// If the snapshot cannot be written the inserted records are taken out
    /// again, so memory and disk never disagree.
    pub fn load_and_save(&mut self, records: Vec<SwiftCodeRecord>) -> StoreResult<LoadSummary> {
        let (summary, inserted) = self.load_tracked(records);

        if let Err(e) = self.save() {
            for key in &inserted {
                self.records.remove(key);
            }
            tracing::warn!(error = %e, rolled_back = inserted.len(), "snapshot write failed");
            return Err(e);
        }

        Ok(summary)
    }

    fn load_tracked(&mut self, records: Vec<SwiftCodeRecord>) -> (LoadSummary, Vec<String>) {
        let mut summary = LoadSummary::default();
        let mut inserted = Vec::new();

        for record in records {
            let key = record.swift_code.to_string();
            if self.records.contains_key(&key) {
                summary.skipped += 1;
            } else {
                self.records.insert(key.clone(), record);
                inserted.push(key);
                summary.inserted += 1;
            }
        }

        tracing::info!(
            inserted = summary.inserted,
            skipped = summary.skipped,
            total = self.records.len(),
            "loaded records into store"
        );
        (summary, inserted)
    }

    /// Add a single record.
    pub fn insert(&mut self, record: SwiftCodeRecord) -> StoreResult<()> {
        let key = record.swift_code.to_string();
        if self.records.contains_key(&key) {
            return Err(StoreError::AlreadyExists(key));
        }
        self.records.insert(key, record);
        Ok(())
    }

    /// Remove a single record.
    pub fn remove(&mut self, code: &str) -> StoreResult<SwiftCodeRecord> {
        self.records
            .remove(code)
            .ok_or_else(|| StoreError::NotFound(code.to_string()))
    }

    /// [`insert`](Self::insert), then [`save`](Self::save). Undone if the
    /// save fails.
    pub fn insert_and_save(&mut self, record: SwiftCodeRecord) -> StoreResult<()> {
        let key = record.swift_code.to_string();
        self.insert(record)?;

        if let Err(e) = self.save() {
            self.records.remove(&key);
            return Err(e);
        }
        Ok(())
    }

    /// [`remove`](Self::remove), then [`save`](Self::save). The record is
    /// put back if the save fails.
    pub fn remove_and_save(&mut self, code: &str) -> StoreResult<SwiftCodeRecord> {
        let removed = self.remove(code)?;

        if let Err(e) = self.save() {
            self.records.insert(code.to_string(), removed);
            return Err(e);
        }
        Ok(removed)
    }

    /// Write the snapshot, if persistence is enabled.
    ///
    /// Writes to a sibling temp file first and renames it over the snapshot.
    pub fn save(&self) -> StoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let snapshot = StoreSnapshot {
            saved_at: chrono::Utc::now().to_rfc3339(),
            records: self.records.values().cloned().collect(),
        };
        let content = serde_json::to_string_pretty(&snapshot)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, path)?;

        tracing::debug!(path = %path.display(), records = self.records.len(), "saved store snapshot");
        Ok(())
    }
}

impl BaseLookup for SwiftCodeStore {
    fn with_base<'a>(&'a self, base: &str) -> Vec<&'a SwiftCodeRecord> {
        self.records
            .range::<str, _>((Bound::Included(base), Bound::Unbounded))
            .take_while(|(code, _)| code.starts_with(base))
            .map(|(_, record)| record)
            .collect()
    }
}
