//! JSONL seed loading for catalog bootstrap.
//!
//! One JSON object per line, discriminated by a `kind` field:
//! `entry`, `category`, `metadata_type`, `metadata_option`, `assignment`.
//! Unknown kinds and malformed lines are skipped with a warning so a partly
//! broken dump still loads what it can.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::entry::{Category, CatalogEntry};
use crate::errors::CatalogError;
use crate::metadata::{MetadataOption, MetadataType};
use crate::store::CatalogStore;

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum SeedRecord {
    Entry(Box<CatalogEntry>),
    Category(Category),
    MetadataType(MetadataType),
    MetadataOption(MetadataOption),
    Assignment { entry_id: i64, option_id: i64 },
}

impl CatalogStore {
    /// Loads a JSONL dump into the store.
    ///
    /// Returns the number of records applied. Assignment lines referencing
    /// unknown rows and duplicate option values are logged and skipped;
    /// only I/O failures abort the load.
    ///
    /// # Errors
    /// Returns [`CatalogError::Io`] if the file cannot be read.
    pub async fn seed_from_jsonl(&self, path: impl AsRef<Path>) -> Result<usize, CatalogError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut applied = 0usize;
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: SeedRecord = match serde_json::from_str(&line) {
                Ok(r) => r,
                Err(e) => {
                    warn!(line = lineno + 1, error = %e, "skipping malformed seed line");
                    continue;
                }
            };
            match record {
                SeedRecord::Entry(entry) => {
                    self.upsert_entry(*entry).await;
                    applied += 1;
                }
                SeedRecord::Category(category) => {
                    self.upsert_category(category).await;
                    applied += 1;
                }
                SeedRecord::MetadataType(ty) => {
                    self.upsert_metadata_type(ty).await;
                    applied += 1;
                }
                SeedRecord::MetadataOption(option) => match self.upsert_metadata_option(option).await {
                    Ok(()) => applied += 1,
                    Err(e) => warn!(line = lineno + 1, error = %e, "skipping metadata option"),
                },
                SeedRecord::Assignment { entry_id, option_id } => {
                    match self.assign_metadata(entry_id, option_id).await {
                        Ok(_) => applied += 1,
                        Err(e) => warn!(line = lineno + 1, error = %e, "skipping assignment"),
                    }
                }
            }
        }

        info!(path = %path.display(), applied, "catalog seed loaded");
        Ok(applied)
    }
}
