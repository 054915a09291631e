//! In-process table store, used for local runs and tests

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::AmiStore;
use crate::error::StoreError;
use crate::models::{CardBaseRecord, CatalogEntry, SelectionFilters};

/// Both tables held in memory, with the same ordering guarantees as the indexes
#[derive(Default)]
pub struct MemoryStore {
    cards: RwLock<HashMap<String, CardBaseRecord>>,
    catalog: RwLock<Vec<CatalogEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with catalog entries
    pub fn with_catalog(entries: Vec<CatalogEntry>) -> Self {
        Self {
            cards: RwLock::new(HashMap::new()),
            catalog: RwLock::new(entries),
        }
    }

    /// Load catalog entries from a JSON array file
    pub fn from_catalog_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;

        let entries: Vec<CatalogEntry> =
            serde_json::from_str(&data).context("Failed to parse catalog file")?;

        info!(
            "Loaded {} catalog entries from {}",
            entries.len(),
            path.display()
        );
        Ok(Self::with_catalog(entries))
    }

    /// Add a catalog entry
    pub async fn insert_entry(&self, entry: CatalogEntry) {
        self.catalog.write().await.push(entry);
    }

    /// Current card record, if any
    pub async fn card_record(&self, card_id: &str) -> Option<CardBaseRecord> {
        self.cards.read().await.get(card_id).cloned()
    }

    async fn newest_first<F>(&self, keep: F) -> Vec<CatalogEntry>
    where
        F: Fn(&CatalogEntry) -> bool,
    {
        let catalog = self.catalog.read().await;
        let mut entries: Vec<CatalogEntry> = catalog.iter().filter(|e| keep(e)).cloned().collect();
        entries.sort_by(|a, b| b.expiry.cmp(&a.expiry));
        entries
    }
}

#[async_trait]
impl AmiStore for MemoryStore {
    async fn get_base(&self, card_id: &str) -> Result<Option<String>, StoreError> {
        let cards = self.cards.read().await;
        Ok(cards.get(card_id).map(|r| r.base_image_id.clone()))
    }

    async fn put_base(&self, record: &CardBaseRecord) -> Result<(), StoreError> {
        debug!("Storing base AMI {} for card {}", record.base_image_id, record.card_id);
        self.cards
            .write()
            .await
            .insert(record.card_id.clone(), record.clone());
        Ok(())
    }

    async fn query_by_flavour(
        &self,
        filters: &SelectionFilters,
    ) -> Result<Vec<CatalogEntry>, StoreError> {
        Ok(self
            .newest_first(|e| e.flavour == filters.flavour && e.matches_selection(filters))
            .await)
    }

    async fn query_by_base(
        &self,
        base_image_id: &str,
        filters: &SelectionFilters,
    ) -> Result<Vec<CatalogEntry>, StoreError> {
        Ok(self
            .newest_first(|e| {
                e.base_image_id == base_image_id
                    && e.flavour == filters.flavour
                    && e.matches_selection(filters)
            })
            .await)
    }
}
