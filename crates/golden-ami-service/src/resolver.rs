//! Golden AMI resolution
//!
//! A card that has never been resolved discovers its AMI through the flavour
//! index and is pinned to that AMI's base image. Later resolutions for the
//! same card follow the pinned base image lineage instead.

use std::sync::Arc;
use tracing::{error, info};

use crate::error::ResolveError;
use crate::models::{CardBaseRecord, SelectionFilters};
use crate::storage::AmiStore;

/// Stateless resolver over an [`AmiStore`]
#[derive(Clone)]
pub struct AmiResolver {
    store: Arc<dyn AmiStore>,
}

impl AmiResolver {
    pub fn new(store: Arc<dyn AmiStore>) -> Self {
        Self { store }
    }

    /// Resolve the golden AMI id for `card_id`.
    ///
    /// "Freshest" is the first entry in index order (largest expiry); the
    /// current time is not consulted.
    pub async fn resolve(
        &self,
        card_id: &str,
        filters: &SelectionFilters,
    ) -> Result<String, ResolveError> {
        info!("Retrieving golden AMI id for card {}", card_id);

        let pinned_base = self
            .store
            .get_base(card_id)
            .await
            .map_err(ResolveError::from_store)?;

        match pinned_base {
            None => self.resolve_first_time(card_id, filters).await,
            Some(base_image_id) => self.resolve_pinned(card_id, &base_image_id, filters).await,
        }
    }

    async fn resolve_first_time(
        &self,
        card_id: &str,
        filters: &SelectionFilters,
    ) -> Result<String, ResolveError> {
        let candidates = self
            .store
            .query_by_flavour(filters)
            .await
            .map_err(ResolveError::from_query)?;

        let Some(freshest) = candidates.into_iter().next() else {
            error!(
                "No matching AMI id found for provided parameters on card {}",
                card_id
            );
            return Err(ResolveError::NotFound);
        };

        let record = CardBaseRecord::new(
            card_id.to_string(),
            freshest.base_image_id,
            freshest.image_id.clone(),
        );
        self.store
            .put_base(&record)
            .await
            .map_err(ResolveError::from_store)?;

        info!(
            "Card {} pinned to base AMI {}, resolved {}",
            card_id, record.base_image_id, freshest.image_id
        );
        Ok(freshest.image_id)
    }

    async fn resolve_pinned(
        &self,
        card_id: &str,
        base_image_id: &str,
        filters: &SelectionFilters,
    ) -> Result<String, ResolveError> {
        let candidates = self
            .store
            .query_by_base(base_image_id, filters)
            .await
            .map_err(ResolveError::from_query)?;

        match candidates.into_iter().next() {
            Some(freshest) => {
                info!(
                    "Card {} resolved {} from base AMI {}",
                    card_id, freshest.image_id, base_image_id
                );
                Ok(freshest.image_id)
            }
            None => {
                error!(
                    "No matching AMI id found for base AMI {} on card {}",
                    base_image_id, card_id
                );
                Err(ResolveError::NotFound)
            }
        }
    }
}
