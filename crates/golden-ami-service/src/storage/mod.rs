//! Table accessors for the card cache and the golden AMI catalog

mod dynamo;
mod memory;

pub use dynamo::DynamoStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{CardBaseRecord, CatalogEntry, SelectionFilters};

/// Secondary index ordering catalog entries by (flavour, expiry)
pub const FLAVOUR_INDEX: &str = "AMIFlavour-ExpiryDate-index";

/// Secondary index ordering catalog entries by (base AMI, expiry)
pub const BASE_IMAGE_INDEX: &str = "BaseAMIID-ExpiryDate-index";

/// Typed access to the two tables.
///
/// Transient throttling is absorbed by implementations; callers only see
/// success, a permanent failure, or [`StoreError::RetriesExhausted`].
#[async_trait]
pub trait AmiStore: Send + Sync {
    /// Base AMI pinned to `card_id`, or `None` if the card was never resolved
    async fn get_base(&self, card_id: &str) -> Result<Option<String>, StoreError>;

    /// Upsert the card record, overwriting any previous one
    async fn put_base(&self, record: &CardBaseRecord) -> Result<(), StoreError>;

    /// Active entries of `filters.flavour` matching the selection, newest expiry first
    async fn query_by_flavour(
        &self,
        filters: &SelectionFilters,
    ) -> Result<Vec<CatalogEntry>, StoreError>;

    /// Active entries built from `base_image_id` matching the selection and
    /// flavour, newest expiry first
    async fn query_by_base(
        &self,
        base_image_id: &str,
        filters: &SelectionFilters,
    ) -> Result<Vec<CatalogEntry>, StoreError>;
}
