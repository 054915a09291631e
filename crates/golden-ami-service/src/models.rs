//! Data models for the Golden AMI service

use serde::{Deserialize, Serialize};

/// Pins a caller card to the base image lineage it first resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardBaseRecord {
    /// Caller-supplied card identifier (table hash key)
    pub card_id: String,

    /// Base AMI the resolved golden AMI was built from
    pub base_image_id: String,

    /// Golden AMI handed out on the first resolution
    pub resolved_image_id: String,
}

impl CardBaseRecord {
    pub fn new(card_id: String, base_image_id: String, resolved_image_id: String) -> Self {
        Self {
            card_id,
            base_image_id,
            resolved_image_id,
        }
    }
}

/// One candidate golden AMI in the catalog table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub image_id: String,

    /// Expiry timestamp (unix seconds); index sort key
    pub expiry: i64,

    pub flavour: String,
    pub base_image_id: String,
    pub platform: String,
    pub imds_version: String,
    pub account_id: String,
    pub region: String,
    pub active: bool,
}

impl CatalogEntry {
    /// Equality filters shared by both lookup paths; flavour is checked separately
    pub fn matches_selection(&self, filters: &SelectionFilters) -> bool {
        self.active
            && self.platform == filters.platform
            && self.imds_version == filters.imds_version
            && self.account_id == filters.account_id
            && self.region == filters.region
    }
}

/// Selection attributes supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionFilters {
    pub platform: String,
    pub flavour: String,
    pub region: String,
    pub account_id: String,
    pub imds_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> CatalogEntry {
        CatalogEntry {
            image_id: "ami-of1234567f".to_string(),
            expiry: 1704453378,
            flavour: "Golden-AMI-ABC-Cloud".to_string(),
            base_image_id: "ami-123456ef".to_string(),
            platform: "Linux/UNIX".to_string(),
            imds_version: "v1.0".to_string(),
            account_id: "12345678901".to_string(),
            region: "us-east-1".to_string(),
            active: true,
        }
    }

    fn filters() -> SelectionFilters {
        SelectionFilters {
            platform: "Linux/UNIX".to_string(),
            flavour: "Golden-AMI-ABC-Cloud".to_string(),
            region: "us-east-1".to_string(),
            account_id: "12345678901".to_string(),
            imds_version: "v1.0".to_string(),
        }
    }

    #[test]
    fn test_matches_selection() {
        assert!(entry().matches_selection(&filters()));

        let mut other_region = filters();
        other_region.region = "eu-west-1".to_string();
        assert!(!entry().matches_selection(&other_region));
    }

    #[test]
    fn test_inactive_entry_never_matches() {
        let mut inactive = entry();
        inactive.active = false;
        assert!(!inactive.matches_selection(&filters()));
    }

    #[test]
    fn test_flavour_not_part_of_selection_match() {
        let mut other_flavour = filters();
        other_flavour.flavour = "Golden-AMI-ABC-IND".to_string();
        assert!(entry().matches_selection(&other_flavour));
    }
}
