//! Resolution behaviour against the in-memory store and failure-injecting wrappers

use async_trait::async_trait;
use golden_ami_service::{
    AmiResolver, AmiStore, CardBaseRecord, CatalogEntry, MemoryStore, ResolveError,
    SelectionFilters, StoreError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn entry(image_id: &str, base: &str, flavour: &str, expiry: i64) -> CatalogEntry {
    CatalogEntry {
        image_id: image_id.to_string(),
        expiry,
        flavour: flavour.to_string(),
        base_image_id: base.to_string(),
        platform: "Linux/UNIX".to_string(),
        imds_version: "v1.0".to_string(),
        account_id: "12345678901".to_string(),
        region: "us-east-1".to_string(),
        active: true,
    }
}

fn filters(flavour: &str) -> SelectionFilters {
    SelectionFilters {
        platform: "Linux/UNIX".to_string(),
        flavour: flavour.to_string(),
        region: "us-east-1".to_string(),
        account_id: "12345678901".to_string(),
        imds_version: "v1.0".to_string(),
    }
}

/// Wraps a store, counting writes and optionally failing them or every call
struct FaultyStore {
    inner: MemoryStore,
    fail_writes: bool,
    fail_everything: Option<fn() -> StoreError>,
    writes: AtomicUsize,
}

impl FaultyStore {
    fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_writes: false,
            fail_everything: None,
            writes: AtomicUsize::new(0),
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        match self.fail_everything {
            Some(make) => Err(make()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AmiStore for FaultyStore {
    async fn get_base(&self, card_id: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        self.inner.get_base(card_id).await
    }

    async fn put_base(&self, record: &CardBaseRecord) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(StoreError::TableNotFound("base-ami-test-table".to_string()));
        }
        self.inner.put_base(record).await
    }

    async fn query_by_flavour(
        &self,
        filters: &SelectionFilters,
    ) -> Result<Vec<CatalogEntry>, StoreError> {
        self.check()?;
        self.inner.query_by_flavour(filters).await
    }

    async fn query_by_base(
        &self,
        base_image_id: &str,
        filters: &SelectionFilters,
    ) -> Result<Vec<CatalogEntry>, StoreError> {
        self.check()?;
        self.inner.query_by_base(base_image_id, filters).await
    }
}

#[tokio::test]
async fn test_first_resolution_returns_single_match() {
    let store = Arc::new(MemoryStore::with_catalog(vec![entry(
        "ami-of1234567f",
        "ami-123456ef",
        "Golden-AMI-ABC-Cloud",
        1704453378,
    )]));
    let resolver = AmiResolver::new(store.clone());

    let image_id = resolver
        .resolve("KR-56789", &filters("Golden-AMI-ABC-Cloud"))
        .await
        .unwrap();

    assert_eq!(image_id, "ami-of1234567f");

    let record = store.card_record("KR-56789").await.expect("card not pinned");
    assert_eq!(record.base_image_id, "ami-123456ef");
    assert_eq!(record.resolved_image_id, "ami-of1234567f");
}

#[tokio::test]
async fn test_first_resolution_picks_largest_expiry() {
    let store = Arc::new(MemoryStore::with_catalog(vec![
        entry("ami-old", "ami-base-a", "Cloud", 1_600_000_000),
        entry("ami-newest", "ami-base-b", "Cloud", 1_800_000_000),
        entry("ami-mid", "ami-base-a", "Cloud", 1_700_000_000),
    ]));
    let resolver = AmiResolver::new(store.clone());

    let image_id = resolver.resolve("KR-1", &filters("Cloud")).await.unwrap();

    assert_eq!(image_id, "ami-newest");
    assert_eq!(
        store.card_record("KR-1").await.unwrap().base_image_id,
        "ami-base-b"
    );
}

#[tokio::test]
async fn test_expired_entries_still_ranked_by_stored_expiry() {
    // Both expiries are in the past; the later one still wins
    let store = Arc::new(MemoryStore::with_catalog(vec![
        entry("ami-2020", "ami-base", "Cloud", 1_577_836_800),
        entry("ami-2021", "ami-base", "Cloud", 1_609_459_200),
    ]));
    let resolver = AmiResolver::new(store);

    assert_eq!(
        resolver.resolve("KR-1", &filters("Cloud")).await.unwrap(),
        "ami-2021"
    );
}

#[tokio::test]
async fn test_inactive_entries_are_skipped() {
    let mut inactive = entry("ami-inactive", "ami-base", "Cloud", 2_000_000_000);
    inactive.active = false;
    let store = Arc::new(MemoryStore::with_catalog(vec![
        inactive,
        entry("ami-active", "ami-base", "Cloud", 1_000_000_000),
    ]));
    let resolver = AmiResolver::new(store);

    assert_eq!(
        resolver.resolve("KR-1", &filters("Cloud")).await.unwrap(),
        "ami-active"
    );
}

#[tokio::test]
async fn test_pinned_card_follows_base_lineage() {
    let store = Arc::new(MemoryStore::with_catalog(vec![
        entry("ami-lineage-old", "ami-pinned", "Cloud", 100),
        entry("ami-lineage-new", "ami-pinned", "Cloud", 200),
        entry("ami-other-lineage", "ami-other", "Cloud", 900),
    ]));
    store
        .put_base(&CardBaseRecord::new(
            "KR-2".to_string(),
            "ami-pinned".to_string(),
            "ami-lineage-old".to_string(),
        ))
        .await
        .unwrap();
    let resolver = AmiResolver::new(store.clone());

    let image_id = resolver.resolve("KR-2", &filters("Cloud")).await.unwrap();

    // Newer lineage entry wins, but the record is not rewritten
    assert_eq!(image_id, "ami-lineage-new");
    let record = store.card_record("KR-2").await.unwrap();
    assert_eq!(record.resolved_image_id, "ami-lineage-old");
}

#[tokio::test]
async fn test_pinned_path_does_not_write_back() {
    let inner = MemoryStore::with_catalog(vec![entry("ami-1", "ami-base", "Cloud", 100)]);
    inner
        .put_base(&CardBaseRecord::new(
            "KR-3".to_string(),
            "ami-base".to_string(),
            "ami-1".to_string(),
        ))
        .await
        .unwrap();
    let store = Arc::new(FaultyStore::new(inner));
    let resolver = AmiResolver::new(store.clone());

    resolver.resolve("KR-3", &filters("Cloud")).await.unwrap();

    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_pinned_path_narrows_by_flavour() {
    let store = Arc::new(MemoryStore::with_catalog(vec![entry(
        "ami-cloud",
        "ami-base",
        "Cloud",
        100,
    )]));
    store
        .put_base(&CardBaseRecord::new(
            "KR-4".to_string(),
            "ami-base".to_string(),
            "ami-cloud".to_string(),
        ))
        .await
        .unwrap();
    let resolver = AmiResolver::new(store);

    let err = resolver.resolve("KR-4", &filters("IND")).await.unwrap_err();
    assert!(matches!(err, ResolveError::NotFound));
}

#[tokio::test]
async fn test_no_match_is_not_found_without_write_back() {
    let inner = MemoryStore::with_catalog(vec![entry(
        "ami-of1234567f",
        "ami-123456ef",
        "Golden-AMI-ABC-Cloud",
        1704453378,
    )]);
    let store = Arc::new(FaultyStore::new(inner));
    let resolver = AmiResolver::new(store.clone());

    let err = resolver
        .resolve("KR-111111", &filters("Golden-AMI-ABC-IND"))
        .await
        .unwrap_err();

    assert!(matches!(err, ResolveError::NotFound));
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    assert!(store.inner.card_record("KR-111111").await.is_none());
}

#[tokio::test]
async fn test_repeated_resolution_is_stable() {
    let store = Arc::new(MemoryStore::with_catalog(vec![
        entry("ami-a", "ami-base", "Cloud", 100),
        entry("ami-b", "ami-base", "Cloud", 200),
    ]));
    let resolver = AmiResolver::new(store);

    let first = resolver.resolve("KR-5", &filters("Cloud")).await.unwrap();
    let second = resolver.resolve("KR-5", &filters("Cloud")).await.unwrap();
    let third = resolver.resolve("KR-5", &filters("Cloud")).await.unwrap();

    assert_eq!(first, "ami-b");
    assert_eq!(second, first);
    assert_eq!(third, first);
}

#[tokio::test]
async fn test_failed_write_back_is_internal_error() {
    let inner = MemoryStore::with_catalog(vec![entry("ami-1", "ami-base", "Cloud", 100)]);
    let mut store = FaultyStore::new(inner);
    store.fail_writes = true;
    let resolver = AmiResolver::new(Arc::new(store));

    let err = resolver.resolve("KR-6", &filters("Cloud")).await.unwrap_err();
    assert!(matches!(err, ResolveError::Internal(_)));
}

#[tokio::test]
async fn test_store_failure_is_internal_error() {
    let mut store = FaultyStore::new(MemoryStore::new());
    store.fail_everything = Some(|| StoreError::Internal("credentials not found".to_string()));
    let resolver = AmiResolver::new(Arc::new(store));

    let err = resolver.resolve("KR-7", &filters("Cloud")).await.unwrap_err();
    assert!(matches!(err, ResolveError::Internal(_)));
}

#[tokio::test]
async fn test_exhausted_retries_surface_distinctly() {
    let mut store = FaultyStore::new(MemoryStore::new());
    store.fail_everything = Some(|| StoreError::RetriesExhausted {
        attempts: 5,
        last: Box::new(StoreError::Throttled {
            table: "golden-ami-table".to_string(),
            message: "throughput exceeded".to_string(),
        }),
    });
    let resolver = AmiResolver::new(Arc::new(store));

    let err = resolver.resolve("KR-8", &filters("Cloud")).await.unwrap_err();
    assert!(matches!(err, ResolveError::RetriesExhausted(_)));
}
