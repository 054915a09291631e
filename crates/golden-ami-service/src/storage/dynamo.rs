//! DynamoDB-backed table accessor

use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_dynamodb::{
    config::{retry::RetryConfig, Region},
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    types::{AttributeValue, ReturnConsumedCapacity},
    Client,
};
use services_common::{retry_transient, RetryPolicy};
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

use super::{AmiStore, BASE_IMAGE_INDEX, FLAVOUR_INDEX};
use crate::error::StoreError;
use crate::models::{CardBaseRecord, CatalogEntry, SelectionFilters};

// Card table attributes
const ATTR_CARD: &str = "KR_CARD";
const ATTR_BASE_AMI: &str = "BaseAMIID";
const ATTR_AMI: &str = "AMIID";

// Catalog table attributes
const ATTR_EXPIRY: &str = "ExpiryDate";
const ATTR_FLAVOUR: &str = "AMIFlavour";
const ATTR_PLATFORM: &str = "Platform";
const ATTR_IMDS: &str = "IMDSVersion";
const ATTR_ACCOUNT: &str = "EC2Account";
const ATTR_REGION: &str = "EC2Region";
const ATTR_ACTIVE: &str = "AMIActive";

const SELECTION_FILTER: &str = "Platform = :platform AND IMDSVersion = :imdsver \
     AND EC2Account = :account AND EC2Region = :region AND AMIActive = :is_active";

type Item = HashMap<String, AttributeValue>;

/// Accessor over the card table and the golden AMI catalog table
pub struct DynamoStore {
    client: Client,
    card_table: String,
    catalog_table: String,
    retry: RetryPolicy,
}

impl DynamoStore {
    pub fn new(client: Client, card_table: String, catalog_table: String, retry: RetryPolicy) -> Self {
        Self {
            client,
            card_table,
            catalog_table,
            retry,
        }
    }

    /// Build an SDK client for `region`, optionally against a local endpoint
    pub async fn connect(
        region: &str,
        endpoint_url: Option<&str>,
        card_table: String,
        catalog_table: String,
        retry: RetryPolicy,
    ) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
        if let Some(url) = endpoint_url {
            loader = loader.endpoint_url(url);
        }
        let sdk_config = loader.load().await;

        info!(
            "DynamoDB client ready (region {}, card table {}, catalog table {})",
            region, card_table, catalog_table
        );

        Self::from_sdk_config(&sdk_config, card_table, catalog_table, retry)
    }

    /// Build the client from a loaded SDK config.
    ///
    /// SDK retries are disabled; `retry` is the only retry budget applied.
    pub fn from_sdk_config(
        sdk_config: &SdkConfig,
        card_table: String,
        catalog_table: String,
        retry: RetryPolicy,
    ) -> Self {
        let client_config = aws_sdk_dynamodb::config::Builder::from(sdk_config)
            .retry_config(RetryConfig::standard().with_max_attempts(1))
            .build();

        Self::new(Client::from_conf(client_config), card_table, catalog_table, retry)
    }

    async fn get_base_once(&self, card_id: &str) -> Result<Option<String>, StoreError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.card_table)
            .key(ATTR_CARD, AttributeValue::S(card_id.to_string()))
            .send()
            .await
            .map_err(|e| classify(&self.card_table, e))?;

        let Some(item) = output.item() else {
            return Ok(None);
        };

        if !item.contains_key(ATTR_BASE_AMI) {
            warn!(
                "Card {} in {} has no {}; treating it as new",
                card_id, self.card_table, ATTR_BASE_AMI
            );
            return Ok(None);
        }

        string_attr(item, ATTR_BASE_AMI)
            .map(Some)
            .map_err(|message| StoreError::Malformed {
                table: self.card_table.clone(),
                message,
            })
    }

    async fn put_base_once(&self, record: &CardBaseRecord) -> Result<(), StoreError> {
        let output = self
            .client
            .put_item()
            .table_name(&self.card_table)
            .item(ATTR_CARD, AttributeValue::S(record.card_id.clone()))
            .item(ATTR_BASE_AMI, AttributeValue::S(record.base_image_id.clone()))
            .item(ATTR_AMI, AttributeValue::S(record.resolved_image_id.clone()))
            .return_consumed_capacity(ReturnConsumedCapacity::Total)
            .send()
            .await
            .map_err(|e| classify(&self.card_table, e))?;

        debug!(
            "Put card {} into {}, consumed capacity: {:?}",
            record.card_id,
            self.card_table,
            output.consumed_capacity()
        );
        Ok(())
    }

    /// Run one index query to completion, following pagination
    async fn query_once(
        &self,
        index: &str,
        key_attr: &str,
        key_value: &str,
        filters: &SelectionFilters,
        with_flavour_filter: bool,
    ) -> Result<Vec<CatalogEntry>, StoreError> {
        let mut filter_expression = SELECTION_FILTER.to_string();
        let mut query = self
            .client
            .query()
            .table_name(&self.catalog_table)
            .index_name(index)
            .key_condition_expression(format!("{} = :key", key_attr))
            .expression_attribute_values(":key", AttributeValue::S(key_value.to_string()))
            .expression_attribute_values(":platform", AttributeValue::S(filters.platform.clone()))
            .expression_attribute_values(":imdsver", AttributeValue::S(filters.imds_version.clone()))
            .expression_attribute_values(":account", AttributeValue::S(filters.account_id.clone()))
            .expression_attribute_values(":region", AttributeValue::S(filters.region.clone()))
            .expression_attribute_values(":is_active", AttributeValue::Bool(true))
            .scan_index_forward(false);

        if with_flavour_filter {
            filter_expression.push_str(" AND AMIFlavour = :flavour");
            query = query
                .expression_attribute_values(":flavour", AttributeValue::S(filters.flavour.clone()));
        }
        let query = query.filter_expression(filter_expression);

        let mut entries = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let output = query
                .clone()
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| classify(&self.catalog_table, e))?;

            for item in output.items() {
                let entry = catalog_entry(item).map_err(|message| StoreError::Malformed {
                    table: self.catalog_table.clone(),
                    message,
                })?;
                entries.push(entry);
            }

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        debug!(
            "Query on {}/{} for {} returned {} entries",
            self.catalog_table,
            index,
            key_value,
            entries.len()
        );
        Ok(entries)
    }
}

#[async_trait]
impl AmiStore for DynamoStore {
    async fn get_base(&self, card_id: &str) -> Result<Option<String>, StoreError> {
        info!("Retrieving base AMI for card {}", card_id);

        let result = retry_transient(&self.retry, "get_item", || self.get_base_once(card_id))
            .await
            .map_err(StoreError::from);

        match result {
            Err(StoreError::TableNotFound(table)) => {
                warn!("Card table {} does not exist; treating card {} as new", table, card_id);
                Ok(None)
            }
            Ok(None) => {
                info!("Card {} is not available in {}", card_id, self.card_table);
                Ok(None)
            }
            Err(err) => {
                error!("Error retrieving base AMI for card {}: {}", card_id, err);
                Err(err)
            }
            other => other,
        }
    }

    async fn put_base(&self, record: &CardBaseRecord) -> Result<(), StoreError> {
        info!("Attempting to put card {} in {}", record.card_id, self.card_table);

        retry_transient(&self.retry, "put_item", || self.put_base_once(record))
            .await
            .map_err(|e| {
                let err = StoreError::from(e);
                error!(
                    "Error updating {} with {}, {}, {}: {}",
                    self.card_table, record.card_id, record.base_image_id, record.resolved_image_id, err
                );
                err
            })
    }

    async fn query_by_flavour(
        &self,
        filters: &SelectionFilters,
    ) -> Result<Vec<CatalogEntry>, StoreError> {
        retry_transient(&self.retry, "query by flavour", || {
            self.query_once(FLAVOUR_INDEX, ATTR_FLAVOUR, &filters.flavour, filters, false)
        })
        .await
        .map_err(StoreError::from)
    }

    async fn query_by_base(
        &self,
        base_image_id: &str,
        filters: &SelectionFilters,
    ) -> Result<Vec<CatalogEntry>, StoreError> {
        retry_transient(&self.retry, "query by base AMI", || {
            self.query_once(BASE_IMAGE_INDEX, ATTR_BASE_AMI, base_image_id, filters, true)
        })
        .await
        .map_err(StoreError::from)
    }
}

/// Sort an SDK failure into throttling, missing table, or everything else
fn classify<E, R>(table: &str, err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err.code() {
        Some("ProvisionedThroughputExceededException")
        | Some("RequestLimitExceeded")
        | Some("ThrottlingException") => StoreError::Throttled {
            table: table.to_string(),
            message: err.message().unwrap_or("throughput exceeded").to_string(),
        },
        Some("ResourceNotFoundException") => StoreError::TableNotFound(table.to_string()),
        _ => StoreError::Internal(DisplayErrorContext(&err).to_string()),
    }
}

fn string_attr(item: &Item, name: &str) -> Result<String, String> {
    match item.get(name) {
        Some(AttributeValue::S(value)) => Ok(value.clone()),
        Some(other) => Err(format!("attribute {} is not a string: {:?}", name, other)),
        None => Err(format!("attribute {} is missing", name)),
    }
}

fn optional_string_attr(item: &Item, name: &str) -> String {
    match item.get(name) {
        Some(AttributeValue::S(value)) => value.clone(),
        _ => String::new(),
    }
}

fn catalog_entry(item: &Item) -> Result<CatalogEntry, String> {
    let expiry = match item.get(ATTR_EXPIRY) {
        Some(AttributeValue::N(raw)) => raw
            .parse::<i64>()
            .map_err(|e| format!("attribute {} is not numeric ({}): {}", ATTR_EXPIRY, raw, e))?,
        Some(other) => return Err(format!("attribute {} is not a number: {:?}", ATTR_EXPIRY, other)),
        None => return Err(format!("attribute {} is missing", ATTR_EXPIRY)),
    };

    Ok(CatalogEntry {
        image_id: string_attr(item, ATTR_AMI)?,
        expiry,
        flavour: optional_string_attr(item, ATTR_FLAVOUR),
        base_image_id: string_attr(item, ATTR_BASE_AMI)?,
        platform: optional_string_attr(item, ATTR_PLATFORM),
        imds_version: optional_string_attr(item, ATTR_IMDS),
        account_id: optional_string_attr(item, ATTR_ACCOUNT),
        region: optional_string_attr(item, ATTR_REGION),
        active: matches!(item.get(ATTR_ACTIVE), Some(AttributeValue::Bool(true))),
    })
}
