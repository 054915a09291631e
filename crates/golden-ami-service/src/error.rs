//! Error types for the accessor and the resolver

use services_common::{RetryError, Transient};
use thiserror::Error;

/// Failures reported by an [`AmiStore`](crate::storage::AmiStore)
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Throughput exceeded on table {table}: {message}")]
    Throttled { table: String, message: String },

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Malformed item in table {table}: {message}")]
    Malformed { table: String, message: String },

    #[error("Store error: {0}")]
    Internal(String),

    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<StoreError> },
}

impl Transient for StoreError {
    fn is_transient(&self) -> bool {
        matches!(self, StoreError::Throttled { .. })
    }
}

impl From<RetryError<StoreError>> for StoreError {
    fn from(err: RetryError<StoreError>) -> Self {
        match err {
            RetryError::Exhausted { attempts, last } => StoreError::RetriesExhausted {
                attempts,
                last: Box::new(last),
            },
            RetryError::Fatal(err) => err,
        }
    }
}

/// Outcome of a failed resolution, mapped one-to-one onto HTTP statuses
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("No matching ami id found for provided parameters")]
    NotFound,

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Store throttled beyond retry budget: {0}")]
    RetriesExhausted(String),
}

impl ResolveError {
    /// Map a failed catalog query. A missing catalog table means nothing can match.
    pub fn from_query(err: StoreError) -> Self {
        match err {
            StoreError::TableNotFound(_) => ResolveError::NotFound,
            other => Self::from_store(other),
        }
    }

    /// Map any other store failure (lookups and write-back)
    pub fn from_store(err: StoreError) -> Self {
        match err {
            err @ StoreError::RetriesExhausted { .. } => {
                ResolveError::RetriesExhausted(err.to_string())
            }
            other => ResolveError::Internal(other.to_string()),
        }
    }
}
