//! The dataset store seam
//!
//! The split core only ever talks to a store through these three operations,
//! so it has no knowledge of files, databases or external processes.

use async_trait::async_trait;
use std::collections::BTreeSet;

use super::error::StoreResult;
use super::types::{ClassValue, Identifier};

/// Read and extract operations the split core needs from a dataset store
#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// Distinct values of `attribute` across all records of `dataset`.
    ///
    /// Fails with `AttributeNotFound` if the attribute does not exist.
    async fn distinct_values(
        &self,
        dataset: &str,
        attribute: &str,
    ) -> StoreResult<BTreeSet<ClassValue>>;

    /// Identifiers of the records whose `attribute` equals `value`. May be empty.
    async fn identifiers_where(
        &self,
        dataset: &str,
        attribute: &str,
        value: &ClassValue,
    ) -> StoreResult<BTreeSet<Identifier>>;

    /// Create the dataset `output_name` holding exactly the given records
    async fn extract_by_identifiers(
        &self,
        dataset: &str,
        identifiers: &BTreeSet<Identifier>,
        output_name: &str,
    ) -> StoreResult<()>;
}
