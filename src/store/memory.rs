//! In-memory dataset store for tests and library callers

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::error::{StoreError, StoreResult};
use super::traits::DatasetStore;
use super::types::{ClassValue, Identifier};

/// A single record: its identifier plus attribute values
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: Identifier,
    pub attributes: HashMap<String, String>,
}

impl Record {
    pub fn new(id: impl Into<Identifier>) -> Self {
        Self {
            id: id.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(attribute.into(), value.into());
        self
    }
}

/// A named table of records with a fixed set of attribute names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryDataset {
    pub attributes: BTreeSet<String>,
    pub records: Vec<Record>,
}

impl MemoryDataset {
    pub fn new<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
            records: Vec::new(),
        }
    }

    pub fn with_record(mut self, record: Record) -> Self {
        self.records.push(record);
        self
    }

    /// Build a dataset with one attribute from `(id, class)` pairs
    pub fn from_classes<I, K, V>(attribute: &str, rows: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Identifier>,
        V: Into<String>,
    {
        rows.into_iter().fold(Self::new([attribute]), |ds, (id, class)| {
            ds.with_record(Record::new(id).with(attribute, class))
        })
    }

    pub fn identifiers(&self) -> BTreeSet<Identifier> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }
}

/// A completed extraction, kept for inspection
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub dataset: String,
    pub output_name: String,
    pub identifiers: BTreeSet<Identifier>,
}

/// Dataset store backed by process memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    datasets: Arc<RwLock<HashMap<String, MemoryDataset>>>,
    extractions: Arc<RwLock<Vec<Extraction>>>,
    overwrite: bool,
    unavailable_outputs: Arc<RwLock<BTreeSet<String>>>,
    unavailable_classes: Arc<RwLock<BTreeSet<String>>>,
    lookups: Arc<RwLock<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace existing outputs instead of failing with `OutputAlreadyExists`
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub async fn insert(&self, name: impl Into<String>, dataset: MemoryDataset) {
        self.datasets.write().await.insert(name.into(), dataset);
    }

    pub async fn get(&self, name: &str) -> Option<MemoryDataset> {
        self.datasets.read().await.get(name).cloned()
    }

    /// Make extraction into `output_name` fail as if the store were down
    pub async fn fail_extraction_into(&self, output_name: impl Into<String>) {
        self.unavailable_outputs
            .write()
            .await
            .insert(output_name.into());
    }

    /// Make identifier lookups for `class` fail as if the store were down
    pub async fn fail_lookup_of(&self, class: impl Into<String>) {
        self.unavailable_classes.write().await.insert(class.into());
    }

    /// Extractions performed so far, in call order
    pub async fn extractions(&self) -> Vec<Extraction> {
        self.extractions.read().await.clone()
    }

    /// Number of `identifiers_where` calls served
    pub async fn lookup_count(&self) -> usize {
        *self.lookups.read().await
    }

    async fn dataset(&self, name: &str) -> StoreResult<MemoryDataset> {
        self.get(name)
            .await
            .ok_or_else(|| StoreError::DatasetNotFound(name.to_string()))
    }
}

fn require_attribute(name: &str, dataset: &MemoryDataset, attribute: &str) -> StoreResult<()> {
    if dataset.attributes.contains(attribute) {
        Ok(())
    } else {
        Err(StoreError::attribute_not_found(name, attribute))
    }
}

#[async_trait]
impl DatasetStore for MemoryStore {
    async fn distinct_values(
        &self,
        dataset: &str,
        attribute: &str,
    ) -> StoreResult<BTreeSet<ClassValue>> {
        let ds = self.dataset(dataset).await?;
        require_attribute(dataset, &ds, attribute)?;

        Ok(ds
            .records
            .iter()
            .filter_map(|r| r.attributes.get(attribute))
            .map(|v| ClassValue::new(v.as_str()))
            .collect())
    }

    async fn identifiers_where(
        &self,
        dataset: &str,
        attribute: &str,
        value: &ClassValue,
    ) -> StoreResult<BTreeSet<Identifier>> {
        *self.lookups.write().await += 1;
        if self.unavailable_classes.read().await.contains(value.as_str()) {
            return Err(StoreError::unavailable(format!(
                "lookup of class '{}' failed",
                value
            )));
        }
        let ds = self.dataset(dataset).await?;
        require_attribute(dataset, &ds, attribute)?;

        Ok(ds
            .records
            .iter()
            .filter(|r| r.attributes.get(attribute).map(String::as_str) == Some(value.as_str()))
            .map(|r| r.id.clone())
            .collect())
    }

    async fn extract_by_identifiers(
        &self,
        dataset: &str,
        identifiers: &BTreeSet<Identifier>,
        output_name: &str,
    ) -> StoreResult<()> {
        if self.unavailable_outputs.read().await.contains(output_name) {
            return Err(StoreError::unavailable(format!(
                "cannot write '{}'",
                output_name
            )));
        }

        let source = self.dataset(dataset).await?;
        let mut datasets = self.datasets.write().await;
        if datasets.contains_key(output_name) && !self.overwrite {
            return Err(StoreError::OutputAlreadyExists(output_name.to_string()));
        }

        let output = MemoryDataset {
            attributes: source.attributes.clone(),
            records: source
                .records
                .into_iter()
                .filter(|r| identifiers.contains(&r.id))
                .collect(),
        };
        datasets.insert(output_name.to_string(), output);
        drop(datasets);

        self.extractions.write().await.push(Extraction {
            dataset: dataset.to_string(),
            output_name: output_name.to_string(),
            identifiers: identifiers.clone(),
        });
        Ok(())
    }
}
