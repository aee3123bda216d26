//! Class discovery

use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::error::Result;
use crate::store::{ClassValue, DatasetStore};

/// Lists the distinct values of the grouping attribute of a dataset
pub struct ClassEnumerator<'a, S: DatasetStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: DatasetStore + ?Sized> ClassEnumerator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Distinct classes in lexicographic order
    pub async fn enumerate(&self, dataset: &str, attribute: &str) -> Result<BTreeSet<ClassValue>> {
        info!("Getting classes...");
        let classes = self.store.distinct_values(dataset, attribute).await?;
        debug!(
            "Found {} classes in column '{}' of '{}'",
            classes.len(),
            attribute,
            dataset
        );
        Ok(classes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SplitError;
    use crate::store::{MemoryDataset, MemoryStore};

    #[tokio::test]
    async fn test_enumerates_each_class_once() {
        let store = MemoryStore::new();
        store
            .insert(
                "samples",
                MemoryDataset::from_classes("label", [(1u64, "b"), (2, "a"), (3, "b"), (4, "a")]),
            )
            .await;

        let classes = ClassEnumerator::new(&store)
            .enumerate("samples", "label")
            .await
            .unwrap();
        assert_eq!(
            classes.into_iter().collect::<Vec<_>>(),
            vec![ClassValue::from("a"), ClassValue::from("b")]
        );
    }

    #[tokio::test]
    async fn test_missing_attribute_aborts() {
        let store = MemoryStore::new();
        store
            .insert("samples", MemoryDataset::from_classes("label", [(1u64, "a")]))
            .await;

        let err = ClassEnumerator::new(&store)
            .enumerate("samples", "kind")
            .await
            .unwrap_err();
        assert!(matches!(err, SplitError::AttributeNotFound { .. }));
    }
}
