//! Merging per-class selections and materializing the two outputs

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, trace};

use super::splitter::ClassSplit;
use crate::error::{Result, SplitError};
use crate::store::{ClassValue, DatasetStore, Identifier};

/// Record counts of one class after splitting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSummary {
    pub class: ClassValue,
    pub size: usize,
    pub training: usize,
    pub validation: usize,
}

/// The global training and validation identifier sets of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub training: BTreeSet<Identifier>,
    pub validation: BTreeSet<Identifier>,
    pub classes: Vec<ClassSummary>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.training.len() + self.validation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Names of the datasets the partition is written to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputNames {
    pub training: String,
    pub validation: String,
}

impl OutputNames {
    pub fn new(training: impl Into<String>, validation: impl Into<String>) -> Self {
        Self {
            training: training.into(),
            validation: validation.into(),
        }
    }
}

/// Unions class splits into a partition and hands it to the store
#[derive(Debug, Default)]
pub struct PartitionAggregator {
    partition: Partition,
}

impl PartitionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one class's selections
    pub fn add(&mut self, split: ClassSplit) {
        self.partition.classes.push(ClassSummary {
            class: split.class,
            size: split.training.len() + split.validation.len(),
            training: split.training.len(),
            validation: split.validation.len(),
        });
        self.partition.training.extend(split.training);
        self.partition.validation.extend(split.validation);
    }

    /// Finish aggregation.
    ///
    /// Fails if a record ended up in both sets, which only happens when the
    /// store reports the same identifier under two classes.
    pub fn finish(self) -> Result<Partition> {
        let partition = self.partition;
        if let Some(shared) = partition.training.intersection(&partition.validation).next() {
            return Err(SplitError::internal(format!(
                "record '{}' selected for both training and validation",
                shared
            )));
        }
        Ok(partition)
    }

    /// Aggregate a whole sequence of class splits
    pub fn aggregate<I>(splits: I) -> Result<Partition>
    where
        I: IntoIterator<Item = ClassSplit>,
    {
        let mut aggregator = Self::new();
        for split in splits {
            aggregator.add(split);
        }
        aggregator.finish()
    }
}

/// Write the training set, then the validation set.
///
/// Empty sets are still extracted so both outputs always exist. If the
/// training extraction fails the validation output is not attempted; nothing
/// already written is rolled back.
pub async fn materialize<S: DatasetStore + ?Sized>(
    store: &S,
    dataset: &str,
    partition: &Partition,
    outputs: &OutputNames,
) -> Result<()> {
    info!("Extracting training and validation records...");
    trace!("Training identifiers: {:?}", partition.training);
    store
        .extract_by_identifiers(dataset, &partition.training, &outputs.training)
        .await?;

    trace!("Validation identifiers: {:?}", partition.validation);
    store
        .extract_by_identifiers(dataset, &partition.validation, &outputs.validation)
        .await?;
    Ok(())
}
