//! One complete split run: enumerate, split per class, aggregate, extract

use futures::stream::{self, StreamExt, TryStreamExt};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use super::aggregator::{materialize, ClassSummary, OutputNames, PartitionAggregator};
use super::enumerator::ClassEnumerator;
use super::percent::TrainingPercent;
use super::splitter::StratifiedSplitter;
use crate::error::{Result, SplitError};
use crate::store::{ClassValue, DatasetStore, Identifier};

fn default_concurrency() -> usize {
    1
}

/// Everything needed to run one split
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRequest {
    /// Input dataset reference
    pub input: String,
    /// Grouping attribute holding the class of each record
    pub column: String,
    pub outputs: OutputNames,
    #[serde(default)]
    pub percent: TrainingPercent,
    /// Maximum number of per-class lookups in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl SplitRequest {
    pub fn new(
        input: impl Into<String>,
        column: impl Into<String>,
        training: impl Into<String>,
        validation: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            column: column.into(),
            outputs: OutputNames::new(training, validation),
            percent: TrainingPercent::default(),
            concurrency: default_concurrency(),
        }
    }

    pub fn with_percent(mut self, percent: TrainingPercent) -> Self {
        self.percent = percent;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Reject requests that cannot produce two distinct outputs, or whose
    /// outputs would replace the input while it is still being read.
    ///
    /// Names are compared as given; callers working with file paths should
    /// normalize them first.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("input", &self.input),
            ("column", &self.column),
            ("training output", &self.outputs.training),
            ("validation output", &self.outputs.validation),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(SplitError::invalid_request(format!("{} must not be empty", name)));
            }
        }
        for (name, output) in [
            ("training", &self.outputs.training),
            ("validation", &self.outputs.validation),
        ] {
            if *output == self.input {
                return Err(SplitError::invalid_request(format!(
                    "{} output '{}' is the input dataset",
                    name, output
                )));
            }
        }
        if self.outputs.training == self.outputs.validation {
            return Err(SplitError::invalid_request(
                "training and validation outputs must have different names",
            ));
        }
        if self.concurrency == 0 {
            return Err(SplitError::invalid_request("concurrency must be at least 1"));
        }
        Ok(())
    }
}

/// What a run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSummary {
    pub input: String,
    pub column: String,
    pub percent: TrainingPercent,
    pub outputs: OutputNames,
    pub training_records: usize,
    pub validation_records: usize,
    pub classes: Vec<ClassSummary>,
}

/// Run a stratified split against `store`, drawing randomness from `rng`
pub async fn run_split<S, R>(store: &S, request: &SplitRequest, rng: &mut R) -> Result<SplitSummary>
where
    S: DatasetStore + ?Sized,
    R: Rng + ?Sized,
{
    request.validate()?;
    debug!(
        "Splitting '{}' by '{}' at {} training",
        request.input, request.column, request.percent
    );

    let classes = ClassEnumerator::new(store)
        .enumerate(&request.input, &request.column)
        .await?;
    if classes.is_empty() {
        warn!(
            "No classes found in column '{}'; both outputs will be empty",
            request.column
        );
    }

    info!("Selecting records for each class...");
    let splitter = StratifiedSplitter::new(request.percent);
    let mut aggregator = PartitionAggregator::new();

    if request.concurrency > 1 {
        let memberships = fetch_concurrently(store, request, splitter, classes).await?;
        for (class, identifiers) in memberships {
            aggregator.add(splitter.split(class, identifiers, rng));
        }
    } else {
        for class in &classes {
            let split = splitter
                .select(store, &request.input, &request.column, class, rng)
                .await?;
            aggregator.add(split);
        }
    }

    let partition = aggregator.finish()?;
    materialize(store, &request.input, &partition, &request.outputs).await?;

    info!(
        "Divided data in <{}> and <{}>",
        request.outputs.training, request.outputs.validation
    );

    Ok(SplitSummary {
        input: request.input.clone(),
        column: request.column.clone(),
        percent: request.percent,
        outputs: request.outputs.clone(),
        training_records: partition.training.len(),
        validation_records: partition.validation.len(),
        classes: partition.classes,
    })
}

/// Look up class memberships with bounded concurrency, yielding them in class order
async fn fetch_concurrently<S: DatasetStore + ?Sized>(
    store: &S,
    request: &SplitRequest,
    splitter: StratifiedSplitter,
    classes: BTreeSet<ClassValue>,
) -> Result<Vec<(ClassValue, BTreeSet<Identifier>)>> {
    stream::iter(classes)
        .map(move |class| async move {
            let identifiers = splitter
                .fetch(store, &request.input, &request.column, &class)
                .await?;
            Ok::<_, SplitError>((class, identifiers))
        })
        .buffered(request.concurrency)
        .try_collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryDataset, MemoryStore};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    async fn store_with(rows: Vec<(u64, &str)>) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert("points", MemoryDataset::from_classes("class", rows))
            .await;
        store
    }

    fn request(percent: i64) -> SplitRequest {
        SplitRequest::new("points", "class", "train", "valid")
            .with_percent(TrainingPercent::new(percent).unwrap())
    }

    #[tokio::test]
    async fn test_two_classes_at_half() {
        let store = store_with(vec![(1, "a"), (2, "a"), (3, "a"), (4, "a"), (5, "b")]).await;
        let mut rng = StdRng::seed_from_u64(11);

        let summary = run_split(&store, &request(50), &mut rng).await.unwrap();

        // class a: 2/2, class b: round-half-even(0.5) = 0
        assert_eq!(summary.training_records, 2);
        assert_eq!(summary.validation_records, 3);
        let b = summary.classes.iter().find(|c| c.class.as_str() == "b").unwrap();
        assert_eq!((b.training, b.validation), (0, 1));
        assert!(store
            .get("valid")
            .await
            .unwrap()
            .identifiers()
            .contains(&Identifier::from(5u64)));
    }

    #[tokio::test]
    async fn test_zero_classes_writes_empty_outputs() {
        let store = MemoryStore::new();
        store.insert("points", MemoryDataset::new(["class"])).await;
        let mut rng = StdRng::seed_from_u64(0);

        let summary = run_split(&store, &request(30), &mut rng).await.unwrap();

        assert_eq!(summary.training_records + summary.validation_records, 0);
        assert!(summary.classes.is_empty());
        assert!(store.get("train").await.unwrap().records.is_empty());
        assert!(store.get("valid").await.unwrap().records.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_request_touches_nothing() {
        let store = store_with(vec![(1, "a")]).await;
        let mut rng = StdRng::seed_from_u64(0);
        let same_names = SplitRequest::new("points", "class", "out", "out");

        let err = run_split(&store, &same_names, &mut rng).await.unwrap_err();
        assert!(matches!(err, SplitError::InvalidRequest { .. }));
        assert_eq!(store.lookup_count().await, 0);
        assert!(store.extractions().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_column_aborts_before_extraction() {
        let store = store_with(vec![(1, "a")]).await;
        let mut rng = StdRng::seed_from_u64(0);
        let req = SplitRequest::new("points", "landuse", "train", "valid");

        let err = run_split(&store, &req, &mut rng).await.unwrap_err();
        assert!(matches!(err, SplitError::AttributeNotFound { .. }));
        assert!(store.extractions().await.is_empty());
    }

    #[tokio::test]
    async fn test_existing_output_is_propagated() {
        let store = store_with(vec![(1, "a"), (2, "b")]).await;
        store.insert("train", MemoryDataset::new(["class"])).await;
        let mut rng = StdRng::seed_from_u64(0);

        let err = run_split(&store, &request(30), &mut rng).await.unwrap_err();
        assert!(matches!(err, SplitError::OutputAlreadyExists { ref output } if output == "train"));
    }

    #[tokio::test]
    async fn test_concurrent_lookups_match_sequential_run() {
        let rows: Vec<(u64, &str)> = (1..=60)
            .map(|i| (i, ["a", "b", "c", "d"][(i % 4) as usize]))
            .collect();

        let sequential = store_with(rows.clone()).await;
        let concurrent = store_with(rows).await;

        let seq = run_split(&sequential, &request(40), &mut StdRng::seed_from_u64(8))
            .await
            .unwrap();
        let par = run_split(
            &concurrent,
            &request(40).with_concurrency(4),
            &mut StdRng::seed_from_u64(8),
        )
        .await
        .unwrap();

        assert_eq!(seq, par);
        assert_eq!(concurrent.lookup_count().await, 4);
        assert_eq!(
            sequential.get("train").await.unwrap().identifiers(),
            concurrent.get("train").await.unwrap().identifiers()
        );
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let req: SplitRequest = serde_json::from_str(
            r#"{"input":"p.csv","column":"class","outputs":{"training":"t.csv","validation":"v.csv"}}"#,
        )
        .unwrap();
        assert_eq!(req.percent, TrainingPercent::DEFAULT);
        assert_eq!(req.concurrency, 1);
        assert!(req.validate().is_ok());
    }

    #[tokio::test]
    async fn test_output_naming_the_input_is_rejected() {
        let store = store_with(vec![(1, "a"), (2, "a"), (3, "a"), (4, "a")])
            .await
            .with_overwrite(true);
        let mut rng = StdRng::seed_from_u64(0);

        for req in [
            SplitRequest::new("points", "class", "points", "valid"),
            SplitRequest::new("points", "class", "train", "points"),
        ] {
            let err = run_split(&store, &req, &mut rng).await.unwrap_err();
            assert!(matches!(err, SplitError::InvalidRequest { ref message } if message.contains("input dataset")));
        }

        assert_eq!(store.get("points").await.unwrap().records.len(), 4);
        assert!(store.extractions().await.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_failure_aborts_before_extraction() {
        for concurrency in [1, 3] {
            let store = store_with(vec![(1, "a"), (2, "b"), (3, "c"), (4, "c")]).await;
            store.fail_lookup_of("b").await;
            let mut rng = StdRng::seed_from_u64(0);

            let err = run_split(&store, &request(50).with_concurrency(concurrency), &mut rng)
                .await
                .unwrap_err();

            assert!(
                matches!(err, SplitError::StoreUnavailable { .. }),
                "concurrency {}: {:?}",
                concurrency,
                err
            );
            assert!(store.extractions().await.is_empty());
            assert!(store.get("train").await.is_none());
            assert!(store.get("valid").await.is_none());
        }
    }

    #[test]
    fn test_zero_concurrency_is_invalid() {
        let req = request(30).with_concurrency(0);
        assert!(matches!(req.validate(), Err(SplitError::InvalidRequest { .. })));
    }
}
