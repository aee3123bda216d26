//! Per-class randomized splitting

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;
use tracing::{debug, trace};

use super::percent::TrainingPercent;
use crate::error::Result;
use crate::store::{ClassValue, DatasetStore, Identifier};

/// The training and validation selections of one class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSplit {
    pub class: ClassValue,
    pub training: Vec<Identifier>,
    pub validation: Vec<Identifier>,
}

impl ClassSplit {
    pub fn size(&self) -> usize {
        self.training.len() + self.validation.len()
    }
}

/// Splits each class independently at the same training percentage
#[derive(Debug, Clone, Copy, Default)]
pub struct StratifiedSplitter {
    percent: TrainingPercent,
}

impl StratifiedSplitter {
    pub fn new(percent: TrainingPercent) -> Self {
        Self { percent }
    }

    pub fn percent(&self) -> TrainingPercent {
        self.percent
    }

    /// Identifiers of the records belonging to `class`
    pub async fn fetch<S: DatasetStore + ?Sized>(
        &self,
        store: &S,
        dataset: &str,
        attribute: &str,
        class: &ClassValue,
    ) -> Result<BTreeSet<Identifier>> {
        Ok(store.identifiers_where(dataset, attribute, class).await?)
    }

    /// Shuffle `identifiers` uniformly and cut the permutation at the
    /// rounded training count.
    ///
    /// The set is shuffled from its sorted order, so a seeded `rng` always
    /// produces the same split for the same input.
    pub fn split<R: Rng + ?Sized>(
        &self,
        class: ClassValue,
        identifiers: BTreeSet<Identifier>,
        rng: &mut R,
    ) -> ClassSplit {
        let mut permutation: Vec<Identifier> = identifiers.into_iter().collect();
        permutation.shuffle(rng);

        let k = self.percent.training_count(permutation.len());
        let validation = permutation.split_off(k);

        debug!(
            "Class '{}': {} training, {} validation",
            class,
            permutation.len(),
            validation.len()
        );
        trace!("Class '{}' training identifiers: {:?}", class, permutation);

        ClassSplit {
            class,
            training: permutation,
            validation,
        }
    }

    /// Fetch the identifiers of `class` and split them
    pub async fn select<S: DatasetStore + ?Sized, R: Rng + ?Sized>(
        &self,
        store: &S,
        dataset: &str,
        attribute: &str,
        class: &ClassValue,
        rng: &mut R,
    ) -> Result<ClassSplit> {
        let identifiers = self.fetch(store, dataset, attribute, class).await?;
        Ok(self.split(class.clone(), identifiers, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryDataset, MemoryStore};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ids(range: std::ops::RangeInclusive<u64>) -> BTreeSet<Identifier> {
        range.map(Identifier::from).collect()
    }

    fn splitter(percent: i64) -> StratifiedSplitter {
        StratifiedSplitter::new(TrainingPercent::new(percent).unwrap())
    }

    #[test]
    fn test_ten_records_at_thirty_percent() {
        let mut rng = StdRng::seed_from_u64(7);
        let split = splitter(30).split(ClassValue::from("a"), ids(1..=10), &mut rng);

        assert_eq!(split.training.len(), 3);
        assert_eq!(split.validation.len(), 7);

        let mut all: BTreeSet<Identifier> = split.training.iter().cloned().collect();
        all.extend(split.validation.iter().cloned());
        assert_eq!(all, ids(1..=10));
    }

    #[test]
    fn test_empty_class() {
        let mut rng = StdRng::seed_from_u64(1);
        let split = splitter(30).split(ClassValue::from("a"), BTreeSet::new(), &mut rng);
        assert!(split.training.is_empty());
        assert!(split.validation.is_empty());
    }

    #[test]
    fn test_single_record_class_rounds_down() {
        let mut rng = StdRng::seed_from_u64(1);
        let split = splitter(30).split(ClassValue::from("a"), ids(1..=1), &mut rng);
        assert!(split.training.is_empty());
        assert_eq!(split.validation, vec![Identifier::from(1u64)]);
    }

    #[test]
    fn test_extreme_percentages() {
        let mut rng = StdRng::seed_from_u64(3);
        let none = splitter(0).split(ClassValue::from("a"), ids(1..=9), &mut rng);
        assert_eq!((none.training.len(), none.validation.len()), (0, 9));

        let all = splitter(100).split(ClassValue::from("a"), ids(1..=9), &mut rng);
        assert_eq!((all.training.len(), all.validation.len()), (9, 0));
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = splitter(50).split(ClassValue::from("a"), ids(1..=20), &mut StdRng::seed_from_u64(99));
        let b = splitter(50).split(ClassValue::from("a"), ids(1..=20), &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_reaches_every_position() {
        // With a uniform shuffle every identifier lands in training sometimes.
        let mut rng = StdRng::seed_from_u64(2024);
        let mut seen = BTreeSet::new();
        for _ in 0..200 {
            let split = splitter(20).split(ClassValue::from("a"), ids(1..=10), &mut rng);
            seen.extend(split.training);
        }
        assert_eq!(seen, ids(1..=10));
    }

    #[tokio::test]
    async fn test_select_reads_class_from_store() {
        let store = MemoryStore::new();
        store
            .insert(
                "pts",
                MemoryDataset::from_classes(
                    "class",
                    [(1u64, "x"), (2, "y"), (3, "x"), (4, "x"), (5, "x")],
                ),
            )
            .await;

        let mut rng = StdRng::seed_from_u64(5);
        let split = splitter(50)
            .select(&store, "pts", "class", &ClassValue::from("x"), &mut rng)
            .await
            .unwrap();

        assert_eq!(split.size(), 4);
        assert_eq!(split.training.len(), 2);
        assert!(!split.training.contains(&Identifier::from(2u64)));
        assert!(!split.validation.contains(&Identifier::from(2u64)));
    }
}
