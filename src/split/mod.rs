//! Stratified training/validation splitting
//!
//! A run enumerates the classes of the grouping attribute, shuffles and cuts
//! each class at the training percentage, unions the per-class selections and
//! asks the store to materialize the two resulting datasets.

pub mod aggregator;
pub mod enumerator;
pub mod percent;
pub mod pipeline;
pub mod splitter;

pub use aggregator::{materialize, ClassSummary, OutputNames, Partition, PartitionAggregator};
pub use enumerator::ClassEnumerator;
pub use percent::TrainingPercent;
pub use pipeline::{run_split, SplitRequest, SplitSummary};
pub use splitter::{ClassSplit, StratifiedSplitter};
