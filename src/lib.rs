//! # stratasplit
//!
//! Divide a labeled dataset into training and validation subsets by stratified
//! random sampling: every class of a grouping column is split on its own at
//! the same percentage.
//!
//! ## Usage
//!
//! ```bash
//! stratasplit --input points.csv --column landcover \
//!     --training train.csv --validation valid.csv [--training-percent 30]
//! ```
//!
//! ## Modules
//!
//! - `app` - Configuration, logging setup and fatal error handling for the binary
//! - `error` - Unified error type with stable error codes
//! - `split` - Class enumeration, per-class splitting and partition aggregation
//! - `store` - Dataset store trait with CSV and in-memory implementations
pub mod app;
pub mod error;
pub mod split;
pub mod store;

pub use error::{Result, SplitError};
pub use split::{run_split, SplitRequest, SplitSummary, TrainingPercent};
pub use store::{CsvStore, DatasetStore, MemoryStore};
