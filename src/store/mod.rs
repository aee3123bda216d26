//! Dataset store abstraction
//!
//! The split core reads classes and identifiers from, and writes outputs to,
//! a [`DatasetStore`]. Two implementations ship with the crate: a CSV-file
//! store used by the command-line tool and an in-memory store for tests.

pub mod csv;
pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use self::csv::{CsvStore, DEFAULT_KEY_COLUMN};
pub use error::{StoreError, StoreResult};
pub use memory::{Extraction, MemoryDataset, MemoryStore, Record};
pub use traits::DatasetStore;
pub use types::{ClassValue, Identifier};
