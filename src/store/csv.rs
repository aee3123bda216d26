//! CSV-file dataset store
//!
//! A dataset reference is the path of a CSV file with a header row. Records
//! are addressed through a key column (`cat` unless configured otherwise) and
//! extraction writes a new CSV file with the input header and the selected
//! rows, in input order.
//!
//! Each parsed input table is kept for the lifetime of the store, so the
//! per-class lookups of one run read the file once instead of once per class.

use async_trait::async_trait;
use csv::StringRecord;
use std::collections::{BTreeSet, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use super::error::{StoreError, StoreResult};
use super::traits::DatasetStore;
use super::types::{ClassValue, Identifier};

/// Default name of the column holding record identifiers
pub const DEFAULT_KEY_COLUMN: &str = "cat";

#[derive(Debug)]
struct Table {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl Table {
    fn column(&self, dataset: &str, name: &str) -> StoreResult<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| StoreError::attribute_not_found(dataset, name))
    }
}

/// Dataset store reading and writing CSV files
#[derive(Debug, Clone)]
pub struct CsvStore {
    key_column: String,
    overwrite: bool,
    base_dir: Option<PathBuf>,
    tables: Arc<Mutex<HashMap<PathBuf, Arc<Table>>>>,
}

impl Default for CsvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvStore {
    pub fn new() -> Self {
        Self {
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            overwrite: false,
            base_dir: None,
            tables: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_key_column(mut self, key_column: impl Into<String>) -> Self {
        self.key_column = key_column.into();
        self
    }

    /// Replace existing output files instead of failing
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Resolve relative dataset paths against `dir`
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    fn resolve(&self, dataset: &str) -> PathBuf {
        let path = Path::new(dataset);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    async fn load(&self, dataset: &str) -> StoreResult<Arc<Table>> {
        let path = self.resolve(dataset);
        let mut tables = self.tables.lock().await;
        if let Some(table) = tables.get(&path) {
            return Ok(Arc::clone(table));
        }

        let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::DatasetNotFound(path.display().to_string()),
            _ => StoreError::unavailable_with_source(
                format!("failed to read {}", path.display()),
                e,
            ),
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes.as_slice());
        let headers = reader.headers()?.clone();
        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
        trace!("Loaded {} rows from {}", rows.len(), path.display());

        let table = Arc::new(Table { headers, rows });
        tables.insert(path, Arc::clone(&table));
        Ok(table)
    }

    async fn write_output(&self, path: &Path, contents: &[u8]) -> StoreResult<()> {
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true);
        if self.overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }

        let mut file = options.open(path).await.map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => StoreError::OutputAlreadyExists(path.display().to_string()),
            _ => StoreError::unavailable_with_source(
                format!("failed to create {}", path.display()),
                e,
            ),
        })?;

        file.write_all(contents).await.map_err(|e| {
            StoreError::unavailable_with_source(format!("failed to write {}", path.display()), e)
        })?;
        file.flush().await.map_err(|e| {
            StoreError::unavailable_with_source(format!("failed to write {}", path.display()), e)
        })
    }
}

#[async_trait]
impl DatasetStore for CsvStore {
    async fn distinct_values(
        &self,
        dataset: &str,
        attribute: &str,
    ) -> StoreResult<BTreeSet<ClassValue>> {
        let table = self.load(dataset).await?;
        let column = table.column(dataset, attribute)?;

        Ok(table
            .rows
            .iter()
            .filter_map(|row| row.get(column))
            .map(ClassValue::from)
            .collect())
    }

    async fn identifiers_where(
        &self,
        dataset: &str,
        attribute: &str,
        value: &ClassValue,
    ) -> StoreResult<BTreeSet<Identifier>> {
        let table = self.load(dataset).await?;
        let column = table.column(dataset, attribute)?;
        let key = table.column(dataset, &self.key_column)?;

        Ok(table
            .rows
            .iter()
            .filter(|row| row.get(column) == Some(value.as_str()))
            .filter_map(|row| row.get(key))
            .map(Identifier::from)
            .collect())
    }

    async fn extract_by_identifiers(
        &self,
        dataset: &str,
        identifiers: &BTreeSet<Identifier>,
        output_name: &str,
    ) -> StoreResult<()> {
        let table = self.load(dataset).await?;
        let key = table.column(dataset, &self.key_column)?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&table.headers)?;
        let mut written = 0usize;
        for row in &table.rows {
            let selected = row
                .get(key)
                .is_some_and(|id| identifiers.contains(&Identifier::from(id)));
            if selected {
                writer.write_record(row)?;
                written += 1;
            }
        }
        let contents = writer
            .into_inner()
            .map_err(|e| StoreError::unavailable(format!("failed to encode CSV: {}", e)))?;

        let path = self.resolve(output_name);
        self.write_output(&path, &contents).await?;
        self.tables.lock().await.remove(&path);
        debug!("Wrote {} records to {}", written, path.display());
        Ok(())
    }
}
