//! JSON file row store
//!
//! Persists each table as `<dir>/<table>.json`. The whole table is rewritten
//! after every successful write; a failed write restores the previous rows so
//! memory never runs ahead of disk.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{Filter, MemoryStore, Query, Row, RowStore, StoreError, Table};

/// Row store backed by JSON files in a directory
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    inner: MemoryStore,
    /// Serializes writers so snapshot / write / persist is atomic per store
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Get the default data directory
    pub fn default_dir() -> io::Result<PathBuf> {
        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "Could not find data directory")
            })?;
        Ok(base.join("paddock"))
    }

    /// Open (or create) a store in a directory, loading existing tables
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let mut tables = HashMap::new();
        for table in Table::ALL {
            let path = table_path(&dir, table);
            if !path.exists() {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            let rows: Vec<Row> = serde_json::from_str(&content)
                .map_err(|e| StoreError::Corrupt(format!("{}: {}", path.display(), e)))?;
            tables.insert(table, rows);
        }

        tracing::info!(dir = %dir.display(), "Opened JSON file store");

        Ok(Self {
            dir,
            inner: MemoryStore::with_tables(tables),
            write_lock: Mutex::new(()),
        })
    }

    /// Directory holding the table files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Run a write against the in-memory tables and persist the result
    fn write_through<T>(
        &self,
        table: Table,
        op: impl FnOnce(&MemoryStore) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let previous = self.inner.rows(table)?;
        let result = op(&self.inner)?;

        if let Err(e) = self.persist(table) {
            self.inner.replace_rows(table, previous)?;
            return Err(e);
        }
        Ok(result)
    }

    fn persist(&self, table: Table) -> Result<(), StoreError> {
        let rows = self.inner.rows(table)?;
        let content =
            serde_json::to_string_pretty(&rows).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let path = table_path(&self.dir, table);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

impl RowStore for JsonFileStore {
    fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        self.inner.select(query)
    }

    fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError> {
        self.write_through(table, |inner| inner.insert(table, row))
    }

    fn update(&self, table: Table, filters: &[Filter], changes: Row) -> Result<usize, StoreError> {
        self.write_through(table, |inner| inner.update(table, filters, changes))
    }

    fn upsert(&self, table: Table, row: Row, conflict_column: &str) -> Result<Row, StoreError> {
        self.write_through(table, |inner| inner.upsert(table, row, conflict_column))
    }

    fn delete(&self, table: Table, filters: &[Filter]) -> Result<usize, StoreError> {
        self.write_through(table, |inner| inner.delete(table, filters))
    }
}

fn table_path(dir: &Path, table: Table) -> PathBuf {
    dir.join(format!("{}.json", table.name()))
}
