//! In-process row store

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::query::compare_values;
use super::{Filter, Order, Query, Row, RowStore, StoreError, Table};

/// Row store held entirely in memory
///
/// Rows keep insertion order. Ordered selects break ties newest-insert-first
/// when descending and oldest-insert-first when ascending.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Table, Vec<Row>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with rows
    pub fn with_tables(tables: HashMap<Table, Vec<Row>>) -> Self {
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Number of rows in a table
    ///
    /// Writes only ever push, extend or drop whole rows, so the count is still
    /// read after a poisoned lock.
    pub fn row_count(&self, table: Table) -> usize {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables.get(&table).map_or(0, Vec::len)
    }

    /// Copy of every row in a table
    pub fn rows(&self, table: Table) -> Result<Vec<Row>, StoreError> {
        Ok(self.read()?.get(&table).cloned().unwrap_or_default())
    }

    /// Replace the contents of a table
    pub fn replace_rows(&self, table: Table, rows: Vec<Row>) -> Result<(), StoreError> {
        self.write()?.insert(table, rows);
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Table, Vec<Row>>>, StoreError> {
        self.tables
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Table, Vec<Row>>>, StoreError> {
        self.tables
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

impl RowStore for MemoryStore {
    fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        let tables = self.read()?;
        let rows = match tables.get(&query.table) {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };

        let mut selected: Vec<Row> = match query.order {
            Some((_, Order::Descending)) => {
                rows.iter().rev().filter(|r| query.matches(r)).cloned().collect()
            }
            _ => rows.iter().filter(|r| query.matches(r)).cloned().collect(),
        };

        if let Some((column, order)) = &query.order {
            // Stable sort keeps the insertion tie-break chosen above
            selected.sort_by(|a, b| {
                let ord = compare_values(a.get(column), b.get(column));
                match order {
                    Order::Ascending => ord,
                    Order::Descending => ord.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            selected.truncate(limit);
        }

        Ok(selected)
    }

    fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError> {
        self.write()?.entry(table).or_default().push(row.clone());
        Ok(row)
    }

    fn update(&self, table: Table, filters: &[Filter], changes: Row) -> Result<usize, StoreError> {
        let mut tables = self.write()?;
        let mut count = 0;
        for row in tables.entry(table).or_default().iter_mut() {
            if filters.iter().all(|f| f.matches(row)) {
                row.extend(changes.clone());
                count += 1;
            }
        }
        Ok(count)
    }

    fn upsert(&self, table: Table, row: Row, conflict_column: &str) -> Result<Row, StoreError> {
        let key = row
            .get(conflict_column)
            .cloned()
            .ok_or_else(|| StoreError::MissingColumn(conflict_column.to_string()))?;

        let mut tables = self.write()?;
        let rows = tables.entry(table).or_default();

        match rows.iter_mut().find(|r| r.get(conflict_column) == Some(&key)) {
            Some(existing) => {
                existing.extend(row);
                Ok(existing.clone())
            }
            None => {
                rows.push(row.clone());
                Ok(row)
            }
        }
    }

    fn delete(&self, table: Table, filters: &[Filter]) -> Result<usize, StoreError> {
        let mut tables = self.write()?;
        let rows = tables.entry(table).or_default();
        let before = rows.len();
        rows.retain(|r| !filters.iter().all(|f| f.matches(r)));
        Ok(before - rows.len())
    }
}
