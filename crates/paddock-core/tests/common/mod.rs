//! Shared test backends

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use paddock_core::store::{Filter, MemoryStore, Query, Row, RowStore, StoreError, Table};

/// Memory store that can be told to reject writes per table and counts upserts
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    rejected: Mutex<HashSet<Table>>,
    upserts: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject_writes(&self, table: Table, reject: bool) {
        let mut rejected = self.rejected.lock().unwrap();
        if reject {
            rejected.insert(table);
        } else {
            rejected.remove(&table);
        }
    }

    pub fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    fn check(&self, table: Table) -> Result<(), StoreError> {
        if self.rejected.lock().unwrap().contains(&table) {
            return Err(StoreError::Rejected(format!("{} is read-only", table)));
        }
        Ok(())
    }
}

impl RowStore for FlakyStore {
    fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        self.inner.select(query)
    }

    fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError> {
        self.check(table)?;
        self.inner.insert(table, row)
    }

    fn update(&self, table: Table, filters: &[Filter], changes: Row) -> Result<usize, StoreError> {
        self.check(table)?;
        self.inner.update(table, filters, changes)
    }

    fn upsert(&self, table: Table, row: Row, conflict_column: &str) -> Result<Row, StoreError> {
        self.check(table)?;
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert(table, row, conflict_column)
    }

    fn delete(&self, table: Table, filters: &[Filter]) -> Result<usize, StoreError> {
        self.check(table)?;
        self.inner.delete(table, filters)
    }
}
