//! In-memory `TabularStore` for exercising the claim logic.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::services::store::{CellAddress, StoreError, TabularStore};

type Table = Vec<Vec<String>>;

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Table>>,
    /// When set, `get_table` serves this copy instead of the live tables.
    frozen: Mutex<Option<HashMap<String, Table>>>,
    unavailable: AtomicBool,
    calls: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_table(&self, name: &str, rows: Table) {
        self.tables.lock().unwrap().insert(name.to_string(), rows);
    }

    /// Snapshot the tables as `get_table` will keep reporting them.
    pub fn freeze_tables(&self) {
        let snapshot = self.tables.lock().unwrap().clone();
        *self.frozen.lock().unwrap() = Some(snapshot);
    }

    /// Change a cell behind the service's back, growing the table as needed.
    pub fn set_cell(&self, table: &str, addr: CellAddress, value: &str) {
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        let (r, c) = (addr.row as usize - 1, addr.col as usize - 1);
        if rows.len() <= r {
            rows.resize(r + 1, Vec::new());
        }
        if rows[r].len() <= c {
            rows[r].resize(c + 1, String::new());
        }
        rows[r][c] = value.to_string();
    }

    pub fn cell(&self, table: &str, addr: CellAddress) -> String {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .and_then(|rows| rows.get(addr.row as usize - 1))
            .and_then(|row| row.get(addr.col as usize - 1))
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

impl TabularStore for MemoryStore {
    async fn get_table(&self, name: &str) -> Result<Table, StoreError> {
        self.enter()?;
        let frozen = self.frozen.lock().unwrap();
        let live = self.tables.lock().unwrap();
        frozen
            .as_ref()
            .unwrap_or(&live)
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
    }

    async fn read_cell(&self, table: &str, addr: CellAddress) -> Result<String, StoreError> {
        self.enter()?;
        let tables = self.tables.lock().unwrap();
        let rows = tables
            .get(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        rows.get(addr.row as usize - 1)
            .and_then(|row| row.get(addr.col as usize - 1))
            .cloned()
            .ok_or(StoreError::CellNotFound(addr))
    }

    async fn write_cell(
        &self,
        table: &str,
        addr: CellAddress,
        value: &str,
    ) -> Result<(), StoreError> {
        self.enter()?;
        if !self.tables.lock().unwrap().contains_key(table) {
            return Err(StoreError::TableNotFound(table.to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.set_cell(table, addr, value);
        Ok(())
    }
}
