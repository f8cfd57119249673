//! Named table store and lineage tracking
//!
//! The store is an explicit value shared by reference (usually behind an
//! `Arc`). Readers get an `Arc` snapshot of a table, so a concurrent write to
//! the same name never changes a table someone is already working on. Writes
//! to one name are last-writer-wins.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tabplan_exec::DataTable;
use thiserror::Error;
use tracing::debug;

mod lineage;
pub use lineage::*;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Table not found: {0}")]
    TableNotFound(String),
}

#[derive(Debug, Default)]
pub struct TableRegistry {
    tables: RwLock<HashMap<String, Arc<DataTable>>>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `table` under `name`, returning the previous table if any
    pub fn insert(&self, name: impl Into<String>, table: DataTable) -> Option<Arc<DataTable>> {
        let name = name.into();
        debug!(table = %name, rows = table.height(), "storing table");
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, Arc::new(table))
    }

    /// Snapshot of the table stored under `name`
    pub fn get(&self, name: &str) -> Result<Arc<DataTable>, RegistryError> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::TableNotFound(name.to_string()))
    }

    pub fn remove(&self, name: &str) -> Result<Arc<DataTable>, RegistryError> {
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .ok_or_else(|| RegistryError::TableNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Stored names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.tables.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
