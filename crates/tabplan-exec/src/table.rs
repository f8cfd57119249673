//! In-memory row/column table

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tabplan_ir::SchemaDescriptor;
use thiserror::Error;

use crate::value::infer_type;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("Row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Record {0} is not a JSON object")]
    NotAnObject(usize),
}

#[derive(Deserialize)]
struct RawTable {
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<Value>>,
}

impl TryFrom<RawTable> for DataTable {
    type Error = TableError;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        DataTable::new(raw.columns, raw.rows)
    }
}

/// Columns plus rows of JSON cells. Every row has exactly one cell per column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct DataTable {
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<Vec<Value>>,
}

impl DataTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, TableError> {
        let mut seen = HashSet::new();
        if let Some(dup) = columns.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(TableError::DuplicateColumn(dup.clone()));
        }

        if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(TableError::RaggedRow {
                row,
                expected: columns.len(),
                actual: cells.len(),
            });
        }

        Ok(Self { columns, rows })
    }

    /// Build from JSON records. Column order is first-seen key order;
    /// keys missing from a record become nulls.
    pub fn from_records(records: &[Value]) -> Result<Self, TableError> {
        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        let mut objects = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            let obj = record.as_object().ok_or(TableError::NotAnObject(i))?;
            for key in obj.keys() {
                if !index.contains_key(key) {
                    index.insert(key.clone(), columns.len());
                    columns.push(key.clone());
                }
            }
            objects.push(obj);
        }

        let rows = objects
            .into_iter()
            .map(|obj| {
                columns
                    .iter()
                    .map(|c| obj.get(c).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Ok(Self { columns, rows })
    }

    pub fn to_records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let obj: Map<String, Value> = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect();
                Value::Object(obj)
            })
            .collect()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().filter_map(move |r| r.get(idx))
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Copy of the first `n` rows
    pub fn head(&self, n: usize) -> DataTable {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Column names with inferred types
    pub fn schema(&self) -> SchemaDescriptor {
        let types = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), infer_type(self.column_values(i))))
            .collect();
        SchemaDescriptor::new(self.columns.iter().cloned()).with_types(types)
    }
}
