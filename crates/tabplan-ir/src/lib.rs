//! Tabplan Intermediate Representation (IR)
//!
//! The plan is the contract between prompt translation and table execution.
//! All types are deterministically serializable so a plan can be shipped to a
//! presentation layer, stored, and re-executed later.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;

mod graph;
mod types;
pub use graph::*;
pub use types::*;

/// Id of the passthrough table emitted when no detector claims a prompt.
pub const DEFAULT_TABLE_ID: &str = "default_table";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("Duplicate table id: {0}")]
    DuplicateTableId(String),

    #[error("Table id must not be empty")]
    EmptyTableId,
}

/// Top-level plan: ordered named pipelines plus presentation layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub tables: Vec<PlanTable>,

    #[serde(default)]
    pub layout: Layout,

    #[serde(default)]
    pub is_valid_request: bool,
}

impl Plan {
    pub fn new(is_valid_request: bool) -> Self {
        Self {
            tables: Vec::new(),
            layout: Layout::default(),
            is_valid_request,
        }
    }

    /// Append a table and mirror it into its own layout section.
    pub fn push_table(&mut self, table: PlanTable) -> Result<(), PlanError> {
        if table.id.is_empty() {
            return Err(PlanError::EmptyTableId);
        }
        if self.table(&table.id).is_some() {
            return Err(PlanError::DuplicateTableId(table.id));
        }

        self.layout.sections.push(Section {
            title: table.title.clone(),
            content: vec![table.id.clone()],
        });
        self.tables.push(table);
        Ok(())
    }

    pub fn table(&self, id: &str) -> Option<&PlanTable> {
        self.tables.iter().find(|t| t.id == id)
    }

    pub fn table_ids(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.id.as_str())
    }

    /// Table id checks for plans that did not come from the translator.
    ///
    /// Operations naming absent columns and layout sections naming absent
    /// tables are left to execution, where they are no-ops.
    pub fn check(&self) -> Result<(), PlanError> {
        let mut seen = HashSet::new();
        for table in &self.tables {
            if table.id.is_empty() {
                return Err(PlanError::EmptyTableId);
            }
            if !seen.insert(table.id.as_str()) {
                return Err(PlanError::DuplicateTableId(table.id.clone()));
            }
        }
        Ok(())
    }

    /// Calculate fingerprint (SHA-256) for deterministic caching and logging
    pub fn fingerprint(&self) -> String {
        // Plans hold only strings, numbers and JSON scalars, so serialization cannot fail.
        let json = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Presentation grouping of tables. Has no effect on execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub title: String,
    pub content: Vec<String>,
}

/// One named pipeline of operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTable {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl PlanTable {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            operations: Vec::new(),
        }
    }

    /// Builder-style append
    pub fn then(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_TABLE_ID
    }
}

/// Table operations, executed left to right against one working copy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    /// Projection. An empty list keeps every column.
    Select {
        #[serde(default)]
        fields: Vec<String>,
    },
    /// Exact-equality row filter
    Filter { field: String, value: Value },
    GroupBy {
        keys: Vec<String>,
        #[serde(default)]
        aggregations: Vec<Aggregation>,
    },
    OrderBy {
        field: String,
        #[serde(default)]
        direction: SortDirection,
    },
    /// Keep the first `count` rows. Non-positive counts are ignored.
    Limit { count: i64 },
}

impl Operation {
    pub fn select_all() -> Self {
        Operation::Select { fields: Vec::new() }
    }

    pub fn select<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Operation::Select {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn filter(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Operation::Filter {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn group_by(keys: Vec<String>, aggregations: Vec<Aggregation>) -> Self {
        Operation::GroupBy { keys, aggregations }
    }

    pub fn order_by(field: impl Into<String>, direction: SortDirection) -> Self {
        Operation::OrderBy {
            field: field.into(),
            direction,
        }
    }

    pub fn limit(count: i64) -> Self {
        Operation::Limit { count }
    }

    /// Wire name of the operation kind
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Select { .. } => "SELECT",
            Operation::Filter { .. } => "FILTER",
            Operation::GroupBy { .. } => "GROUP_BY",
            Operation::OrderBy { .. } => "ORDER_BY",
            Operation::Limit { .. } => "LIMIT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    /// Ignored for COUNT
    #[serde(default)]
    pub field: String,
    pub op: AggOp,
    #[serde(rename = "as")]
    pub alias: String,
}

impl Aggregation {
    pub fn new(field: impl Into<String>, op: AggOp, alias: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op,
            alias: alias.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AggOp {
    Sum,
    Count,
    Mean,
    Min,
    Max,
}

impl AggOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggOp::Sum => "SUM",
            AggOp::Count => "COUNT",
            AggOp::Mean => "MEAN",
            AggOp::Min => "MIN",
            AggOp::Max => "MAX",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}
