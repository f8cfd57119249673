//! Schema descriptor handed to the translator

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    Date,
    String,
    Unknown,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::String => "string",
            ColumnType::Unknown => "unknown",
        }
    }
}

/// Immutable snapshot of a table's column names and inferred types
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    #[serde(alias = "fields")]
    columns: Vec<String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    types: HashMap<String, ColumnType>,
}

impl SchemaDescriptor {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            types: HashMap::new(),
        }
    }

    pub fn with_types(mut self, types: HashMap<String, ColumnType>) -> Self {
        self.types = types;
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.types.get(name).copied()
    }

    /// First column whose lowercased name contains any of `keywords`.
    ///
    /// Keywords are expected in lowercase; Hangul is unaffected by lowercasing.
    pub fn find_column(&self, keywords: &[&str]) -> Option<&str> {
        self.columns
            .iter()
            .find(|col| {
                let lowered = col.to_lowercase();
                keywords.iter().any(|kw| lowered.contains(kw))
            })
            .map(String::as_str)
    }

    /// True when `text` appears verbatim inside any column name.
    pub fn mentions(&self, text: &str) -> bool {
        self.columns.iter().any(|c| c.contains(text))
    }
}
