//! Table catalog summaries for stored tables

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tabplan_exec::DataTable;
use tabplan_ir::ColumnType;

const SAMPLE_ROWS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCatalog {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub sample_data: Vec<Map<String, Value>>,
    pub row_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: ColumnType,
    pub is_nullable: bool,
    pub sample_values: Vec<Value>,
}

impl TableCatalog {
    /// Summarize a stored table: inferred column types plus the first rows
    pub fn from_table(name: &str, table: &DataTable) -> Self {
        let schema = table.schema();
        let sample = table.head(SAMPLE_ROWS);

        let sample_data = sample
            .to_records()
            .into_iter()
            .filter_map(|record| match record {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();

        let columns = table
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| ColumnInfo {
                name: col.clone(),
                data_type: schema.column_type(col).unwrap_or(ColumnType::Unknown),
                is_nullable: table.column_values(idx).any(Value::is_null),
                sample_values: sample.column_values(idx).cloned().collect(),
            })
            .collect();

        TableCatalog {
            name: name.to_string(),
            columns,
            sample_data,
            row_count: table.height(),
        }
    }

    /// Format catalog as a markdown table
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("## Table: `{}`\n\n", self.name));
        md.push_str(&format!("**Rows:** {}\n\n", self.row_count));

        md.push_str("| Column | Type | Nullable | Sample Values |\n");
        md.push_str("|--------|------|----------|---------------|\n");

        for col in &self.columns {
            let nullable = if col.is_nullable { "✓" } else { "" };
            let samples: Vec<String> = col
                .sample_values
                .iter()
                .take(3)
                .map(|v| match v {
                    Value::String(s) => format!("\"{}\"", s),
                    _ => v.to_string(),
                })
                .collect();

            md.push_str(&format!(
                "| `{}` | {} | {} | {} |\n",
                col.name,
                col.data_type.as_str(),
                nullable,
                samples.join(", ")
            ));
        }

        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> DataTable {
        let records: Vec<Value> = (0..8)
            .map(|i| json!({"Merchant": format!("Store {}", i), "Amount": i * 1000, "Memo": if i == 3 { Value::Null } else { json!("x") }}))
            .collect();
        DataTable::from_records(&records).unwrap()
    }

    #[test]
    fn test_from_table() {
        let catalog = TableCatalog::from_table("sales.csv", &table());

        assert_eq!(catalog.row_count, 8);
        assert_eq!(catalog.sample_data.len(), SAMPLE_ROWS);
        assert_eq!(catalog.columns[1].data_type, ColumnType::Integer);
        assert!(!catalog.columns[1].is_nullable);
        assert!(catalog.columns[2].is_nullable);
        assert_eq!(catalog.columns[0].sample_values[0], json!("Store 0"));
    }

    #[test]
    fn test_to_markdown() {
        let md = TableCatalog::from_table("sales.csv", &table()).to_markdown();

        assert!(md.contains("## Table: `sales.csv`"));
        assert!(md.contains("| `Amount` | integer |  | 0, 1000, 2000 |"));
        assert!(md.contains("\"Store 0\""));
    }
}
