//! Display formatting for result previews
//!
//! Text columns that mostly hold dates are rendered as `YYYY-MM-DD`; numeric
//! currency columns get thousands separators. Only the head rows are kept.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::table::DataTable;
use crate::value::parse_date;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Rows kept in the preview
    pub row_limit: usize,
    /// Share of preview rows that must parse as dates for a text column to be reformatted
    pub date_parse_ratio: f64,
    /// Lowercase substrings marking a currency column
    pub currency_tokens: Vec<String>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            row_limit: 50,
            date_parse_ratio: 0.5,
            currency_tokens: ["amount", "금액", "price", "비용", "amt"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Head rows of `table` as JSON records with display formatting applied
pub fn format_preview(table: &DataTable, config: &PreviewConfig) -> Vec<Value> {
    let mut head = table.head(config.row_limit);

    for col in 0..head.width() {
        if is_date_column(&head, col, config.date_parse_ratio) {
            for row in head.rows.iter_mut() {
                row[col] = match &row[col] {
                    Value::String(s) => parse_date(s)
                        .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                        .unwrap_or(Value::Null),
                    _ => Value::Null,
                };
            }
        } else if is_currency_column(&head, col, &config.currency_tokens) {
            for row in head.rows.iter_mut() {
                if let Some(x) = row[col].as_f64() {
                    row[col] = Value::String(format_thousands(x.round() as i64));
                }
            }
        }
    }

    head.to_records()
}

fn is_date_column(table: &DataTable, col: usize, ratio: f64) -> bool {
    let mut any_text = false;
    let mut parsed = 0;
    for cell in table.column_values(col) {
        match cell {
            Value::Null => {}
            Value::String(s) => {
                any_text = true;
                if parse_date(s).is_some() {
                    parsed += 1;
                }
            }
            _ => return false,
        }
    }

    let needed = ((table.height() as f64 * ratio).floor() as usize).max(1);
    any_text && parsed >= needed
}

fn is_currency_column(table: &DataTable, col: usize, tokens: &[String]) -> bool {
    let name = table.columns()[col].to_lowercase();
    tokens.iter().any(|t| name.contains(t.as_str()))
        && table.column_values(col).all(|v| v.is_null() || v.is_number())
}

/// 1234567 → "1,234,567"
pub fn format_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1234567), "1,234,567");
        assert_eq!(format_thousands(-45000), "-45,000");
    }

    #[test]
    fn test_dates_and_currency() {
        let table = DataTable::from_records(&[
            json!({"Date": "2023/10/01", "Amount": 1234567.6, "Qty": 3000}),
            json!({"Date": "2023-10-05 09:00:00", "Amount": 3200, "Qty": 1}),
            json!({"Date": "unknown", "Amount": null, "Qty": 2}),
        ])
        .unwrap();

        let preview = format_preview(&table, &PreviewConfig::default());

        assert_eq!(preview[0], json!({"Date": "2023-10-01", "Amount": "1,234,568", "Qty": 3000}));
        assert_eq!(preview[1]["Date"], json!("2023-10-05"));
        assert_eq!(preview[1]["Amount"], json!("3,200"));
        // unparseable cells in a date column are blanked
        assert_eq!(preview[2], json!({"Date": null, "Amount": null, "Qty": 2}));
    }

    #[test]
    fn test_mostly_text_column_untouched() {
        let table = DataTable::from_records(&[
            json!({"Note": "2023-10-01"}),
            json!({"Note": "call back"}),
            json!({"Note": "paid"}),
            json!({"Note": "late"}),
        ])
        .unwrap();

        let preview = format_preview(&table, &PreviewConfig::default());

        assert_eq!(preview[0]["Note"], json!("2023-10-01"));
        assert_eq!(preview[1]["Note"], json!("call back"));
    }

    #[test]
    fn test_row_limit() {
        let records: Vec<Value> = (0..10).map(|i| json!({"i": i})).collect();
        let table = DataTable::from_records(&records).unwrap();
        let config = PreviewConfig {
            row_limit: 3,
            ..PreviewConfig::default()
        };

        assert_eq!(format_preview(&table, &config).len(), 3);
    }

    #[test]
    fn test_text_amount_column_left_alone() {
        let table = DataTable::from_records(&[json!({"amount_note": "n/a"})]).unwrap();
        let preview = format_preview(&table, &PreviewConfig::default());

        assert_eq!(preview[0]["amount_note"], json!("n/a"));
    }
}
