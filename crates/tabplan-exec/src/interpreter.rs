//! Plan interpreter
//!
//! Each plan table runs against its own clone of the source table; operations
//! fold left to right over that working copy. Operations that reference
//! columns the table does not have are skipped and recorded in the trace.

use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use tabplan_ir::{AggOp, Aggregation, Operation, Plan, PlanTable, SortDirection};
use tracing::{debug, info};

use crate::table::DataTable;
use crate::value::{compare_nulls_last, compare_values, float_value, values_equal};
use crate::ExecutionError;

/// Why an operation (or part of one) had no effect
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum NoOp {
    MissingField { field: String },
    EmptySelection { requested: Vec<String> },
    UnknownFields { fields: Vec<String> },
    NoGroupKeys { keys: Vec<String> },
    MissingGroupKeys { keys: Vec<String> },
    DroppedAggregation { field: String, alias: String },
    DuplicateAlias { alias: String },
    NullGroupKeys { rows: usize },
    NonPositiveLimit { count: i64 },
}

/// One entry of the execution trace
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub table_id: String,
    pub op_index: usize,
    pub op: &'static str,
    #[serde(flatten)]
    pub noop: NoOp,
}

/// Results in plan order plus the no-op trace
#[derive(Debug, Clone, Default)]
pub struct PlanOutput {
    results: Vec<(String, DataTable)>,
    pub trace: Vec<Diagnostic>,
}

impl PlanOutput {
    pub fn get(&self, table_id: &str) -> Option<&DataTable> {
        self.results
            .iter()
            .find(|(id, _)| id == table_id)
            .map(|(_, t)| t)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataTable)> {
        self.results.iter().map(|(id, t)| (id.as_str(), t))
    }

    /// First result with at least one row, in plan order
    pub fn first_non_empty(&self) -> Option<(&str, &DataTable)> {
        self.iter().find(|(_, t)| !t.is_empty())
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Execute every table of `plan` against `source`. `source` is never modified.
pub fn execute_plan(source: &DataTable, plan: &Plan) -> Result<PlanOutput, ExecutionError> {
    let mut output = PlanOutput::default();

    for table in &plan.tables {
        let (result, trace) = execute_table(source, table)?;
        output.trace.extend(trace);
        output.results.push((table.id.clone(), result));
    }

    info!(
        tables = output.len(),
        noops = output.trace.len(),
        "plan executed"
    );
    Ok(output)
}

/// Run one table's operations over a fresh working copy
pub fn execute_table(
    source: &DataTable,
    table: &PlanTable,
) -> Result<(DataTable, Vec<Diagnostic>), ExecutionError> {
    let mut pipeline = Pipeline {
        table_id: &table.id,
        working: source.clone(),
        trace: Vec::new(),
    };

    for (idx, op) in table.operations.iter().enumerate() {
        pipeline.apply(idx, op)?;
    }

    Ok((pipeline.working, pipeline.trace))
}

struct Pipeline<'a> {
    table_id: &'a str,
    working: DataTable,
    trace: Vec<Diagnostic>,
}

impl<'a> Pipeline<'a> {
    fn apply(&mut self, idx: usize, op: &Operation) -> Result<(), ExecutionError> {
        match op {
            Operation::Select { fields } => self.select(idx, op, fields),
            Operation::Filter { field, value } => self.filter(idx, op, field, value),
            Operation::GroupBy { keys, aggregations } => return self.group_by(idx, op, keys, aggregations),
            Operation::OrderBy { field, direction } => self.order_by(idx, op, field, *direction),
            Operation::Limit { count } => self.limit(idx, op, *count),
        }
        Ok(())
    }

    fn note(&mut self, idx: usize, op: &Operation, noop: NoOp) {
        debug!(table = self.table_id, op = op.kind(), op_index = idx, ?noop, "operation skipped");
        self.trace.push(Diagnostic {
            table_id: self.table_id.to_string(),
            op_index: idx,
            op: op.kind(),
            noop,
        });
    }

    fn select(&mut self, idx: usize, op: &Operation, fields: &[String]) {
        if fields.is_empty() {
            return;
        }

        let mut picked = Vec::new();
        let mut seen = HashSet::new();
        let mut unknown = Vec::new();
        for field in fields {
            match self.working.column_index(field) {
                Some(i) if seen.insert(i) => picked.push(i),
                Some(_) => {}
                None => unknown.push(field.clone()),
            }
        }

        if picked.is_empty() {
            self.note(idx, op, NoOp::EmptySelection { requested: fields.to_vec() });
            return;
        }
        if !unknown.is_empty() {
            self.note(idx, op, NoOp::UnknownFields { fields: unknown });
        }

        let table = &mut self.working;
        table.columns = picked.iter().map(|&i| table.columns[i].clone()).collect();
        for row in table.rows.iter_mut() {
            *row = picked.iter().map(|&i| row[i].clone()).collect();
        }
    }

    fn filter(&mut self, idx: usize, op: &Operation, field: &str, value: &Value) {
        let Some(col) = self.working.column_index(field) else {
            self.note(idx, op, NoOp::MissingField { field: field.to_string() });
            return;
        };

        self.working.rows.retain(|row| values_equal(&row[col], value));
    }

    fn group_by(
        &mut self,
        idx: usize,
        op: &Operation,
        keys: &[String],
        aggregations: &[Aggregation],
    ) -> Result<(), ExecutionError> {
        let mut key_cols = Vec::new();
        let mut missing = Vec::new();
        for key in keys {
            match self.working.column_index(key) {
                Some(i) if !key_cols.contains(&i) => key_cols.push(i),
                Some(_) => {}
                None => missing.push(key.clone()),
            }
        }

        if key_cols.is_empty() {
            self.note(idx, op, NoOp::NoGroupKeys { keys: keys.to_vec() });
            return Ok(());
        }
        if !missing.is_empty() {
            self.note(idx, op, NoOp::MissingGroupKeys { keys: missing });
        }

        let mut columns: Vec<String> = key_cols.iter().map(|&i| self.working.columns[i].clone()).collect();

        // (aggregation, source column); COUNT needs no source column
        let mut planned: Vec<(&Aggregation, Option<usize>)> = Vec::new();
        for agg in aggregations {
            let source = match agg.op {
                AggOp::Count => None,
                _ => match self.working.column_index(&agg.field) {
                    Some(i) => Some(i),
                    None => {
                        self.note(
                            idx,
                            op,
                            NoOp::DroppedAggregation {
                                field: agg.field.clone(),
                                alias: agg.alias.clone(),
                            },
                        );
                        continue;
                    }
                },
            };

            if columns.contains(&agg.alias) {
                self.note(idx, op, NoOp::DuplicateAlias { alias: agg.alias.clone() });
                continue;
            }
            columns.push(agg.alias.clone());
            planned.push((agg, source));
        }

        let mut groups: BTreeMap<GroupKey, Vec<usize>> = BTreeMap::new();
        let mut null_keyed = 0;
        for (row_idx, row) in self.working.rows.iter().enumerate() {
            let key: Vec<Value> = key_cols.iter().map(|&i| row[i].clone()).collect();
            if key.iter().any(Value::is_null) {
                null_keyed += 1;
                continue;
            }
            groups.entry(GroupKey(key)).or_default().push(row_idx);
        }
        if null_keyed > 0 {
            self.note(idx, op, NoOp::NullGroupKeys { rows: null_keyed });
        }

        let mut rows = Vec::with_capacity(groups.len());
        for (GroupKey(key), members) in groups {
            let mut out = key;
            for (agg, source) in &planned {
                let value = match source {
                    None => Value::from(members.len()),
                    Some(col) => {
                        let cells = members.iter().map(|&r| &self.working.rows[r][*col]);
                        aggregate(agg.op, cells).map_err(|value| ExecutionError::NonNumericAggregation {
                            table_id: self.table_id.to_string(),
                            field: agg.field.clone(),
                            op: agg.op.as_str(),
                            value: value.to_string(),
                        })?
                    }
                };
                out.push(value);
            }
            rows.push(out);
        }

        self.working = DataTable { columns, rows };
        Ok(())
    }

    fn order_by(&mut self, idx: usize, op: &Operation, field: &str, direction: SortDirection) {
        let Some(col) = self.working.column_index(field) else {
            self.note(idx, op, NoOp::MissingField { field: field.to_string() });
            return;
        };

        let descending = direction == SortDirection::Desc;
        // sort_by is stable: ties keep their current order
        self.working
            .rows
            .sort_by(|a, b| compare_nulls_last(&a[col], &b[col], descending));
    }

    fn limit(&mut self, idx: usize, op: &Operation, count: i64) {
        if count <= 0 {
            self.note(idx, op, NoOp::NonPositiveLimit { count });
            return;
        }
        let count = usize::try_from(count).unwrap_or(usize::MAX);
        self.working.rows.truncate(count);
    }
}

/// Composite group key ordered like ORDER_BY ascending
#[derive(Debug)]
struct GroupKey(Vec<Value>);

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| compare_values(a, b))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| self.0.len().cmp(&other.0.len()))
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GroupKey {}

/// Fold one group's cells. Nulls are skipped. Returns the offending cell
/// when SUM or MEAN meets a non-numeric value.
fn aggregate<'v>(op: AggOp, cells: impl Iterator<Item = &'v Value>) -> Result<Value, &'v Value> {
    let present = cells.filter(|v| !v.is_null());

    match op {
        AggOp::Count => Ok(Value::from(present.count())),
        AggOp::Min => Ok(present.min_by(|a, b| compare_values(a, b)).cloned().unwrap_or(Value::Null)),
        AggOp::Max => Ok(present.max_by(|a, b| compare_values(a, b)).cloned().unwrap_or(Value::Null)),
        AggOp::Sum | AggOp::Mean => {
            let mut int_sum: Option<i64> = Some(0);
            let mut float_sum = 0.0;
            let mut n = 0usize;

            for cell in present {
                let Value::Number(num) = cell else {
                    return Err(cell);
                };
                int_sum = match (int_sum, num.as_i64()) {
                    (Some(acc), Some(x)) => acc.checked_add(x),
                    _ => None,
                };
                float_sum += num.as_f64().unwrap_or(0.0);
                n += 1;
            }

            Ok(match op {
                AggOp::Sum => match int_sum {
                    Some(total) => Value::from(total),
                    None => float_value(float_sum),
                },
                _ if n == 0 => Value::Null,
                _ => float_value(float_sum / n as f64),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cells(values: &[Value]) -> impl Iterator<Item = &Value> {
        values.iter()
    }

    #[test]
    fn test_sum_keeps_integers() {
        let values = [json!(100), json!(30), Value::Null];
        assert_eq!(aggregate(AggOp::Sum, cells(&values)), Ok(json!(130)));

        let values = [json!(1.5), json!(1)];
        assert_eq!(aggregate(AggOp::Sum, cells(&values)), Ok(json!(2.5)));

        assert_eq!(aggregate(AggOp::Sum, cells(&[])), Ok(json!(0)));
    }

    #[test]
    fn test_mean_min_max() {
        let values = [json!(1), json!(2), Value::Null, json!(6)];

        assert_eq!(aggregate(AggOp::Mean, cells(&values)), Ok(json!(3.0)));
        assert_eq!(aggregate(AggOp::Min, cells(&values)), Ok(json!(1)));
        assert_eq!(aggregate(AggOp::Max, cells(&values)), Ok(json!(6)));
        assert_eq!(aggregate(AggOp::Mean, cells(&[Value::Null])), Ok(Value::Null));
    }

    #[test]
    fn test_sum_rejects_text() {
        let values = [json!(1), json!("abc")];
        assert_eq!(aggregate(AggOp::Sum, cells(&values)), Err(&json!("abc")));
    }

    #[test]
    fn test_group_key_order() {
        let a = GroupKey(vec![json!("Busan"), json!(1)]);
        let b = GroupKey(vec![json!("Busan"), json!(1.0)]);
        let c = GroupKey(vec![json!("Seoul"), json!(0)]);

        assert_eq!(a, b);
        assert!(a < c);
    }
}
