//! In-memory executor for tabplan plans
//!
//! Holds the table model, the plan interpreter and the preview formatter
//! that turns a result's head rows into display-safe values.

use thiserror::Error;

mod interpreter;
pub mod preview;
mod table;
pub mod value;

pub use interpreter::{execute_plan, execute_table, Diagnostic, NoOp, PlanOutput};
pub use preview::{format_preview, PreviewConfig};
pub use table::{DataTable, TableError};

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Table '{table_id}': cannot {op} non-numeric value {value} in column '{field}'")]
    NonNumericAggregation {
        table_id: String,
        field: String,
        op: &'static str,
        value: String,
    },

    #[error("Invalid plan: {0}")]
    InvalidPlan(#[from] tabplan_ir::PlanError),
}
