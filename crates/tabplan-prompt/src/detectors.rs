//! Intent detectors
//!
//! Each detector inspects a prompt against the table schema and either claims
//! it by producing one plan table or passes. Detectors are pure; ordering and
//! first-match semantics live in the translator.

use tabplan_ir::{Aggregation, AggOp, Operation, PlanTable, SchemaDescriptor, SortDirection};

use crate::translator::TranslatorConfig;
use crate::vocab::*;

/// Everything a detector may look at
pub struct PromptContext<'a> {
    pub prompt: &'a str,
    lowered: String,
    pub schema: &'a SchemaDescriptor,
    pub config: &'a TranslatorConfig,
}

impl<'a> PromptContext<'a> {
    pub fn new(prompt: &'a str, schema: &'a SchemaDescriptor, config: &'a TranslatorConfig) -> Self {
        Self {
            prompt,
            lowered: prompt.to_lowercase(),
            schema,
            config,
        }
    }

    /// Token test; `token` must already be lowercase
    ///
    /// A Latin letter or digit at either end of `token` must not continue into
    /// a neighbouring character of the same kind, so `top` is not found in
    /// `laptop` and `5개` is not found in `15개`. Hangul matches anywhere.
    pub fn mentions(&self, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        self.lowered.match_indices(token).any(|(start, _)| {
            let before = self.lowered[..start].chars().next_back();
            let after = self.lowered[start + token.len()..].chars().next();
            !joins(before, token.chars().next()) && !joins(token.chars().next_back(), after)
        })
    }

    pub fn mentions_any(&self, tokens: &[&str]) -> bool {
        tokens.iter().any(|t| self.mentions(t))
    }

    /// Stored value for the first listed token found in the prompt
    pub fn first_value(&self, values: &[(&str, &'static str)]) -> Option<&'static str> {
        values
            .iter()
            .find(|(token, _)| self.mentions(token))
            .map(|(_, value)| *value)
    }

    /// Explicit row count such as "top 10" or "10개", from the configured candidates
    pub fn requested_count(&self) -> Option<i64> {
        self.config.top_n_candidates.iter().copied().find(|n| {
            COUNT_SUFFIXES
                .iter()
                .any(|suffix| self.mentions(&format!("{}{}", n, suffix)))
                || COUNT_PREFIXES
                    .iter()
                    .any(|prefix| self.mentions(&format!("{}{}", prefix, n)))
        })
    }

    fn select_all(&self) -> Operation {
        Operation::select(self.schema.columns().iter().cloned())
    }
}

/// Whether two adjacent characters belong to the same Latin word or number
fn joins(left: Option<char>, right: Option<char>) -> bool {
    match (left, right) {
        (Some(l), Some(r)) => {
            (l.is_ascii_alphabetic() && r.is_ascii_alphabetic()) || (l.is_ascii_digit() && r.is_ascii_digit())
        }
        _ => false,
    }
}

/// A single heuristic rule in the translator chain
pub trait Detector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the rule still fires after a higher-priority rule produced a table
    fn runs_unconditionally(&self) -> bool {
        false
    }

    fn detect(&self, ctx: &PromptContext<'_>) -> Option<PlanTable>;
}

/// Rows with the largest amount first, optionally cut to an explicit N
pub struct TopAmountDetector;

impl Detector for TopAmountDetector {
    fn name(&self) -> &'static str {
        "top_amount"
    }

    fn detect(&self, ctx: &PromptContext<'_>) -> Option<PlanTable> {
        let amount = ctx.schema.find_column(AMOUNT_COLUMN)?;
        if !ctx.mentions_any(TOP_PHRASES) {
            return None;
        }

        let count = ctx.requested_count();
        let title = match count {
            Some(n) => format!("{} 상위 {}건", amount, n),
            None => format!("{} 높은 순", amount),
        };

        let mut table = PlanTable::new("top_amount_table", title)
            .then(ctx.select_all())
            .then(Operation::order_by(amount, SortDirection::Desc));
        if let Some(n) = count {
            table = table.then(Operation::limit(n));
        }
        Some(table)
    }
}

/// Equality filter on a categorical column with a closed list of values
pub struct CategoricalFilterDetector {
    name: &'static str,
    table_id: &'static str,
    label: &'static str,
    column_keywords: &'static [&'static str],
    values: &'static [(&'static str, &'static str)],
}

impl CategoricalFilterDetector {
    pub fn region() -> Self {
        Self {
            name: "region_filter",
            table_id: "region_filter_table",
            label: "지역",
            column_keywords: REGION_COLUMN,
            values: REGION_VALUES,
        }
    }

    pub fn category() -> Self {
        Self {
            name: "category_filter",
            table_id: "category_filter_table",
            label: "카테고리",
            column_keywords: CATEGORY_COLUMN,
            values: CATEGORY_VALUES,
        }
    }

    pub fn payment() -> Self {
        Self {
            name: "payment_filter",
            table_id: "payment_filter_table",
            label: "결제수단",
            column_keywords: PAYMENT_COLUMN,
            values: PAYMENT_VALUES,
        }
    }
}

impl Detector for CategoricalFilterDetector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn detect(&self, ctx: &PromptContext<'_>) -> Option<PlanTable> {
        let column = ctx.schema.find_column(self.column_keywords)?;
        let value = ctx.first_value(self.values)?;

        Some(
            PlanTable::new(self.table_id, format!("{} 필터: {}", self.label, value))
                .then(Operation::filter(column, value))
                .then(ctx.select_all()),
        )
    }
}

/// Group by a resolved key and total the amount column, or count rows
pub struct GroupSummaryDetector;

impl GroupSummaryDetector {
    fn group_key<'s>(ctx: &PromptContext<'s>) -> Option<&'s str> {
        let schema: &'s SchemaDescriptor = ctx.schema;
        GROUP_SUFFIXES
            .iter()
            .filter(|(suffix, _)| ctx.mentions(suffix))
            .find_map(|(_, keywords)| schema.find_column(keywords))
            .or_else(|| schema.find_column(GENERIC_GROUP_COLUMN))
            .or_else(|| schema.columns().first().map(String::as_str))
    }
}

impl Detector for GroupSummaryDetector {
    fn name(&self) -> &'static str {
        "group_summary"
    }

    fn detect(&self, ctx: &PromptContext<'_>) -> Option<PlanTable> {
        if !ctx.mentions_any(AGGREGATE_PHRASES) {
            return None;
        }

        let key = Self::group_key(ctx)?;
        let amount = ctx.schema.find_column(AMOUNT_COLUMN).filter(|col| *col != key);

        let (aggregation, label) = match amount {
            Some(amount) => (Aggregation::new(amount, AggOp::Sum, SUM_LABEL), SUM_LABEL),
            None => (Aggregation::new(key, AggOp::Count, COUNT_LABEL), COUNT_LABEL),
        };

        Some(
            PlanTable::new("group_summary_table", format!("{}별 {}", key, label))
                .then(Operation::group_by(vec![key.to_string()], vec![aggregation]))
                .then(Operation::order_by(label, SortDirection::Desc)),
        )
    }
}

/// Fixed detail columns, newest (or largest) first
pub struct DetailDetector;

impl Detector for DetailDetector {
    fn name(&self) -> &'static str {
        "detail"
    }

    fn runs_unconditionally(&self) -> bool {
        true
    }

    fn detect(&self, ctx: &PromptContext<'_>) -> Option<PlanTable> {
        if !ctx.mentions_any(DETAIL_PHRASES) {
            return None;
        }

        let fields: Vec<&str> = DETAIL_FIELDS
            .iter()
            .copied()
            .filter(|field| ctx.schema.mentions(field))
            .collect();
        let first = *fields.first()?;

        Some(
            PlanTable::new("detail_table", "상세 내역")
                .then(Operation::select(fields.iter().copied()))
                .then(Operation::order_by(first, SortDirection::Desc)),
        )
    }
}

/// Detectors in priority order
pub fn default_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(TopAmountDetector),
        Box::new(CategoricalFilterDetector::region()),
        Box::new(CategoricalFilterDetector::category()),
        Box::new(CategoricalFilterDetector::payment()),
        Box::new(GroupSummaryDetector),
        Box::new(DetailDetector),
    ]
}
