//! Prompt → Plan translation
//!
//! A thin driver over an ordered detector list: the first detector that claims
//! the prompt produces the plan's table, lower-priority detectors are skipped
//! unless they are marked as unconditional, and an empty result falls back to
//! a passthrough table.

use serde::{Deserialize, Serialize};
use tabplan_ir::{Operation, Plan, PlanTable, SchemaDescriptor, DEFAULT_TABLE_ID};
use tracing::{debug, warn};

use crate::detectors::{default_detectors, Detector, PromptContext};
use crate::validator::{PromptValidator, Validation, ValidatorConfig};

/// Name reported when no detector fired
pub const FALLBACK_DETECTOR: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Row counts recognised after "top"/"상위" or before "개"/"건"/"위".
    /// Checked in order, so longer numbers must come before their prefixes.
    pub top_n_candidates: Vec<i64>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            top_n_candidates: vec![50, 20, 10, 5],
        }
    }
}

/// Plan plus what produced it
#[derive(Debug, Clone)]
pub struct Translation {
    pub plan: Plan,
    pub validation: Validation,
    /// Names of the detectors that contributed tables, in plan order
    pub fired: Vec<&'static str>,
}

pub struct PlanTranslator {
    config: TranslatorConfig,
    validator: PromptValidator,
    detectors: Vec<Box<dyn Detector>>,
}

impl PlanTranslator {
    pub fn new(config: TranslatorConfig, validator: ValidatorConfig) -> Self {
        Self::with_detectors(config, validator, default_detectors())
    }

    pub fn with_detectors(
        config: TranslatorConfig,
        validator: ValidatorConfig,
        detectors: Vec<Box<dyn Detector>>,
    ) -> Self {
        Self {
            config,
            validator: PromptValidator::new(validator),
            detectors,
        }
    }

    pub fn validator(&self) -> &PromptValidator {
        &self.validator
    }

    pub fn detector_names(&self) -> Vec<&'static str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    pub fn generate_plan(&self, prompt: &str, schema: &SchemaDescriptor) -> Plan {
        self.translate(prompt, schema).plan
    }

    pub fn translate(&self, prompt: &str, schema: &SchemaDescriptor) -> Translation {
        let validation = self.validator.validate(prompt);
        let ctx = PromptContext::new(prompt, schema, &self.config);

        let mut plan = Plan::new(validation.valid);
        let mut fired = Vec::new();

        for detector in &self.detectors {
            if !plan.tables.is_empty() && !detector.runs_unconditionally() {
                debug!(detector = detector.name(), "skipped, a higher-priority table exists");
                continue;
            }

            let Some(table) = detector.detect(&ctx) else {
                continue;
            };

            debug!(detector = detector.name(), table = %table.id, "detector fired");
            match plan.push_table(table) {
                Ok(()) => fired.push(detector.name()),
                Err(e) => warn!(detector = detector.name(), error = %e, "dropping detector output"),
            }
        }

        if plan.tables.is_empty() {
            debug!("no detector fired, using passthrough table");
            match plan.push_table(default_table()) {
                Ok(()) => fired.push(FALLBACK_DETECTOR),
                Err(e) => warn!(error = %e, "could not add passthrough table"),
            }
        }

        Translation {
            plan,
            validation,
            fired,
        }
    }
}

impl Default for PlanTranslator {
    fn default() -> Self {
        Self::new(TranslatorConfig::default(), ValidatorConfig::default())
    }
}

/// Passthrough table: an empty selection keeps every column
pub fn default_table() -> PlanTable {
    PlanTable::new(DEFAULT_TABLE_ID, "전체 데이터").then(Operation::select_all())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabplan_ir::{Aggregation, AggOp, SortDirection};

    fn sales_schema() -> SchemaDescriptor {
        SchemaDescriptor::new(["Date", "Merchant", "Region", "Category", "Amount", "Status"])
    }

    fn all_fields() -> Operation {
        Operation::select(sales_schema().columns().iter().cloned())
    }

    #[test]
    fn test_top_ten() {
        let plan = PlanTranslator::default().generate_plan("금액 top 10 보여줘", &sales_schema());

        assert_eq!(plan.tables.len(), 1);
        assert_eq!(
            plan.tables[0].operations,
            vec![
                all_fields(),
                Operation::order_by("Amount", SortDirection::Desc),
                Operation::limit(10),
            ]
        );
        assert!(plan.is_valid_request);
    }

    #[test]
    fn test_city_filter() {
        let plan = PlanTranslator::default().generate_plan("서울 지역만 필터링해줘", &sales_schema());

        assert_eq!(plan.tables.len(), 1);
        assert_eq!(plan.tables[0].operations[0], Operation::filter("Region", "Seoul"));
    }

    #[test]
    fn test_top_beats_group() {
        let translation = PlanTranslator::default().translate("지역별 매출 상위 10개 그룹", &sales_schema());

        assert_eq!(translation.fired, vec!["top_amount"]);
        assert_eq!(translation.plan.tables.len(), 1);
        assert_eq!(translation.plan.tables[0].id, "top_amount_table");
    }

    #[test]
    fn test_filter_beats_group() {
        let plan = PlanTranslator::default().generate_plan("부산 카테고리별 합계", &sales_schema());

        assert_eq!(plan.tables.len(), 1);
        assert_eq!(plan.tables[0].id, "region_filter_table");
    }

    #[test]
    fn test_group_summary() {
        let plan = PlanTranslator::default().generate_plan("카테고리별로 합계를 계산해줘", &sales_schema());

        assert_eq!(
            plan.tables[0].operations,
            vec![
                Operation::group_by(
                    vec!["Category".to_string()],
                    vec![Aggregation::new("Amount", AggOp::Sum, "합계")]
                ),
                Operation::order_by("합계", SortDirection::Desc),
            ]
        );
    }

    #[test]
    fn test_embedded_latin_word_does_not_trigger_top() {
        let translation = PlanTranslator::default().translate("laptop 카테고리별 합계", &sales_schema());

        assert_eq!(translation.fired, vec!["group_summary"]);
        assert_eq!(translation.plan.tables[0].id, "group_summary_table");
    }

    #[test]
    fn test_top_with_longer_number_has_no_limit() {
        let plan = PlanTranslator::default().generate_plan("금액 상위 15개", &sales_schema());

        assert_eq!(plan.tables[0].id, "top_amount_table");
        assert_eq!(plan.tables[0].operations.len(), 2);
        assert_eq!(plan.tables[0].operations[1], Operation::order_by("Amount", SortDirection::Desc));
    }

    #[test]
    fn test_detail_runs_after_another_table() {
        let translation = PlanTranslator::default().translate("상태별 합계와 상세 내역", &sales_schema());

        assert_eq!(translation.fired, vec!["group_summary", "detail"]);
        let ids: Vec<_> = translation.plan.table_ids().collect();
        assert_eq!(ids, vec!["group_summary_table", "detail_table"]);
        assert_eq!(translation.plan.layout.sections.len(), 2);
        assert_eq!(translation.plan.layout.sections[1].content, vec!["detail_table"]);
    }

    #[test]
    fn test_fallback_is_passthrough() {
        let translation = PlanTranslator::default().translate("hello there", &sales_schema());

        assert_eq!(translation.fired, vec![FALLBACK_DETECTOR]);
        assert_eq!(translation.plan.tables, vec![default_table()]);
        assert_eq!(translation.plan.layout.sections[0].content, vec![DEFAULT_TABLE_ID]);
        assert!(translation.plan.check().is_ok());
    }

    #[test]
    fn test_invalid_prompt_still_plans() {
        let translation = PlanTranslator::default().translate("!!!!", &sales_schema());

        assert!(!translation.validation.valid);
        assert!(!translation.plan.is_valid_request);
        assert_eq!(translation.plan.tables.len(), 1);
    }

    #[test]
    fn test_deterministic() {
        let translator = PlanTranslator::default();
        let a = translator.generate_plan("지역별 합계 상세", &sales_schema());
        let b = translator.generate_plan("지역별 합계 상세", &sales_schema());

        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_custom_detector_chain() {
        struct Never;
        impl Detector for Never {
            fn name(&self) -> &'static str {
                "never"
            }
            fn detect(&self, _ctx: &PromptContext<'_>) -> Option<PlanTable> {
                None
            }
        }

        let translator = PlanTranslator::with_detectors(
            TranslatorConfig::default(),
            ValidatorConfig::default(),
            vec![Box::new(Never)],
        );

        assert_eq!(translator.detector_names(), vec!["never"]);
        let plan = translator.generate_plan("top 10", &sales_schema());
        assert_eq!(plan.tables[0].id, DEFAULT_TABLE_ID);
    }
}
