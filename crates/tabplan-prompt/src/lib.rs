//! Tabplan prompt layer - validation and prompt-to-plan translation
//!
//! Turns free text (mixed Korean/English) plus a table schema into a
//! [`tabplan_ir::Plan`] using fixed keyword heuristics.

pub mod detectors;
mod translator;
mod validator;
pub mod vocab;

pub use detectors::{Detector, PromptContext};
pub use translator::{default_table, PlanTranslator, Translation, TranslatorConfig, FALLBACK_DETECTOR};
pub use validator::{contains_intent_token, PromptValidator, Validation, ValidatorConfig};

use tabplan_ir::{Plan, SchemaDescriptor};

/// Validate a prompt with default thresholds
pub fn validate(prompt: &str) -> Validation {
    PromptValidator::default().validate(prompt)
}

/// Translate a prompt with the default detector chain
pub fn generate_plan(prompt: &str, schema: &SchemaDescriptor) -> Plan {
    PlanTranslator::default().generate_plan(prompt, schema)
}
