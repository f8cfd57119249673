//! Prompt pre-check
//!
//! Rejects prompts that cannot carry any intent: too short, bare Hangul jamo
//! ("ㅋㅋㅋ"), or a run of one repeated character with no intent token.
//! Validation never fails hard; callers decide whether to plan anyway.

use serde::{Deserialize, Serialize};

use crate::vocab::INTENT_TOKENS;

/// Hangul compatibility jamo block
const JAMO_START: char = '\u{3131}';
const JAMO_END: char = '\u{318E}';

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Minimum trimmed length in characters
    pub min_length: usize,
    /// Run length at which one repeated character counts as noise
    pub min_repeat: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_length: 2,
            min_repeat: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Validation {
    fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    fn rejected(reason: &str) -> Self {
        Self {
            valid: false,
            reason: Some(reason.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PromptValidator {
    config: ValidatorConfig,
}

impl PromptValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, prompt: &str) -> Validation {
        let trimmed = prompt.trim();

        if trimmed.chars().count() < self.config.min_length {
            return Validation::rejected("요청이 너무 짧습니다. 원하는 변환을 조금 더 구체적으로 입력해주세요.");
        }

        if contains_intent_token(trimmed) {
            return Validation::ok();
        }

        if is_jamo_noise(trimmed) {
            return Validation::rejected("의미를 알 수 없는 자음/모음만 입력되었습니다.");
        }

        if has_repeated_run(trimmed, self.config.min_repeat) {
            return Validation::rejected("같은 문자가 반복된 입력은 처리할 수 없습니다.");
        }

        Validation::ok()
    }
}

/// Substring match against the intent vocabulary, case-insensitive for Latin text
pub fn contains_intent_token(prompt: &str) -> bool {
    let lowered = prompt.to_lowercase();
    INTENT_TOKENS.iter().any(|tok| lowered.contains(tok))
}

fn is_jamo_noise(text: &str) -> bool {
    let mut chars = text.chars().filter(|c| !c.is_whitespace()).peekable();
    chars.peek().is_some() && chars.all(|c| (JAMO_START..=JAMO_END).contains(&c))
}

fn has_repeated_run(text: &str, min_repeat: usize) -> bool {
    if min_repeat == 0 {
        return false;
    }

    let mut prev = None;
    let mut run = 0;
    for c in text.chars() {
        if Some(c) == prev {
            run += 1;
        } else {
            prev = Some(c);
            run = 1;
        }
        if run >= min_repeat {
            return true;
        }
    }
    false
}
