//! Response parser - recovers structured JSON from free-form model output
//!
//! Models are instructed to return bare JSON but routinely wrap it in code
//! fences or surround it with prose. Recovery strategies, in order:
//! direct parse, fence-stripped parse, first-`{`-to-last-`}` extraction.
//! The first success wins; exhausting all three is a `MalformedResponse`
//! carrying the raw text. The result is only syntactically validated here —
//! the typed decode defaults every missing field rather than failing.

use super::EnhanceError;
use crate::models::{EnhancementItem, EnhancementResult, PrdEnhancementResult};
use regex::Regex;
use serde_json::Value;

/// Recover a JSON value from a raw model reply
pub fn extract_json(text: &str) -> Result<Value, EnhanceError> {
    // Attempt 1: direct parse
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Ok(value);
    }

    // Attempt 2: strip a single markdown code fence
    let open = Regex::new(r"(?m)^```(?:json)?\s*").unwrap();
    let stripped = open.replacen(text, 1, "");
    let close = Regex::new(r"(?m)\s*```\s*$").unwrap();
    let stripped = close.replacen(&stripped, 1, "");
    if let Ok(value) = serde_json::from_str::<Value>(stripped.trim()) {
        return Ok(value);
    }

    // Attempt 3: first '{' to last '}'
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if end > start {
            if let Ok(value) = serde_json::from_str::<Value>(&text[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(EnhanceError::MalformedResponse {
        raw: text.to_string(),
    })
}

/// Parse a model reply into a code review enhancement result
pub fn parse_review_response(text: &str) -> Result<EnhancementResult, EnhanceError> {
    let value = extract_json(text)?;
    serde_json::from_value(value).map_err(|_| EnhanceError::MalformedResponse {
        raw: text.to_string(),
    })
}

/// Parse a model reply into a PRD enhancement result
pub fn parse_prd_response(text: &str) -> Result<PrdEnhancementResult, EnhanceError> {
    let value = extract_json(text)?;
    serde_json::from_value(value).map_err(|_| EnhanceError::MalformedResponse {
        raw: text.to_string(),
    })
}

fn strip_marker(flag: &str) -> String {
    flag.trim_start_matches('⚑').trim().to_string()
}

fn strip_items(items: &mut [EnhancementItem]) {
    for item in items {
        for flag in &mut item.flags {
            *flag = strip_marker(flag);
        }
    }
}

/// Remove the decorative `⚑ ` prefix some replies put on flags. Used on the
/// manual paste path, where the text went through a chat UI first.
pub fn strip_flag_markers(result: &mut EnhancementResult) {
    strip_items(&mut result.requirements);
    strip_items(&mut result.gaps);
    strip_items(&mut result.recommendations);
}

/// PRD variant of [`strip_flag_markers`], covering scalar sections too
pub fn strip_prd_flag_markers(result: &mut PrdEnhancementResult) {
    for section in [
        &mut result.sections.overview,
        &mut result.sections.problem_statement,
        &mut result.sections.objective,
        &mut result.sections.notes,
    ]
    .into_iter()
    .flatten()
    {
        for flag in &mut section.flags {
            *flag = strip_marker(flag);
        }
    }
    strip_items(&mut result.success_metrics);
    strip_items(&mut result.requirements);
    strip_items(&mut result.out_of_scope);
    strip_items(&mut result.open_questions);
    strip_items(&mut result.scenarios);
}
