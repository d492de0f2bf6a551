//! Tolerant parsing of user supplied example text
//!
//! Example payloads are often pasted from logs or docs. The text is parsed as
//! JSON5 first; if that fails a narrow repair for missing commas is applied
//! and the parse is retried once.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::generation::GenerationError;
use crate::generation::utils::cached_regex;

static AFTER_CLOSER: OnceCell<Regex> = OnceCell::new();
static AFTER_NUMBER: OnceCell<Regex> = OnceCell::new();

/// Parses `text` as relaxed JSON, retrying once after a comma repair.
///
/// `field` names the input in the error message.
pub fn parse_tolerant(text: &str, field: &str) -> Result<Value, GenerationError> {
    let first = match json5::from_str::<Value>(text) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let repaired = repair_missing_commas(text)?;
    debug!(field, "Relaxed parse failed, retrying with repaired text");

    json5::from_str::<Value>(&repaired).map_err(|second| {
        GenerationError::invalid_input(
            field,
            format!("Invalid JSON: {first}. Repair attempt failed: {second}"),
        )
    })
}

/// Inserts `, ` before a quoted key that directly follows `}`, `]`, `"` or a number.
pub fn repair_missing_commas(text: &str) -> Result<String, GenerationError> {
    let after_closer = cached_regex(&AFTER_CLOSER, r#"([}\]"])\s*""#)?;
    let after_number = cached_regex(&AFTER_NUMBER, r#"(\d+)\s*""#)?;

    let repaired = after_closer.replace_all(text, r#"${1}, ""#);
    let repaired = after_number.replace_all(&repaired, r#"${1}, ""#);
    Ok(repaired.into_owned())
}
