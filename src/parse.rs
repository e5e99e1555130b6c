//! Best-effort parsing of the model's free-text reply.

use crate::agent::AnalysisError;
use crate::analysis::AnalysisRecord;
use serde_json::Value;

/// Parse a raw model reply into a normalized record.
///
/// Tolerates Markdown code fences and chatter around the JSON object. On
/// failure the error carries the untouched reply for inspection.
pub fn parse_reply(raw: &str) -> Result<AnalysisRecord, AnalysisError> {
    let cleaned = strip_markdown_json(raw);

    let value = match serde_json::from_str::<Value>(&cleaned) {
        Ok(value) => value,
        Err(first_err) => match extract_json_object(&cleaned)
            .and_then(|candidate| serde_json::from_str::<Value>(candidate).ok())
        {
            Some(value) => {
                tracing::debug!("reply parsed after trimming text around the JSON object");
                value
            }
            None => return Err(parse_failure(raw, first_err.to_string())),
        },
    };

    if !value.is_object() {
        return Err(parse_failure(
            raw,
            format!("expected a JSON object, got {}", value_kind(&value)),
        ));
    }

    Ok(AnalysisRecord::from_value(&value))
}

fn parse_failure(raw: &str, reason: String) -> AnalysisError {
    tracing::warn!(%reason, "model reply is not valid analysis JSON");
    AnalysisError::Parse {
        raw: raw.to_string(),
        reason,
    }
}

/// Strip markdown code block wrappers from JSON response
fn strip_markdown_json(text: &str) -> String {
    let trimmed = text.trim();

    // Remove ```json ... ``` or ``` ... ```
    if let Some(without_fence) = trimmed.strip_prefix("```") {
        let without_prefix = without_fence
            .strip_prefix("json")
            .or_else(|| without_fence.strip_prefix("JSON"))
            .unwrap_or(without_fence);

        if let Some(end_idx) = without_prefix.rfind("```") {
            return without_prefix[..end_idx].trim().to_string();
        }
        return without_prefix.trim().to_string();
    }

    trimmed.to_string()
}

/// Extract the outermost `{ ... }` substring from text with a preamble
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
