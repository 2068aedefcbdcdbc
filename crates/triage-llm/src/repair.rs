//! Repair and parse raw oracle output into a JSON object

use serde_json::{Map, Value};
use triage_domain::OracleFailure;

/// Parse a raw completion into a JSON object
///
/// Models occasionally wrap JSON in a markdown code block even in JSON mode;
/// the fence is stripped before parsing. Anything that is not an object is a
/// failure.
pub fn parse_json_object(response: &str) -> Result<Map<String, Value>, OracleFailure> {
    let json_str = strip_code_fence(response);
    if json_str.is_empty() {
        return Err(OracleFailure::EmptyResponse(
            "No content in oracle response".to_string(),
        ));
    }

    let value: Value = serde_json::from_str(json_str)
        .map_err(|e| OracleFailure::InvalidResponse(format!("JSON parse error: {}", e)))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(OracleFailure::InvalidResponse(format!(
            "Expected JSON object, got {}",
            kind_of(&other)
        ))),
    }
}

/// Extract JSON from response, handling markdown code blocks
fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    // Skip the opening fence line (``` or ```json) and the closing fence
    let body = match trimmed.find('\n') {
        Some(idx) => &trimmed[idx + 1..],
        None => return "",
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
