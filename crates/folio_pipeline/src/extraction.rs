//! The single JSON-extraction contract for LLM responses.
//!
//! Every stage parses model output the same way: take the span from the
//! first `{` to the last `}`, try to parse it, and hand back `None` on any
//! failure so the caller can substitute its documented fallback structure.
//! Model unpredictability is absorbed here; extraction never errors.
//!
//! Known ambiguity: when a response contains several JSON objects (for
//! example a real payload followed by an example object inside prose), the
//! outermost span covers both and parsing fails. This is accepted behavior,
//! not something callers should try to work around.

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// Extract the outermost JSON object from free-form model output.
///
/// Returns `None` when no brace pair exists or the span fails to parse.
///
/// # Examples
///
/// ```
/// use folio_pipeline::extraction::extract_json;
///
/// let response = "Here you go:\n{\"sections\": 7}\nHope this helps!";
/// let value = extract_json(response).unwrap();
/// assert_eq!(value["sections"], 7);
///
/// assert!(extract_json("no json here").is_none());
/// ```
pub fn extract_json(raw: &str) -> Option<JsonValue> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if start >= end {
        return None;
    }
    match serde_json::from_str(&raw[start..=end]) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, span_len = end - start + 1, "JSON span failed to parse");
            None
        }
    }
}

/// Extract and deserialize the outermost JSON object into `T`.
///
/// Returns `None` on extraction failure or shape mismatch; callers fall
/// back to their stage-specific defaults.
pub fn parse_json_fragment<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let value = extract_json(raw)?;
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::debug!(error = %e, "Extracted JSON did not match the expected shape");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_surrounded_by_prose() {
        let response = r#"
Sure! Based on my analysis:

{"key_findings": ["remote work is growing"], "trends": []}

Let me know if you need more detail.
"#;
        let value = extract_json(response).unwrap();
        assert_eq!(value["key_findings"][0], "remote work is growing");
    }

    #[test]
    fn test_extract_json_nested_objects() {
        let response = r#"{"outer": {"inner": {"value": 3}}}"#;
        let value = extract_json(response).unwrap();
        assert_eq!(value["outer"]["inner"]["value"], 3);
    }

    #[test]
    fn test_no_braces_returns_none() {
        assert!(extract_json("plain text, nothing structured").is_none());
        assert!(extract_json("").is_none());
    }

    #[test]
    fn test_reversed_braces_return_none() {
        assert!(extract_json("} backwards {").is_none());
    }

    #[test]
    fn test_unparseable_span_returns_none() {
        assert!(extract_json("{not valid json}").is_none());
    }

    #[test]
    fn test_two_objects_merge_into_unparseable_span() {
        // Documented ambiguity: the outermost span covers both objects
        assert!(extract_json(r#"{"a": 1} and also {"b": 2}"#).is_none());
    }

    #[test]
    fn test_parse_json_fragment_typed() {
        #[derive(serde::Deserialize)]
        struct Payload {
            count: u32,
        }

        let payload: Payload = parse_json_fragment("answer: {\"count\": 12}").unwrap();
        assert_eq!(payload.count, 12);

        let missing: Option<Payload> = parse_json_fragment("{\"other\": true}");
        assert!(missing.is_none());
    }
}
