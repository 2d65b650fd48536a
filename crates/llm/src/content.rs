//! Prompt → parse → validate → fallback plumbing shared by every generator.

use serde_json::Value;

use crate::client::{CompletionClient, CompletionRequest};
use crate::error::LlmError;
use crate::usage::TokenUsage;

/// Generated content: either from the model or a deterministic template.
#[derive(Debug, Clone, PartialEq)]
pub enum Generated<T> {
    Ai { content: T, usage: TokenUsage },
    Fallback { content: T, reason: String },
}

impl<T> Generated<T> {
    pub fn content(&self) -> &T {
        match self {
            Self::Ai { content, .. } | Self::Fallback { content, .. } => content,
        }
    }

    pub fn into_content(self) -> T {
        match self {
            Self::Ai { content, .. } | Self::Fallback { content, .. } => content,
        }
    }

    /// Token usage, only for model-produced content.
    pub fn usage(&self) -> Option<TokenUsage> {
        match self {
            Self::Ai { usage, .. } => Some(*usage),
            Self::Fallback { .. } => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Run `request`, then `parse` the reply; any failure yields `fallback()`.
pub(crate) async fn generate<T>(
    client: &dyn CompletionClient,
    kind: &str,
    request: CompletionRequest,
    parse: impl FnOnce(&str) -> Result<T, LlmError>,
    fallback: impl FnOnce() -> T,
) -> Generated<T> {
    if !client.is_configured() {
        return Generated::Fallback {
            content: fallback(),
            reason: LlmError::NotConfigured.to_string(),
        };
    }
    let result = match client.complete(request).await {
        Ok(completion) => parse(&completion.text).map(|content| (content, completion.usage)),
        Err(e) => Err(e),
    };
    match result {
        Ok((content, usage)) => Generated::Ai { content, usage },
        Err(e) => {
            tracing::warn!("{kind} generation fell back to template: {e}");
            Generated::Fallback {
                content: fallback(),
                reason: e.to_string(),
            }
        }
    }
}

// ─── JSON extraction ─────────────────────────────────────────────────────────

/// Parse the JSON payload of a model reply.
///
/// Code fences are stripped and the outermost `{…}` or `[…]` span is taken,
/// so surrounding prose does not break parsing.
pub fn extract_json(raw: &str) -> Result<Value, LlmError> {
    let trimmed = strip_code_fence(raw.trim());
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() || value.is_array() {
            return Ok(value);
        }
    }

    let object = span(trimmed, '{', '}');
    let array = span(trimmed, '[', ']');
    // Whichever structure opens first is the outer one.
    let candidates = match (object, array) {
        (Some(o), Some(a)) if a.0 < o.0 => [Some(a), Some(o)],
        (o, a) => [o, a],
    };
    for (start, end) in candidates.into_iter().flatten() {
        if let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
            return Ok(value);
        }
    }
    Err(LlmError::InvalidJson(truncate_chars(trimmed, 120)))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening fence line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn span(text: &str, open: char, close: char) -> Option<(usize, usize)> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then_some((start, end))
}

// ─── Field rules ─────────────────────────────────────────────────────────────

/// Truncate to at most `max` characters, ending with `…` when shortened.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max - 1).collect();
    out = out.trim_end().to_string();
    out.push('…');
    out
}

/// A required, non-empty string field, truncated to `max` characters.
pub(crate) fn required_str(
    value: &Value,
    field: &'static str,
    max: usize,
) -> Result<String, LlmError> {
    optional_str(value, field, max).ok_or(LlmError::MissingField(field))
}

/// An optional string field; blank values read as absent.
pub(crate) fn optional_str(value: &Value, field: &str, max: usize) -> Option<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| truncate_chars(s, max))
}

/// Exactly `count` non-empty strings from a JSON array (or `{"questions": [...]}`).
pub(crate) fn string_list(
    value: &Value,
    count: usize,
    max: usize,
) -> Result<Vec<String>, LlmError> {
    let items = value
        .as_array()
        .or_else(|| value.get("questions").and_then(Value::as_array))
        .ok_or(LlmError::MissingField("questions"))?;
    let list: Vec<String> = items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(count)
        .map(|s| truncate_chars(s, max))
        .collect();
    if list.len() < count {
        return Err(LlmError::MissingField("questions"));
    }
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fenced_json() {
        let raw = "```json\n{\"subject\": \"Hi\"}\n```";
        assert_eq!(extract_json(raw).unwrap()["subject"], "Hi");
    }

    #[test]
    fn extracts_json_surrounded_by_prose() {
        let raw = "Sure! Here it is: {\"a\": {\"b\": 1}} Hope that helps.";
        assert_eq!(extract_json(raw).unwrap()["a"]["b"], 1);

        let raw = "Questions:\n[\"One?\", \"Two?\"]\nDone";
        assert_eq!(extract_json(raw).unwrap()[1], "Two?");
    }

    #[test]
    fn array_wrapping_objects_is_kept_whole() {
        let raw = "[{\"q\": 1}, {\"q\": 2}]";
        assert_eq!(extract_json(raw).unwrap().as_array().unwrap().len(), 2);
    }

    #[test]
    fn rejects_non_json() {
        assert!(matches!(
            extract_json("no json here"),
            Err(LlmError::InvalidJson(_))
        ));
        assert!(extract_json("\"just a string\"").is_err());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("héllo wörld", 6), "héllo…");
        assert_eq!(truncate_chars("abcdef", 4).chars().count(), 4);
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn required_fields_must_be_non_empty() {
        let v = serde_json::json!({"subject": "  ", "greeting": "Hello"});
        assert!(matches!(
            required_str(&v, "subject", 80),
            Err(LlmError::MissingField("subject"))
        ));
        assert_eq!(required_str(&v, "greeting", 80).unwrap(), "Hello");
        assert_eq!(optional_str(&v, "quote", 80), None);
    }

    #[test]
    fn string_list_needs_enough_entries() {
        let v = serde_json::json!(["a", "", "b", "c", "d"]);
        assert_eq!(string_list(&v, 3, 150).unwrap(), vec!["a", "b", "c"]);
        let v = serde_json::json!({"questions": ["a", "b"]});
        assert!(string_list(&v, 3, 150).is_err());
    }
}
