//! Typed payload helper that validates generated stage output.
//!
//! A stage result is only accepted when every schema field is present, so
//! parsing goes straight to the typed payload: any missing or mistyped field
//! rejects the whole response.

use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::sync::OnceLock;

/// Error during stage payload validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    /// Error message.
    pub message: String,
    /// Path of the field that caused the error, if known.
    pub field: Option<String>,
}

impl SchemaError {
    /// Creates a new schema error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
        }
    }

    /// Creates a schema error for a specific field.
    #[must_use]
    pub fn for_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref field) = self.field {
            write!(f, "Field '{}': {}", field, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for SchemaError {}

fn fence_pattern() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*\n(.*?)\n?\s*```\s*$").ok())
        .as_ref()
}

/// Removes a surrounding markdown code fence, if any.
#[must_use]
pub fn strip_code_fence(raw: &str) -> &str {
    match fence_pattern()
        .and_then(|re| re.captures(raw))
        .and_then(|c| c.get(1))
    {
        Some(inner) => inner.as_str(),
        None => raw.trim(),
    }
}

/// Typed stage payload parser.
#[derive(Debug)]
pub struct TypedPayload<T> {
    label: &'static str,
    _marker: PhantomData<T>,
}

impl<T> TypedPayload<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a parser; `label` names the payload in errors.
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            _marker: PhantomData,
        }
    }

    /// Parses raw generated text into the payload.
    pub fn parse(&self, raw: &str) -> Result<T, SchemaError> {
        let body = strip_code_fence(raw);
        if body.is_empty() {
            return Err(SchemaError::new(format!("{}: empty content", self.label)));
        }

        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| SchemaError::new(format!("{}: not JSON: {}", self.label, e)))?;
        self.from_json(value)
    }

    /// Validates an already-parsed JSON value.
    pub fn from_json(&self, value: serde_json::Value) -> Result<T, SchemaError> {
        if !value.is_object() {
            return Err(SchemaError::new(format!("{}: payload must be an object", self.label)));
        }
        serde_json::from_value(value)
            .map_err(|e| SchemaError::for_field(self.label, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestPayload {
        text: String,
        count: i32,
    }

    #[test]
    fn test_schema_error_display() {
        let err = SchemaError::new("test error");
        assert_eq!(err.to_string(), "test error");

        let field_err = SchemaError::for_field("name", "is required");
        assert_eq!(field_err.to_string(), "Field 'name': is required");
    }

    #[test]
    fn test_parse_plain_json() {
        let typed: TypedPayload<TestPayload> = TypedPayload::new("test");
        let payload = typed.parse(r#"{"text": "hello", "count": 42}"#).unwrap();
        assert_eq!(payload, TestPayload { text: "hello".into(), count: 42 });
    }

    #[test]
    fn test_parse_fenced_json() {
        let typed: TypedPayload<TestPayload> = TypedPayload::new("test");
        let raw = "```json\n{\"text\": \"fenced\", \"count\": 1}\n```";
        assert_eq!(typed.parse(raw).unwrap().text, "fenced");
    }

    #[test]
    fn test_parse_empty_is_error() {
        let typed: TypedPayload<TestPayload> = TypedPayload::new("test");
        let err = typed.parse("   ").unwrap_err();
        assert!(err.message.contains("empty content"));
    }

    #[test]
    fn test_missing_field_is_error() {
        let typed: TypedPayload<TestPayload> = TypedPayload::new("test");
        let err = typed.parse(r#"{"text": "no count"}"#).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("test"));
        assert!(err.message.contains("count"));
    }

    #[test]
    fn test_non_object_is_error() {
        let typed: TypedPayload<TestPayload> = TypedPayload::new("test");
        assert!(typed.parse("[1, 2, 3]").is_err());
        assert!(typed.parse("not json at all").is_err());
    }

    #[test]
    fn test_strip_code_fence_passthrough() {
        assert_eq!(strip_code_fence("  {\"a\": 1}  "), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
    }
}
