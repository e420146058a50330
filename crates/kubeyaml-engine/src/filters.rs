//! Manifest-oriented template filters
//!
//! These extend MiniJinja's builtins with the helpers Kubernetes manifests
//! keep needing: structured output, quoting, indentation and base64.

use base64::Engine as _;
use kubeyaml_core::{EmitterConfig, Value as YamlValue};
use minijinja::{Error, ErrorKind, Value};

fn invalid(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::InvalidOperation, message.into())
}

/// Render a value as block YAML, without a trailing newline
///
/// Usage: {{ resources | toyaml | nindent(4) }}
pub fn toyaml(value: Value) -> Result<String, Error> {
    let yaml = YamlValue::from_serialize(&value).map_err(|e| invalid(e.to_string()))?;
    let text = kubeyaml_core::emit::emit_value(&yaml, &EmitterConfig::default());
    Ok(text.trim_end().to_string())
}

/// Render a value as compact JSON
///
/// Usage: {{ config | tojson }}
pub fn tojson(value: Value) -> Result<String, Error> {
    serde_json::to_string(&value).map_err(|e| invalid(e.to_string()))
}

/// Usage: {{ password | b64encode }}
#[must_use]
pub fn b64encode(value: String) -> String {
    base64::engine::general_purpose::STANDARD.encode(value.as_bytes())
}

/// Usage: {{ encoded | b64decode }}
pub fn b64decode(value: String) -> Result<String, Error> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(value.as_bytes())
        .map_err(|e| invalid(format!("base64 decode error: {}", e)))?;

    String::from_utf8(decoded).map_err(|e| invalid(format!("UTF-8 decode error: {}", e)))
}

fn display_string(value: &Value) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}

/// Wrap in double quotes, escaping backslashes and quotes
///
/// Usage: {{ name | quote }}
#[must_use]
pub fn quote(value: Value) -> String {
    let s = display_string(&value);
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Wrap in single quotes, doubling embedded single quotes
#[must_use]
pub fn squote(value: Value) -> String {
    format!("'{}'", display_string(&value).replace('\'', "''"))
}

/// Indent every non-empty line by `spaces`
///
/// Usage: {{ script | indent(4) }}
#[must_use]
pub fn indent(value: String, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    value
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Like [`indent`], preceded by a newline
///
/// Usage: {{ labels | toyaml | nindent(4) }}
#[must_use]
pub fn nindent(value: String, spaces: usize) -> String {
    format!("\n{}", indent(value, spaces))
}

/// Fail rendering when the value is missing, null or an empty string
///
/// Usage: {{ image | required("image is required") }}
pub fn required(value: Value, message: Option<String>) -> Result<Value, Error> {
    if value.is_undefined() || value.is_none() {
        return Err(invalid(
            message.unwrap_or_else(|| "required value is missing".to_string()),
        ));
    }

    if value.as_str().is_some_and(str::is_empty) {
        return Err(invalid(
            message.unwrap_or_else(|| "required value is empty".to_string()),
        ));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toyaml_mapping() {
        let value = Value::from_serialize(serde_json::json!({
            "app": "web",
            "tier": "frontend"
        }));
        assert_eq!(toyaml(value).unwrap(), "app: web\ntier: frontend");
    }

    #[test]
    fn test_toyaml_quotes_ambiguous_strings() {
        let value = Value::from_serialize(serde_json::json!({"enabled": "yes"}));
        assert_eq!(toyaml(value).unwrap(), "enabled: 'yes'");
    }

    #[test]
    fn test_tojson() {
        let value = Value::from_serialize(serde_json::json!({"a": [1, 2]}));
        assert_eq!(tojson(value).unwrap(), r#"{"a":[1,2]}"#);
    }

    #[test]
    fn test_b64_round_trip() {
        let encoded = b64encode("hello".to_string());
        assert_eq!(encoded, "aGVsbG8=");
        assert_eq!(b64decode(encoded).unwrap(), "hello");
        assert!(b64decode("not base64!".to_string()).is_err());
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote(Value::from("hello")), "\"hello\"");
        assert_eq!(quote(Value::from("say \"hi\"")), "\"say \\\"hi\\\"\"");
        assert_eq!(quote(Value::from(8080)), "\"8080\"");
    }

    #[test]
    fn test_squote() {
        assert_eq!(squote(Value::from("it's")), "'it''s'");
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent("a\nb".to_string(), 2), "  a\n  b");
        assert_eq!(indent("a\n\nb".to_string(), 2), "  a\n\n  b");
    }

    #[test]
    fn test_nindent() {
        assert_eq!(nindent("a: 1\nb: 2".to_string(), 4), "\n    a: 1\n    b: 2");
    }

    #[test]
    fn test_required() {
        assert!(required(Value::from("x"), None).is_ok());
        assert!(required(Value::from(0), None).is_ok());
        assert!(required(Value::UNDEFINED, None).is_err());
        assert!(required(Value::from(()), None).is_err());

        let err = required(Value::from(""), Some("name needed".to_string())).unwrap_err();
        assert!(err.to_string().contains("name needed"));
    }
}
