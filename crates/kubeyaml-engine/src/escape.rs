//! Multiline string quoting for template variables
//!
//! A raw multiline value substituted into `key: {{ value }}` would spill onto
//! the following lines and corrupt the YAML structure. Such values are turned
//! into one double-quoted scalar before rendering.

use kubeyaml_core::{TemplateContext, escape_double_quoted};
use serde_json::Value as JsonValue;

/// Quote a string containing a newline as a YAML double-quoted scalar
///
/// Returns `None` for single-line strings, which are substituted as-is. The
/// escape table is the one of [`escape_double_quoted`].
pub fn escape_multiline(value: &str) -> Option<String> {
    value
        .contains('\n')
        .then(|| format!("\"{}\"", escape_double_quoted(value)))
}

/// Copy of `context` with every multiline top-level string quoted
pub fn escape_context(context: &TemplateContext) -> TemplateContext {
    let mut escaped = context.clone();
    for (_, value) in escaped.iter_mut() {
        if let JsonValue::String(s) = value
            && let Some(quoted) = escape_multiline(s)
        {
            *s = quoted;
        }
    }
    escaped
}
