//! Engine error types with source-annotated template diagnostics

use kubeyaml_core::CoreError;
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::suggestions::{
    AVAILABLE_FILTERS, SuggestionCategory, extract_function_name, extract_variable_name,
    find_closest_matches, suggest_iteration_fix, suggest_undefined_variable,
    suggest_unknown_filter, suggest_unknown_function,
};

/// Main engine error type
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error kind for categorizing template errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TemplateErrorKind {
    UndefinedVariable,
    UnknownFilter,
    UnknownFunction,
    SyntaxError,
    TypeError,
    InvalidOperation,
    Other,
}

/// Template error with source information
#[derive(Error, Debug, Diagnostic, Clone)]
#[error("{message}")]
#[diagnostic(code(kubeyaml::template::render))]
pub struct TemplateError {
    pub message: String,

    pub kind: TemplateErrorKind,

    /// Template source code
    #[source_code]
    pub src: NamedSource<String>,

    /// Line of the template the error points at
    #[label("error occurred here")]
    pub span: Option<SourceSpan>,

    /// Suggestion for fixing the error
    #[help]
    pub suggestion: Option<String>,
}

impl TemplateError {
    /// Build from a MiniJinja error raised while compiling `template_source`
    pub fn from_minijinja(
        err: minijinja::Error,
        template_name: &str,
        template_source: &str,
    ) -> Self {
        Self::from_minijinja_with_context(err, template_name, template_source, None)
    }

    /// Build from a MiniJinja render error, using `context` to suggest
    /// variable names that do exist
    pub fn from_minijinja_with_context(
        err: minijinja::Error,
        template_name: &str,
        template_source: &str,
        context: Option<&JsonValue>,
    ) -> Self {
        let (kind, message) = categorize_minijinja_error(&err);
        let span = err
            .line()
            .and_then(|line_num| calculate_span(template_source, line_num));
        let suggestion = generate_suggestion(&err, kind, context);

        Self {
            message,
            kind,
            src: NamedSource::new(template_name, template_source.to_string()),
            span,
            suggestion,
        }
    }

    pub fn kind(&self) -> TemplateErrorKind {
        self.kind
    }
}

/// Categorize a MiniJinja error into our error kinds
fn categorize_minijinja_error(err: &minijinja::Error) -> (TemplateErrorKind, String) {
    let msg = err.to_string();
    let msg_lower = msg.to_lowercase();
    let detailed = format!("{:#}", err);

    let kind = match err.kind() {
        minijinja::ErrorKind::UndefinedError => TemplateErrorKind::UndefinedVariable,
        minijinja::ErrorKind::UnknownFilter => TemplateErrorKind::UnknownFilter,
        minijinja::ErrorKind::UnknownFunction => TemplateErrorKind::UnknownFunction,
        minijinja::ErrorKind::SyntaxError => TemplateErrorKind::SyntaxError,
        minijinja::ErrorKind::InvalidOperation => TemplateErrorKind::InvalidOperation,
        minijinja::ErrorKind::NonPrimitive | minijinja::ErrorKind::NonKey => {
            TemplateErrorKind::TypeError
        }
        _ => {
            if msg_lower.contains("undefined") {
                TemplateErrorKind::UndefinedVariable
            } else if msg_lower.contains("not iterable") || msg_lower.contains("cannot") {
                TemplateErrorKind::TypeError
            } else {
                TemplateErrorKind::Other
            }
        }
    };

    // MiniJinja's alternate display marks the failing line:
    //    3 >   image: {{ image.tg }}
    //      i            ^^^^^^^^ undefined value
    let message = match kind {
        TemplateErrorKind::UndefinedVariable => match extract_expression_from_display(&detailed) {
            Some(expr) => format!("undefined variable `{}`", expr),
            None => msg.replace("undefined value", "undefined variable"),
        },
        TemplateErrorKind::UnknownFilter => match extract_filter_from_display(&detailed) {
            Some(filter) => format!("unknown filter `{}`", filter),
            None => msg,
        },
        _ => msg
            .replace("invalid operation: ", "")
            .replace("syntax error: ", ""),
    };

    (kind, message)
}

/// Body of the `{{ ... }}` on the marked error line
fn marked_expression(display: &str) -> Option<&str> {
    let lines: Vec<&str> = display.lines().collect();

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        let candidate = if trimmed.contains(" > ") || trimmed.starts_with("> ") {
            Some(*line)
        } else if line.contains("^^^") && i > 0 {
            Some(lines[i - 1])
        } else {
            None
        };

        if let Some(candidate) = candidate
            && let Some(start) = candidate.find("{{")
            && let Some(end) = candidate[start..].find("}}")
        {
            return Some(&candidate[start + 2..start + end]);
        }
    }

    None
}

/// Extract the variable expression (before any filter) from the detailed display
fn extract_expression_from_display(display: &str) -> Option<String> {
    let expr = marked_expression(display)?;
    let head = expr.split('|').next().unwrap_or(expr).trim();
    (!head.is_empty()).then(|| head.to_string())
}

/// Extract the last filter name from the detailed display
fn extract_filter_from_display(display: &str) -> Option<String> {
    let expr = marked_expression(display)?;
    let (_, filter_part) = expr.rsplit_once('|')?;
    filter_part
        .split(|c: char| c.is_whitespace() || c == '(')
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Calculate the source span covering line `line_num` (1-based)
fn calculate_span(source: &str, line_num: usize) -> Option<SourceSpan> {
    let mut offset = 0;

    for (index, line) in source.lines().enumerate() {
        if index + 1 == line_num {
            return Some(SourceSpan::new(offset.into(), line.len()));
        }
        offset += line.len() + 1;
    }

    None
}

/// Walk `path` through the context and suggest a sibling key where it breaks
fn suggest_missing_key(path: &str, context: &JsonValue) -> Option<String> {
    let mut current = context;
    let mut valid_parts: Vec<&str> = Vec::new();

    for part in path.split('.') {
        if let Some(next) = current.get(part) {
            valid_parts.push(part);
            current = next;
            continue;
        }

        let obj = current.as_object()?;
        let available: Vec<&str> = obj.keys().map(String::as_str).collect();
        let matches = find_closest_matches(part, &available, 3, SuggestionCategory::Property);
        let prefix = valid_parts.join(".");
        let qualify = |key: &str| {
            if prefix.is_empty() {
                format!("`{}`", key)
            } else {
                format!("`{}.{}`", prefix, key)
            }
        };

        return Some(if matches.is_empty() {
            format!(
                "Key `{}` not found. Available keys: {}",
                part,
                available.join(", ")
            )
        } else {
            let suggestions: Vec<String> = matches.iter().map(|m| qualify(&m.text)).collect();
            format!(
                "Key `{}` not found. Did you mean {}? Available: {}",
                part,
                suggestions.join(" or "),
                available.join(", ")
            )
        });
    }

    None
}

/// Generate context-aware suggestions based on error kind
fn generate_suggestion(
    err: &minijinja::Error,
    kind: TemplateErrorKind,
    context: Option<&JsonValue>,
) -> Option<String> {
    let msg = err.to_string();
    let detailed = format!("{:#}", err);

    match kind {
        TemplateErrorKind::UndefinedVariable => {
            let Some(var_name) =
                extract_expression_from_display(&detailed).or_else(|| extract_variable_name(&msg))
            else {
                return Some(
                    "Variable is not defined. Check spelling or use the `default` filter."
                        .to_string(),
                );
            };

            if var_name.contains('.')
                && let Some(hint) = context.and_then(|ctx| suggest_missing_key(&var_name, ctx))
            {
                return Some(hint);
            }

            let available: Vec<String> = context
                .and_then(JsonValue::as_object)
                .map(|obj| obj.keys().cloned().collect())
                .unwrap_or_default();

            suggest_undefined_variable(&var_name, &available).or_else(|| {
                Some(format!(
                    "Variable `{}` is not defined. Pass it in the context or use `| default(\"fallback\")`.",
                    var_name
                ))
            })
        }

        TemplateErrorKind::UnknownFilter => match extract_filter_from_display(&detailed) {
            Some(filter_name) => suggest_unknown_filter(&filter_name),
            None => Some(format!(
                "Unknown filter. Available: {}",
                AVAILABLE_FILTERS.join(", ")
            )),
        },

        TemplateErrorKind::UnknownFunction => match extract_function_name(&msg) {
            Some(func_name) => suggest_unknown_function(&func_name),
            None => Some("Unknown function. Check the function name and arguments.".to_string()),
        },

        TemplateErrorKind::SyntaxError => {
            if msg.contains('}') || msg.contains('%') {
                Some(
                    "Check bracket matching: `{{ }}` for expressions, `{% %}` for statements, `{# #}` for comments".to_string(),
                )
            } else if msg.contains("expected") {
                Some("Check for missing closing tags or mismatched brackets.".to_string())
            } else {
                None
            }
        }

        TemplateErrorKind::TypeError if msg.to_lowercase().contains("not iterable") => {
            Some(suggest_iteration_fix("object"))
        }

        _ => None,
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
