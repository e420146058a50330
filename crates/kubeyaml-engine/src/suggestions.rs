//! Fuzzy matching for template error hints
//!
//! Misspelled variables, filters and functions are matched against what is
//! actually available using Levenshtein distance.

use serde_json::Value as JsonValue;

/// Maximum Levenshtein distance to consider for suggestions
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// All filters registered in the engine
pub const AVAILABLE_FILTERS: &[&str] = &[
    // kubeyaml filters
    "toyaml",
    "tojson",
    "b64encode",
    "b64decode",
    "quote",
    "squote",
    "nindent",
    "indent",
    "required",
    // MiniJinja builtins
    "default",
    "upper",
    "lower",
    "title",
    "capitalize",
    "replace",
    "trim",
    "join",
    "first",
    "last",
    "length",
    "reverse",
    "sort",
    "unique",
    "map",
    "select",
    "reject",
    "selectattr",
    "rejectattr",
    "batch",
    "slice",
    "dictsort",
    "items",
    "attr",
    "int",
    "float",
    "abs",
    "round",
    "string",
    "list",
    "bool",
    "safe",
    "escape",
    "urlencode",
];

/// Global functions available in templates (MiniJinja builtins)
pub const AVAILABLE_FUNCTIONS: &[&str] = &["range", "lipsum", "dict", "cycler", "joiner", "namespace"];

#[derive(Debug, Clone)]
pub struct Suggestion {
    pub text: String,
    /// Levenshtein distance (lower = better match)
    pub distance: usize,
    pub category: SuggestionCategory,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SuggestionCategory {
    Variable,
    Filter,
    Function,
    Property,
}

pub fn levenshtein(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Find closest matches from a list of candidates, best first
pub fn find_closest_matches(
    input: &str,
    candidates: &[&str],
    max_results: usize,
    category: SuggestionCategory,
) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = levenshtein(input, candidate);
            (distance > 0 && distance <= MAX_SUGGESTION_DISTANCE).then(|| Suggestion {
                text: candidate.to_string(),
                distance,
                category,
            })
        })
        .collect();

    suggestions.sort_by_key(|s| s.distance);
    suggestions.truncate(max_results);
    suggestions
}

fn did_you_mean(matches: &[Suggestion]) -> String {
    let quoted: Vec<String> = matches.iter().map(|s| format!("`{}`", s.text)).collect();
    format!("Did you mean {}?", quoted.join(" or "))
}

/// Suggest corrections for an undefined variable
pub fn suggest_undefined_variable(
    variable_name: &str,
    available_variables: &[String],
) -> Option<String> {
    let root = variable_name.split('.').next().unwrap_or(variable_name);
    let candidates: Vec<&str> = available_variables.iter().map(String::as_str).collect();
    let matches = find_closest_matches(root, &candidates, 3, SuggestionCategory::Variable);

    (!matches.is_empty()).then(|| did_you_mean(&matches))
}

/// Suggest corrections for an unknown filter
pub fn suggest_unknown_filter(filter_name: &str) -> Option<String> {
    let matches = find_closest_matches(filter_name, AVAILABLE_FILTERS, 3, SuggestionCategory::Filter);

    if matches.is_empty() {
        Some(format!(
            "Unknown filter `{}`. Common filters: toyaml, tojson, b64encode, quote, default, indent, nindent",
            filter_name
        ))
    } else {
        Some(did_you_mean(&matches))
    }
}

/// Suggest corrections for an unknown function
pub fn suggest_unknown_function(func_name: &str) -> Option<String> {
    let matches = find_closest_matches(
        func_name,
        AVAILABLE_FUNCTIONS,
        3,
        SuggestionCategory::Function,
    );

    if matches.is_empty() {
        Some(format!(
            "Unknown function `{}`. Available functions: {}",
            func_name,
            AVAILABLE_FUNCTIONS.join(", ")
        ))
    } else {
        Some(did_you_mean(&matches))
    }
}

/// Keys of the object found at dotted `path` inside `values`
pub fn extract_available_keys(values: &JsonValue, path: &str) -> Vec<String> {
    let mut current = values;
    for part in path.split('.').filter(|s| !s.is_empty()) {
        match current.get(part) {
            Some(v) => current = v,
            None => return vec![],
        }
    }

    match current {
        JsonValue::Object(map) => map.keys().cloned().collect(),
        _ => vec![],
    }
}

/// Type-specific hint for iteration errors
pub fn suggest_iteration_fix(type_name: &str) -> String {
    match type_name {
        "object" | "map" => {
            "Objects require `| dictsort` to iterate: `{% for key, value in obj | dictsort %}`"
                .to_string()
        }
        "string" => {
            "Strings iterate character by character. Did you mean to split it first?".to_string()
        }
        "null" | "none" => {
            "Value is null/undefined. Check that it exists or use `| default([])` for empty list"
                .to_string()
        }
        _ => format!(
            "Value of type `{}` is not iterable. Use a list or add `| dictsort` for objects",
            type_name
        ),
    }
}

/// First quoted name in an error message (`foo`, 'foo' or "foo")
pub fn extract_variable_name(msg: &str) -> Option<String> {
    ['`', '\'', '"'].into_iter().find_map(|quote| {
        let (_, rest) = msg.split_once(quote)?;
        let (name, _) = rest.split_once(quote)?;
        Some(name.to_string())
    })
}

pub fn extract_function_name(msg: &str) -> Option<String> {
    extract_variable_name(msg)
}
