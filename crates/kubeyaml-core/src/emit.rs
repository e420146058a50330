//! Block-style YAML emitter
//!
//! Documents are written in block style only; the sole flow tokens are `{}`
//! and `[]` for empty collections. Scalar styles can be forced per value with
//! [`StyledString`](crate::StyledString) or per key path with
//! [`StyleOverrides`]. Both travel in the [`EmitterConfig`] handed to each call,
//! so there is no process-wide registration.

use std::collections::HashMap;
use std::fmt;

use crate::document::{Document, ScalarStyle, Sequence, Value};

/// Default number of spaces per nesting level
pub const DEFAULT_INDENT: usize = 2;

/// Characters that may not start a plain scalar
const INDICATORS: &str = "-?:,[]{}#&*!|>'\"%@`";

/// Longest key written in `key:` form; libyaml refuses implicit keys over
/// 1024 characters
const MAX_IMPLICIT_KEY: usize = 1000;

/// Scalar styles keyed by dotted key path (e.g. `data.script`)
///
/// Items of a sequence share the path of the key holding the sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleOverrides {
    by_path: HashMap<String, ScalarStyle>,
}

impl StyleOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, style: ScalarStyle) -> Option<ScalarStyle> {
        self.by_path.insert(path.into(), style)
    }

    pub fn get(&self, path: &str) -> Option<ScalarStyle> {
        self.by_path.get(path).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}

/// Emitter settings passed to every serialize call
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterConfig {
    indent: usize,
    overrides: StyleOverrides,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EmitterConfig {
    pub fn new() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            overrides: StyleOverrides::new(),
        }
    }

    /// Set the indentation width (at least one space)
    pub fn indent(mut self, spaces: usize) -> Self {
        self.indent = spaces.max(1);
        self
    }

    /// Force a scalar style for strings found at a dotted key path
    pub fn style(mut self, path: impl Into<String>, style: ScalarStyle) -> Self {
        self.overrides.insert(path, style);
        self
    }

    /// Replace all path overrides
    pub fn overrides(mut self, overrides: StyleOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn indent_width(&self) -> usize {
        self.indent
    }

    pub fn style_overrides(&self) -> &StyleOverrides {
        &self.overrides
    }
}

/// Emit a multi-document stream, documents separated by `---`
pub fn emit_documents<'a, I>(documents: I, config: &EmitterConfig) -> String
where
    I: IntoIterator<Item = &'a Document>,
{
    let mut out = String::new();
    for (i, doc) in documents.into_iter().enumerate() {
        if i > 0 {
            out.push_str("---\n");
        }
        out.push_str(&emit_document(doc, config));
    }
    out
}

/// Emit a single document
pub fn emit_document(doc: &Document, config: &EmitterConfig) -> String {
    if doc.is_empty() {
        return "{}\n".to_string();
    }

    let mut emitter = Emitter::new(config);
    emitter.write_mapping(doc, 0, false);
    emitter.out
}

/// Emit any value as a standalone YAML node
pub fn emit_value(value: &Value, config: &EmitterConfig) -> String {
    let mut emitter = Emitter::new(config);
    match value {
        Value::Map(doc) => return emit_document(doc, config),
        Value::Seq(seq) if !seq.is_empty() => emitter.write_sequence(seq, 0, false),
        scalar => {
            emitter.write_scalar(scalar, config.indent);
            // write_scalar always leads with the separating space
            emitter.out.remove(0);
        }
    }
    emitter.out
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&emit_document(self, &EmitterConfig::default()))
    }
}

struct Emitter<'a> {
    config: &'a EmitterConfig,
    out: String,
    path: Vec<String>,
}

impl<'a> Emitter<'a> {
    fn new(config: &'a EmitterConfig) -> Self {
        Self {
            config,
            out: String::new(),
            path: Vec::new(),
        }
    }

    fn pad(&mut self, col: usize) {
        self.out.push_str(&" ".repeat(col));
    }

    fn write_mapping(&mut self, doc: &Document, col: usize, first_inline: bool) {
        for (i, (key, value)) in doc.iter().enumerate() {
            if i > 0 || !first_inline {
                self.pad(col);
            }
            let start = self.out.len();
            self.write_inline_str(key);
            if self.out.len() - start > MAX_IMPLICIT_KEY {
                self.out.insert_str(start, "? ");
                self.out.push('\n');
                self.pad(col);
            }
            self.out.push(':');

            self.path.push(key.clone());
            match value {
                Value::Map(child) if !child.is_empty() => {
                    self.out.push('\n');
                    self.write_mapping(child, col + self.config.indent, false);
                }
                Value::Seq(seq) if !seq.is_empty() => {
                    self.out.push('\n');
                    self.write_sequence(seq, col + self.config.indent, false);
                }
                scalar => self.write_scalar(scalar, col + self.config.indent),
            }
            self.path.pop();
        }
    }

    fn write_sequence(&mut self, seq: &Sequence, col: usize, first_inline: bool) {
        for (i, item) in seq.iter().enumerate() {
            if i > 0 || !first_inline {
                self.pad(col);
            }
            self.out.push('-');

            // Content after "- " sits two columns in
            match item {
                Value::Map(child) if !child.is_empty() => {
                    self.out.push(' ');
                    self.write_mapping(child, col + 2, true);
                }
                Value::Seq(inner) if !inner.is_empty() => {
                    self.out.push(' ');
                    self.write_sequence(inner, col + 2, true);
                }
                scalar => self.write_scalar(scalar, col + 2),
            }
        }
    }

    /// Write ` <scalar>\n`; block scalars put their content at `block_col`
    fn write_scalar(&mut self, value: &Value, block_col: usize) {
        match value {
            Value::Null => self.out.push_str(" null\n"),
            Value::Bool(b) => {
                self.out.push_str(if *b { " true\n" } else { " false\n" });
            }
            Value::Int(i) => {
                self.out.push(' ');
                self.out.push_str(&i.to_string());
                self.out.push('\n');
            }
            Value::UInt(u) => {
                self.out.push(' ');
                self.out.push_str(&u.to_string());
                self.out.push('\n');
            }
            Value::Float(f) => {
                self.out.push(' ');
                self.out.push_str(&format_float(*f));
                self.out.push('\n');
            }
            Value::String(s) => self.write_string(s, self.override_style(), block_col),
            Value::Styled(s) => self.write_string(&s.text, Some(s.style), block_col),
            Value::Map(_) => self.out.push_str(" {}\n"),
            Value::Seq(_) => self.out.push_str(" []\n"),
        }
    }

    fn override_style(&self) -> Option<ScalarStyle> {
        let overrides = &self.config.overrides;
        if overrides.is_empty() {
            return None;
        }
        overrides.get(&self.path.join("."))
    }

    fn write_string(&mut self, text: &str, style: Option<ScalarStyle>, block_col: usize) {
        match style {
            Some(ScalarStyle::Literal) if literal_allowed(text) => {
                self.write_literal(text, block_col);
            }
            Some(_) => {
                self.out.push(' ');
                self.write_double_quoted(text);
                self.out.push('\n');
            }
            None if text.contains('\n') && literal_allowed(text) => {
                self.write_literal(text, block_col);
            }
            None => {
                self.out.push(' ');
                self.write_inline_str(text);
                self.out.push('\n');
            }
        }
    }

    /// Plain when unambiguous, otherwise single- or double-quoted
    fn write_inline_str(&mut self, text: &str) {
        if needs_double_quotes(text) {
            self.write_double_quoted(text);
        } else if is_plain_safe(text) {
            self.out.push_str(text);
        } else {
            self.out.push('\'');
            self.out.push_str(&text.replace('\'', "''"));
            self.out.push('\'');
        }
    }

    fn write_double_quoted(&mut self, text: &str) {
        self.out.push('"');
        self.out.push_str(&escape_double_quoted(text));
        self.out.push('"');
    }

    fn write_literal(&mut self, text: &str, block_col: usize) {
        // Chomping: `-` strips the final newline, clip keeps one, `+` keeps all
        let chomping = if text.ends_with("\n\n") {
            "+"
        } else if text.ends_with('\n') {
            ""
        } else {
            "-"
        };

        self.out.push_str(" |");
        self.out.push_str(chomping);
        self.out.push('\n');

        for line in text.trim_end_matches('\n').split('\n') {
            if !line.is_empty() {
                self.pad(block_col);
                self.out.push_str(line);
            }
            self.out.push('\n');
        }

        if chomping == "+" {
            let trailing = text.len() - text.trim_end_matches('\n').len();
            for _ in 1..trailing {
                self.out.push('\n');
            }
        }
    }
}

/// Escape a string for a YAML double-quoted scalar
///
/// | input                         | output         |
/// |-------------------------------|----------------|
/// | `\`                           | `\\`           |
/// | `"`                           | `\"`           |
/// | newline, CR, tab              | `\n` `\r` `\t` |
/// | U+0085, U+2028, U+2029        | `\N` `\L` `\P` |
/// | other control chars           | `\xNN`         |
/// | U+FEFF                        | `\uFEFF`       |
/// | U+FFFE, U+FFFF                | `\uNNNN`       |
///
/// Everything else is copied through unchanged.
pub fn escape_double_quoted(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\u{85}' => result.push_str("\\N"),
            '\u{2028}' => result.push_str("\\L"),
            '\u{2029}' => result.push_str("\\P"),
            '\u{feff}' => result.push_str("\\uFEFF"),
            c if c.is_control() => result.push_str(&format!("\\x{:02X}", c as u32)),
            c if !is_printable(c) => result.push_str(&format!("\\u{:04X}", c as u32)),
            c => result.push(c),
        }
    }
    result
}

/// YAML 1.2 printable set (`c-printable`)
fn is_printable(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r' | ' '..='~' | '\u{85}' | '\u{a0}'..='\u{d7ff}'
            | '\u{e000}'..='\u{fffd}' | '\u{10000}'..='\u{10ffff}')
}

fn needs_double_quotes(s: &str) -> bool {
    s.chars().any(|c| {
        c.is_control() || !is_printable(c) || matches!(c, '\u{2028}' | '\u{2029}' | '\u{feff}')
    })
}

fn is_plain_safe(s: &str) -> bool {
    let Some(first) = s.chars().next() else {
        return false;
    };

    if first.is_whitespace() || s.ends_with(char::is_whitespace) || INDICATORS.contains(first) {
        return false;
    }

    if s.contains(": ") || s.contains(" #") || s.ends_with(':') {
        return false;
    }

    // `...` at column 0 ends the document
    if let Some(rest) = s.strip_prefix("...")
        && rest.chars().next().is_none_or(char::is_whitespace)
    {
        return false;
    }

    !resolves_to_non_string(s)
}

/// True when a YAML 1.1 or 1.2 reader would resolve the plain text to a
/// boolean, null, number, date or other non-string value
fn resolves_to_non_string(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    if matches!(
        lower.as_str(),
        "true" | "false" | "yes" | "no" | "on" | "off" | "y" | "n" | "null" | "~" | "=" | "<<"
            | ".inf" | ".nan"
    ) {
        return true;
    }

    let unsigned = lower.strip_prefix(['+', '-']).unwrap_or(&lower);
    if matches!(unsigned, ".inf" | ".nan") {
        return true;
    }

    // Numbers, dates and sexagesimals all start with a digit
    let rest = s.strip_prefix(['+', '-']).unwrap_or(s);
    let rest = rest.strip_prefix('.').unwrap_or(rest);
    rest.starts_with(|c: char| c.is_ascii_digit())
}

/// Literal blocks cannot hold non-printable characters, carriage returns or
/// whitespace-only text, and need an unindented first content line
fn literal_allowed(s: &str) -> bool {
    if s.trim().is_empty() {
        return false;
    }

    let printable = !s.chars().any(|c| {
        (c.is_control() && c != '\n' && c != '\t')
            || !is_printable(c)
            || matches!(c, '\u{2028}' | '\u{2029}' | '\u{feff}')
    });

    let first_line_flush = s
        .split('\n')
        .find(|line| !line.is_empty())
        .is_some_and(|line| !line.starts_with([' ', '\t']));

    printable && first_line_flush
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        ".nan".to_string()
    } else if f.is_infinite() {
        let token = if f > 0.0 { ".inf" } else { "-.inf" };
        token.to_string()
    } else {
        let s = f.to_string();
        if s.contains(['.', 'e', 'E']) {
            s
        } else {
            format!("{}.0", s)
        }
    }
}
