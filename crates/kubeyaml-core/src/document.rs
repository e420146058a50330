//! YAML document model
//!
//! Parsed YAML is turned into [`Value`] trees in which every mapping is a
//! [`Document`]. Mappings keep their key order, so a manifest re-emits in the
//! order it was written. Fields are reachable by key (`doc["kind"]`), by
//! dotted path (`doc.path("spec.template.metadata.labels")`) or by
//! deserializing the document into a typed record.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::ops::{Index, IndexMut};

use crate::error::{CoreError, Result};

static NULL: Value = Value::Null;

/// Scalar style forced on a string when it is emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarStyle {
    /// `"..."` with backslash escapes
    DoubleQuoted,
    /// `|` literal block
    Literal,
}

/// A string carrying an emission style hint
///
/// The hint only changes how the string is written out; it compares equal to
/// a plain string with the same text.
#[derive(Debug, Clone)]
pub struct StyledString {
    pub text: String,
    pub style: ScalarStyle,
}

impl StyledString {
    pub fn new(text: impl Into<String>, style: ScalarStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// How a sequence was built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeqKind {
    /// Growable list (everything parsed from YAML)
    #[default]
    List,
    /// Fixed-size tuple, only created programmatically
    Tuple,
}

/// An ordered sequence of values
///
/// Both kinds are written as plain block sequences; the kind is kept so code
/// that built a tuple gets a tuple back when it reads the value.
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    kind: SeqKind,
    items: Vec<Value>,
}

impl Sequence {
    pub fn list(items: Vec<Value>) -> Self {
        Self {
            kind: SeqKind::List,
            items,
        }
    }

    pub fn tuple(items: Vec<Value>) -> Self {
        Self {
            kind: SeqKind::Tuple,
            items,
        }
    }

    pub fn kind(&self) -> SeqKind {
        self.kind
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.items.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Value> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Value> {
        self.items
    }
}

// Value equality: a tuple and a list with the same items are equal.
impl PartialEq for Sequence {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// A YAML node
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// Integers above `i64::MAX`
    UInt(u64),
    Float(f64),
    String(String),
    Styled(StyledString),
    Seq(Sequence),
    Map(Document),
}

impl Value {
    /// A string that is always emitted double-quoted
    pub fn quoted(text: impl Into<String>) -> Self {
        Value::Styled(StyledString::new(text, ScalarStyle::DoubleQuoted))
    }

    /// A string that is always emitted as a `|` literal block
    pub fn literal(text: impl Into<String>) -> Self {
        Value::Styled(StyledString::new(text, ScalarStyle::Literal))
    }

    /// Convert any serializable value into a `Value` tree
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let yaml = serde_yaml::to_value(value).map_err(|e| CoreError::Convert {
            message: e.to_string(),
        })?;
        Ok(Value::from(yaml))
    }

    /// Short name of the node kind, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::UInt(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) | Value::Styled(_) => "string",
            Value::Seq(_) => "sequence",
            Value::Map(_) => "mapping",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Styled(s) => Some(&s.text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Int(i) => u64::try_from(*i).ok(),
            Value::UInt(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::UInt(u) => Some(*u as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&Sequence> {
        match self {
            Value::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_seq_mut(&mut self) -> Option<&mut Sequence> {
        match self {
            Value::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Map(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_document_mut(&mut self) -> Option<&mut Document> {
        match self {
            Value::Map(doc) => Some(doc),
            _ => None,
        }
    }

    /// Look up a mapping key, or a sequence index written as a number
    pub fn child(&self, segment: &str) -> Option<&Value> {
        match self {
            Value::Map(doc) => doc.get(segment),
            Value::Seq(seq) => segment.parse::<usize>().ok().and_then(|i| seq.get(i)),
            _ => None,
        }
    }

    pub fn child_mut(&mut self, segment: &str) -> Option<&mut Value> {
        match self {
            Value::Map(doc) => doc.get_mut(segment),
            Value::Seq(seq) => segment
                .parse::<usize>()
                .ok()
                .and_then(|i| seq.get_mut(i)),
            _ => None,
        }
    }

    /// Convert into a `serde_yaml::Value`, dropping style hints
    pub fn to_yaml_value(&self) -> serde_yaml::Value {
        match self {
            Value::Null => serde_yaml::Value::Null,
            Value::Bool(b) => serde_yaml::Value::Bool(*b),
            Value::Int(i) => serde_yaml::Value::Number((*i).into()),
            Value::UInt(u) => serde_yaml::Value::Number((*u).into()),
            Value::Float(f) => serde_yaml::Value::Number((*f).into()),
            Value::String(s) => serde_yaml::Value::String(s.clone()),
            Value::Styled(s) => serde_yaml::Value::String(s.text.clone()),
            Value::Seq(seq) => {
                serde_yaml::Value::Sequence(seq.iter().map(Value::to_yaml_value).collect())
            }
            Value::Map(doc) => serde_yaml::Value::Mapping(doc.to_yaml_mapping()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Int(a), Value::UInt(b)) | (Value::UInt(b), Value::Int(a)) => {
                u64::try_from(*a).is_ok_and(|a| a == *b)
            }
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Seq(a), Value::Seq(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => match (self.as_str(), other.as_str()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        self.as_i64() == Some(*other)
    }
}

impl PartialEq<i32> for Value {
    fn eq(&self, other: &i32) -> bool {
        self.as_i64() == Some(i64::from(*other))
    }
}

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        self.as_bool() == Some(*other)
    }
}

impl Index<&str> for Value {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.child(key).unwrap_or(&NULL)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        match i64::try_from(u) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::UInt(u),
        }
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<StyledString> for Value {
    fn from(s: StyledString) -> Self {
        Value::Styled(s)
    }
}

impl From<Sequence> for Value {
    fn from(seq: Sequence) -> Self {
        Value::Seq(seq)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Seq(Sequence::list(items))
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Map(doc)
    }
}

impl From<serde_yaml::Value> for Value {
    fn from(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_yaml::Value::String(s) => Value::String(s),
            serde_yaml::Value::Sequence(items) => {
                Value::Seq(Sequence::list(items.into_iter().map(Value::from).collect()))
            }
            serde_yaml::Value::Mapping(mapping) => Value::Map(Document::from_yaml_mapping(mapping)),
            // Tags carry no meaning for manifests; keep the tagged node
            serde_yaml::Value::Tagged(tagged) => Value::from(tagged.value),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::UInt(u) => serializer.serialize_u64(*u),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Styled(s) => serializer.serialize_str(&s.text),
            Value::Seq(seq) => {
                let mut out = serializer.serialize_seq(Some(seq.len()))?;
                for item in seq {
                    out.serialize_element(item)?;
                }
                out.end()
            }
            Value::Map(doc) => doc.serialize(serializer),
        }
    }
}

/// One YAML mapping with insertion-ordered keys
///
/// Equality compares key by key and ignores order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    entries: IndexMap<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys that stringify to the same text (`1` and `'1'`) collapse into one
    /// entry: the later value wins and the first key keeps its position.
    pub(crate) fn from_yaml_mapping(mapping: serde_yaml::Mapping) -> Self {
        let entries = mapping
            .into_iter()
            .map(|(key, value)| (key_to_string(key), Value::from(value)))
            .collect();
        Self { entries }
    }

    /// Convert any serializable value into a document
    ///
    /// Fails with [`CoreError::Shape`] when the value is not a mapping.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        match Value::from_serialize(value)? {
            Value::Map(doc) => Ok(doc),
            other => Err(CoreError::Shape {
                index: 0,
                found: other.type_name(),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert a field, keeping the position of an existing key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove a field, preserving the order of the remaining keys
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, String, Value> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get a value by dotted path (e.g. "spec.containers.0.image")
    ///
    /// Numeric segments index into sequences.
    pub fn path(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut current = self.entries.get(first)?;
        for part in parts {
            current = current.child(part)?;
        }
        Some(current)
    }

    pub fn path_mut(&mut self, path: &str) -> Option<&mut Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut current = self.entries.get_mut(first)?;
        for part in parts {
            current = current.child_mut(part)?;
        }
        Some(current)
    }

    /// Set a value by dotted path, creating intermediate mappings
    ///
    /// Scalars met along the way are replaced by mappings. Sequences are only
    /// entered through an existing index.
    pub fn set_path(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        let parts: Vec<&str> = path.split('.').collect();
        if parts.iter().any(|part| part.is_empty()) {
            return Err(CoreError::InvalidPath {
                path: path.to_string(),
                message: "empty path segment".to_string(),
            });
        }

        let Some((head, rest)) = parts.split_first() else {
            return Err(CoreError::InvalidPath {
                path: path.to_string(),
                message: "empty path".to_string(),
            });
        };

        let slot = self
            .entries
            .entry((*head).to_string())
            .or_insert(Value::Null);
        set_nested(slot, rest, value.into(), path)
    }

    /// Deserialize the document into a typed record
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_yaml::from_value(self.to_yaml_value()).map_err(|e| CoreError::Convert {
            message: e.to_string(),
        })
    }

    pub fn to_yaml_value(&self) -> serde_yaml::Value {
        serde_yaml::Value::Mapping(self.to_yaml_mapping())
    }

    fn to_yaml_mapping(&self) -> serde_yaml::Mapping {
        self.entries
            .iter()
            .map(|(key, value)| (serde_yaml::Value::String(key.clone()), value.to_yaml_value()))
            .collect()
    }
}

impl Index<&str> for Document {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.entries.get(key).unwrap_or(&NULL)
    }
}

impl IndexMut<&str> for Document {
    /// Missing keys are inserted as null, like `serde_json::Value`
    fn index_mut(&mut self, key: &str) -> &mut Value {
        self.entries.entry(key.to_string()).or_insert(Value::Null)
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

fn set_nested(target: &mut Value, parts: &[&str], value: Value, full_path: &str) -> Result<()> {
    let Some((head, rest)) = parts.split_first() else {
        *target = value;
        return Ok(());
    };

    match target {
        Value::Seq(seq) => {
            let len = seq.len();
            let slot = head
                .parse::<usize>()
                .ok()
                .and_then(|i| seq.get_mut(i))
                .ok_or_else(|| CoreError::InvalidPath {
                    path: full_path.to_string(),
                    message: format!("`{}` is not an index into a sequence of {} items", head, len),
                })?;
            set_nested(slot, rest, value, full_path)
        }
        Value::Map(doc) => {
            let slot = doc
                .entries
                .entry((*head).to_string())
                .or_insert(Value::Null);
            set_nested(slot, rest, value, full_path)
        }
        other => {
            *other = Value::Map(Document::new());
            set_nested(other, parts, value, full_path)
        }
    }
}

/// Mapping keys are always strings; other scalar keys are printed as YAML
/// would print them, so `1` and `'1'` name the same field
fn key_to_string(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        serde_yaml::Value::Tagged(tagged) => key_to_string(tagged.value),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
