//! Ordered multi-document YAML collections

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::document::{Document, Value};
use crate::emit::{EmitterConfig, emit_documents};
use crate::error::{CoreError, Result};
use crate::paths::expand_tilde;
use crate::scoped::{ScopedFile, with_scoped_file};

/// File name prefix for scoped collection files (`kube-<uuid4>.yml`)
pub const TEMP_FILE_PREFIX: &str = "kube";

/// The documents of one YAML stream, in stream order
///
/// The set of documents is fixed once built; their contents stay mutable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentList {
    documents: Vec<Document>,
}

impl DocumentList {
    /// Parse every document of a `---` separated stream
    ///
    /// Empty documents are skipped. Any other document that is not a mapping,
    /// an explicit `null` or `~` included, fails with [`CoreError::Shape`].
    pub fn from_yaml(text: &str) -> Result<Self> {
        let mut documents = Vec::new();

        for (index, de) in serde_yaml::Deserializer::from_str(text).enumerate() {
            let value = Value::from(serde_yaml::Value::deserialize(de)?);
            match value {
                Value::Null if !has_content(text, index) => continue,
                Value::Map(doc) => documents.push(doc),
                other => {
                    return Err(CoreError::Shape {
                        index,
                        found: other.type_name(),
                    });
                }
            }
        }

        tracing::debug!(documents = documents.len(), "parsed YAML stream");
        Ok(Self { documents })
    }

    /// Load documents from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = expand_tilde(path);
        let content = std::fs::read_to_string(&path)?;
        Self::from_yaml(&content)
    }

    /// Build from in-memory values, each of which must be a mapping
    pub fn from_mappings(mappings: Vec<Value>) -> Result<Self> {
        let documents = mappings
            .into_iter()
            .enumerate()
            .map(|(index, value)| match value {
                Value::Map(doc) => Ok(doc),
                other => Err(CoreError::Shape {
                    index,
                    found: other.type_name(),
                }),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { documents })
    }

    /// Build from serializable records, each of which must serialize to a mapping
    pub fn from_serialize<T: Serialize>(items: &[T]) -> Result<Self> {
        let values = items
            .iter()
            .map(Value::from_serialize)
            .collect::<Result<Vec<_>>>()?;
        Self::from_mappings(values)
    }

    pub fn from_documents(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// Get the document at `index`
    pub fn get(&self, index: usize) -> Result<&Document> {
        let len = self.documents.len();
        self.documents
            .get(index)
            .ok_or(CoreError::Index { index, len })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut Document> {
        let len = self.documents.len();
        self.documents
            .get_mut(index)
            .ok_or(CoreError::Index { index, len })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Document> {
        self.documents.iter_mut()
    }

    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }

    /// Serialize all documents with the default emitter settings
    pub fn to_yaml_string(&self) -> String {
        self.to_yaml_string_with(&EmitterConfig::default())
    }

    pub fn to_yaml_string_with(&self, config: &EmitterConfig) -> String {
        emit_documents(&self.documents, config)
    }

    /// Write the YAML stream to `path`, replacing any existing file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf> {
        self.save_with(path, &EmitterConfig::default())
    }

    pub fn save_with<P: AsRef<Path>>(&self, path: P, config: &EmitterConfig) -> Result<PathBuf> {
        let path = expand_tilde(path);
        std::fs::write(&path, self.to_yaml_string_with(config))?;
        tracing::debug!(path = %path.display(), documents = self.len(), "saved documents");
        Ok(path)
    }

    /// Write the stream to `<folder>/kube-<uuid4>.yml`, removed when the
    /// returned guard drops
    pub fn to_scoped_file<P: AsRef<Path>>(&self, folder: P) -> Result<ScopedFile> {
        ScopedFile::create(folder, TEMP_FILE_PREFIX, &self.to_yaml_string())
    }

    /// Run `f` with the path of a scoped copy of the stream
    ///
    /// The file is gone once this returns, whatever `f` did.
    pub fn with_temp_file<P, F, R, E>(&self, folder: P, f: F) -> std::result::Result<R, E>
    where
        P: AsRef<Path>,
        F: FnOnce(&Path) -> std::result::Result<R, E>,
        E: From<CoreError>,
    {
        with_scoped_file(folder, TEMP_FILE_PREFIX, &self.to_yaml_string(), f)
    }
}

/// Whether the null document at `index` was written out (`null`, `~`)
/// rather than left empty
fn has_content(text: &str, index: usize) -> bool {
    serde_yaml::Deserializer::from_str(text)
        .nth(index)
        .and_then(|de| String::deserialize(de).ok())
        .is_some_and(|raw| !raw.trim().is_empty())
}

impl FromStr for DocumentList {
    type Err = CoreError;

    fn from_str(text: &str) -> Result<Self> {
        Self::from_yaml(text)
    }
}

impl fmt::Display for DocumentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_yaml_string())
    }
}

impl<'a> IntoIterator for &'a DocumentList {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

impl IntoIterator for DocumentList {
    type Item = Document;
    type IntoIter = std::vec::IntoIter<Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const STREAM: &str = r#"
apiVersion: v1
kind: Service
metadata:
  name: web
spec:
  ports:
    - port: 80
      targetPort: 8080
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  annotations:
    checksum/config: "abc123"
spec:
  replicas: 2
  selector:
    matchLabels:
      app: web
"#;

    fn mapping(key: &str, value: i64) -> Value {
        let mut doc = Document::new();
        doc.insert(key, value);
        Value::Map(doc)
    }

    #[test]
    fn test_parse_stream_in_order() {
        let docs = DocumentList::from_yaml(STREAM).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs.get(0).unwrap()["kind"], "Service");
        assert_eq!(docs.get(1).unwrap()["kind"], "Deployment");
        assert_eq!(docs.get(1).unwrap().path("spec.replicas").unwrap(), &Value::Int(2));
    }

    #[test]
    fn test_round_trip_value_equality() {
        let original = DocumentList::from_yaml(STREAM).unwrap();
        let text = original.to_yaml_string();
        let reparsed: DocumentList = text.parse().unwrap();
        assert_eq!(reparsed, original);
    }

    #[test]
    fn test_top_level_sequence_is_shape_error() {
        let err = DocumentList::from_yaml("- 1\n- 2\n").unwrap_err();
        assert!(matches!(err, CoreError::Shape { index: 0, found: "sequence" }));
    }

    #[test]
    fn test_scalar_document_reports_index() {
        let err = DocumentList::from_yaml("a: 1\n---\njust text\n").unwrap_err();
        assert!(matches!(err, CoreError::Shape { index: 1, found: "string" }));
    }

    #[test]
    fn test_empty_documents_skipped() {
        let docs = DocumentList::from_yaml("---\na: 1\n---\n---\nb: 2\n").unwrap();
        assert_eq!(docs.len(), 2);
        assert!(DocumentList::from_yaml("").unwrap().is_empty());
    }

    #[test]
    fn test_explicit_null_document_rejected() {
        for text in ["a: 1\n---\nnull\n", "a: 1\n--- ~\n", "a: 1\n---\nNULL\n"] {
            let err = DocumentList::from_yaml(text).unwrap_err();
            assert!(
                matches!(err, CoreError::Shape { index: 1, found: "null" }),
                "{text:?} gave {err:?}"
            );
        }

        let docs = DocumentList::from_yaml("a: 1\n---\n# nothing here\n---\nb: 2\n").unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let err = DocumentList::from_yaml("a: [1, 2\n").unwrap_err();
        assert!(matches!(err, CoreError::YamlParse(_)));
    }

    #[test]
    fn test_index_out_of_range() {
        let docs = DocumentList::from_yaml("a: 1\n").unwrap();
        let err = docs.get(3).unwrap_err();
        assert!(matches!(err, CoreError::Index { index: 3, len: 1 }));
    }

    #[test]
    fn test_from_mappings_emits_two_documents() {
        let docs = DocumentList::from_mappings(vec![mapping("a", 1), mapping("b", 2)]).unwrap();
        let text = docs.to_yaml_string();
        assert_eq!(text, "a: 1\n---\nb: 2\n");

        let reparsed = DocumentList::from_yaml(&text).unwrap();
        assert_eq!(reparsed, docs);
    }

    #[test]
    fn test_from_mappings_rejects_non_mapping() {
        let err = DocumentList::from_mappings(vec![mapping("a", 1), Value::Int(3)]).unwrap_err();
        assert!(matches!(err, CoreError::Shape { index: 1, found: "integer" }));
    }

    #[test]
    fn test_from_serialize_records() {
        #[derive(Serialize)]
        struct Port {
            name: String,
            port: u16,
        }

        let docs = DocumentList::from_serialize(&[Port {
            name: "http".to_string(),
            port: 80,
        }])
        .unwrap();
        assert_eq!(docs.to_yaml_string(), "name: http\nport: 80\n");
    }

    #[test]
    fn test_mutation_then_serialize() {
        let mut docs = DocumentList::from_yaml(STREAM).unwrap();
        docs.get_mut(1)
            .unwrap()
            .set_path("spec.replicas", 5)
            .unwrap();
        let reparsed = DocumentList::from_yaml(&docs.to_string()).unwrap();
        assert_eq!(reparsed.get(1).unwrap()["spec"]["replicas"], 5);
    }

    #[test]
    fn test_display_matches_to_yaml_string() {
        let docs = DocumentList::from_yaml(STREAM).unwrap();
        assert_eq!(docs.to_string(), docs.to_yaml_string());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let docs = DocumentList::from_yaml(STREAM).unwrap();

        let path = docs.save(dir.path().join("out.yml")).unwrap();
        let reloaded = DocumentList::from_file(&path).unwrap();
        assert_eq!(reloaded, docs);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = DocumentList::from_file("/definitely/not/here.yml").unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
    }

    #[test]
    fn test_scoped_file_removed_after_use() {
        let dir = TempDir::new().unwrap();
        let docs = DocumentList::from_yaml(STREAM).unwrap();

        let path = {
            let file = docs.to_scoped_file(dir.path()).unwrap();
            assert_eq!(DocumentList::from_file(file.path()).unwrap(), docs);
            file.path().to_path_buf()
        };
        assert!(!path.exists());
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("kube-"));
    }

    #[test]
    fn test_with_temp_file_cleans_up_on_error() {
        let dir = TempDir::new().unwrap();
        let docs = DocumentList::from_yaml(STREAM).unwrap();
        let mut seen = None;

        let result: Result<()> = docs.with_temp_file(dir.path(), |path| {
            seen = Some(path.to_path_buf());
            DocumentList::from_file(path.join("not-a-dir")).map(|_| ())
        });

        assert!(result.is_err());
        assert!(!seen.unwrap().exists());
    }
}
