//! kubeyaml Core - ordered YAML documents for Kubernetes manifests
//!
//! This crate provides the data side of kubeyaml:
//! - `Document`: one YAML mapping with key, dotted-path and typed access
//! - `DocumentList`: an ordered multi-document YAML stream
//! - `EmitterConfig`: block-style YAML output with per-value scalar styles
//! - `TemplateContext`: variables handed to the template engine
//! - `ScopedFile`: a generated file removed when it goes out of scope

pub mod collection;
pub mod context;
pub mod document;
pub mod emit;
pub mod error;
pub mod paths;
pub mod scoped;

pub use collection::DocumentList;
pub use context::{TemplateContext, parse_set_values};
pub use document::{Document, ScalarStyle, SeqKind, Sequence, StyledString, Value};
pub use emit::{EmitterConfig, StyleOverrides, escape_double_quoted};
pub use error::{CoreError, Result};
pub use paths::expand_tilde;
pub use scoped::{ScopedFile, with_scoped_file};
