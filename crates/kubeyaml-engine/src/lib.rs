//! kubeyaml Engine - Jinja2 templating for Kubernetes YAML
//!
//! This crate provides a MiniJinja-based renderer that:
//! - Quotes multiline string variables so they stay a single YAML scalar
//! - Trims block tags so control flow leaves no stray lines in manifests
//! - Adds Kubernetes-flavoured filters (toyaml, b64encode, nindent, ...)
//! - Reports template errors with source spans and suggestions
//! - Parses rendered output straight into a [`DocumentList`](kubeyaml_core::DocumentList)

pub mod engine;
pub mod error;
pub mod escape;
pub mod filters;
pub mod renderer;
pub mod suggestions;

pub use engine::{Engine, EngineBuilder};
pub use error::{EngineError, Result, TemplateError, TemplateErrorKind};
pub use escape::{escape_context, escape_multiline};
pub use renderer::{FromTemplate, Renderer};
pub use suggestions::{AVAILABLE_FILTERS, AVAILABLE_FUNCTIONS};
