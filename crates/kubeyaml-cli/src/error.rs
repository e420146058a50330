//! CLI error type with exit code mapping

use kubeyaml_core::CoreError;
use kubeyaml_engine::{EngineError, TemplateError};
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Template compilation or rendering failed
    #[error(transparent)]
    #[diagnostic(transparent)]
    Template(#[from] TemplateError),

    /// YAML documents could not be parsed or navigated
    #[error("Document error: {message}")]
    #[diagnostic(code(kubeyaml::cli::document))]
    Document {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Invalid user input (bad --set syntax, ...)
    #[error("Invalid input: {message}")]
    #[diagnostic(code(kubeyaml::cli::input))]
    Input { message: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(kubeyaml::cli::io))]
    Io { message: String },
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Template(_) => exit_codes::TEMPLATE_ERROR,
            CliError::Document { .. } => exit_codes::DOCUMENT_ERROR,
            CliError::Input { .. } => exit_codes::ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
        }
    }

    pub fn document(message: impl Into<String>) -> Self {
        Self::Document {
            message: message.into(),
            help: None,
        }
    }

    pub fn document_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Document {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Prefix the message with what was being processed
    pub fn context(self, what: impl std::fmt::Display) -> Self {
        match self {
            Self::Template(_) => self,
            Self::Document { message, help } => Self::Document {
                message: format!("{}: {}", what, message),
                help,
            },
            Self::Input { message } => Self::Input {
                message: format!("{}: {}", what, message),
            },
            Self::Io { message } => Self::Io {
                message: format!("{}: {}", what, message),
            },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Io(e) => e.into(),
            CoreError::InvalidSet { .. } => CliError::Input {
                message: err.to_string(),
            },
            CoreError::Shape { .. } => CliError::document_with_help(
                err.to_string(),
                "Every document in the stream must be a mapping of keys to values",
            ),
            other => CliError::document(other.to_string()),
        }
    }
}

impl From<EngineError> for CliError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Template(e) => e.into(),
            EngineError::Core(e) => e.into(),
            EngineError::Io(e) => e.into(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use kubeyaml_core::TemplateContext;
    use kubeyaml_engine::Engine;

    #[test]
    fn test_exit_codes() {
        let render = Engine::default()
            .render_string("{{ missing }}", &TemplateContext::new(), "t.yaml")
            .unwrap_err();
        let template: CliError = render.into();
        assert!(matches!(template, CliError::Template(_)));
        assert_eq!(template.exit_code(), exit_codes::TEMPLATE_ERROR);

        let shape: CliError = CoreError::Shape {
            index: 0,
            found: "sequence",
        }
        .into();
        assert_eq!(shape.exit_code(), exit_codes::DOCUMENT_ERROR);

        let index: CliError = CoreError::Index { index: 2, len: 1 }.into();
        assert_eq!(index.exit_code(), exit_codes::DOCUMENT_ERROR);

        let set: CliError = CoreError::InvalidSet {
            message: "x".to_string(),
        }
        .into();
        assert_eq!(set.exit_code(), exit_codes::ERROR);

        let io: CliError = EngineError::Io(std::io::Error::other("gone")).into();
        assert_eq!(io.exit_code(), exit_codes::IO_ERROR);
    }

    #[test]
    fn test_context_prefixes_message() {
        let err = CliError::from(std::io::Error::other("gone")).context("values.yaml");
        assert_eq!(err.to_string(), "IO error: values.yaml: gone");
    }
}
