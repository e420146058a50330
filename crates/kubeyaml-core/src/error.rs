//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Document {index} is a {found}, expected a mapping")]
    Shape { index: usize, found: &'static str },

    #[error("Document index {index} out of range (collection has {len} documents)")]
    Index { index: usize, len: usize },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid path `{path}`: {message}")]
    InvalidPath { path: String, message: String },

    #[error("Invalid --set value: {message}")]
    InvalidSet { message: String },

    #[error("Value conversion failed: {message}")]
    Convert { message: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
