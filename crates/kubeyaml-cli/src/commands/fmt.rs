//! Fmt command - normalize a YAML stream

use kubeyaml_core::DocumentList;
use std::path::Path;

use crate::error::{CliError, Result};

pub fn run(file: &Path, output: Option<&Path>) -> Result<()> {
    let docs = DocumentList::from_file(file).map_err(|e| CliError::from(e).context(file.display()))?;
    tracing::debug!(file = %file.display(), documents = docs.len(), "formatting");

    super::write_output(output, &docs.to_yaml_string())
}
