//! Get command - print one value from a YAML stream

use kubeyaml_core::{DocumentList, EmitterConfig, emit::emit_value};
use std::path::Path;

use crate::error::{CliError, Result};

pub fn run(file: &Path, path: &str, document: usize) -> Result<()> {
    let docs = DocumentList::from_file(file).map_err(|e| CliError::from(e).context(file.display()))?;
    let doc = docs.get(document)?;

    let value = doc.path(path).ok_or_else(|| {
        let available: Vec<&str> = doc.keys().collect();
        CliError::document_with_help(
            format!("no value at `{}` in document {}", path, document),
            format!("Top-level keys: {}", available.join(", ")),
        )
    })?;

    print!("{}", emit_value(value, &EmitterConfig::default()));
    Ok(())
}
