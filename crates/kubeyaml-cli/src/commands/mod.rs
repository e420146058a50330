//! CLI commands

pub mod fmt;
pub mod get;
pub mod render;

use console::style;
use kubeyaml_core::expand_tilde;
use std::path::Path;

use crate::error::{CliError, Result};

/// Write `text` to `output`, or to stdout when no output file is given
pub(crate) fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    let Some(output) = output else {
        print!("{}", text);
        return Ok(());
    };

    let path = expand_tilde(output);
    std::fs::write(&path, text).map_err(|e| CliError::from(e).context(path.display()))?;
    eprintln!("{} {}", style("wrote").green(), path.display());
    Ok(())
}
