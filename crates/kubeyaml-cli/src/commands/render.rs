//! Render command - render a template with merged values

use kubeyaml_core::{DocumentList, TemplateContext, parse_set_values};
use kubeyaml_engine::{Engine, Renderer};
use std::path::{Path, PathBuf};

use crate::error::{CliError, Result};

pub fn run(
    template: &Path,
    values_files: &[PathBuf],
    set_values: &[String],
    output: Option<&Path>,
    lenient: bool,
    check: bool,
) -> Result<()> {
    let mut context = TemplateContext::new();

    // 1. Merge values from -f/--values files, later files win
    for values_file in values_files {
        let file_values = TemplateContext::from_file(values_file)
            .map_err(|e| CliError::from(e).context(values_file.display()))?;
        context.merge(&file_values);
        tracing::debug!(file = %values_file.display(), "merged values");
    }

    // 2. Apply --set overrides
    if !set_values.is_empty() {
        let set_vals = parse_set_values(set_values)?;
        context.merge(&set_vals);
        tracing::debug!(count = set_values.len(), "applied --set values");
    }

    let engine = Engine::builder().strict(!lenient).build();
    let renderer = Renderer::from_file(template)
        .map_err(|e| CliError::from(e).context(template.display()))?
        .with_engine(engine);

    let rendered = renderer.render(&context)?;

    let text = if check {
        DocumentList::from_yaml(&rendered)
            .map_err(|e| CliError::from(e).context("rendered output"))?
            .to_yaml_string()
    } else {
        rendered
    };

    super::write_output(output, &text)
}
