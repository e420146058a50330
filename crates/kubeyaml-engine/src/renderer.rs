//! Template renderer with file and scoped-file output

use std::path::{Path, PathBuf};

use kubeyaml_core::{DocumentList, ScopedFile, TemplateContext, expand_tilde};

use crate::engine::Engine;
use crate::error::{EngineError, Result};

/// File name prefix for scoped render output (`jinja-<uuid4>.yml`)
pub const TEMP_FILE_PREFIX: &str = "jinja";

/// Name used in diagnostics for templates built from text
const INLINE_TEMPLATE_NAME: &str = "<template>";

/// A Jinja2 template together with the engine that renders it
#[derive(Debug, Clone)]
pub struct Renderer {
    name: String,
    source: String,
    engine: Engine,
}

impl Renderer {
    /// Create a renderer from template text
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            name: INLINE_TEMPLATE_NAME.to_string(),
            source: source.into(),
            engine: Engine::default(),
        }
    }

    /// Load a template file; its path becomes the diagnostic name
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = expand_tilde(path);
        let source = std::fs::read_to_string(&path)?;

        Ok(Self {
            name: path.display().to_string(),
            source,
            engine: Engine::default(),
        })
    }

    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn render(&self, context: &TemplateContext) -> Result<String> {
        self.engine.render_string(&self.source, context, &self.name)
    }

    /// Render and parse the output as a YAML stream
    pub fn render_documents(&self, context: &TemplateContext) -> Result<DocumentList> {
        self.engine
            .render_documents(&self.source, context, &self.name)
    }

    /// Render into `path`, replacing any existing file
    pub fn render_to_file<P: AsRef<Path>>(
        &self,
        path: P,
        context: &TemplateContext,
    ) -> Result<PathBuf> {
        let rendered = self.render(context)?;
        let path = expand_tilde(path);
        std::fs::write(&path, rendered)?;

        tracing::debug!(template = %self.name, path = %path.display(), "wrote rendered template");
        Ok(path)
    }

    /// Render into `<folder>/jinja-<uuid4>.yml`, removed when the guard drops
    pub fn render_to_scoped_file<P: AsRef<Path>>(
        &self,
        folder: P,
        context: &TemplateContext,
    ) -> Result<ScopedFile> {
        let rendered = self.render(context)?;
        Ok(ScopedFile::create(folder, TEMP_FILE_PREFIX, &rendered)?)
    }

    /// Run `f` with the path of a scoped render
    ///
    /// The file is removed once `f` returns or unwinds.
    pub fn with_rendered_file<P, F, R, E>(
        &self,
        folder: P,
        context: &TemplateContext,
        f: F,
    ) -> std::result::Result<R, E>
    where
        P: AsRef<Path>,
        F: FnOnce(&Path) -> std::result::Result<R, E>,
        E: From<EngineError>,
    {
        let file = self.render_to_scoped_file(folder, context)?;
        f(file.path())
    }
}

/// Build a value from a rendered template
pub trait FromTemplate: Sized {
    /// Render `template` with `context`, then parse the result
    fn from_template_str(template: &str, context: &TemplateContext) -> Result<Self>;

    fn from_template_file<P: AsRef<Path>>(path: P, context: &TemplateContext) -> Result<Self>;
}

impl FromTemplate for DocumentList {
    fn from_template_str(template: &str, context: &TemplateContext) -> Result<Self> {
        Renderer::new(template).render_documents(context)
    }

    fn from_template_file<P: AsRef<Path>>(path: P, context: &TemplateContext) -> Result<Self> {
        Renderer::from_file(path)?.render_documents(context)
    }
}
