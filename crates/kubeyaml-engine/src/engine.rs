//! Template engine based on MiniJinja

use kubeyaml_core::{DocumentList, TemplateContext};
use minijinja::{AutoEscape, Environment, UndefinedBehavior};

use crate::error::{EngineError, Result, TemplateError};
use crate::escape::escape_context;
use crate::filters;

/// Template engine builder
#[derive(Debug, Clone, Copy)]
pub struct EngineBuilder {
    strict_mode: bool,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self { strict_mode: true }
    }

    /// Set strict mode (fail on undefined variables)
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    pub fn build(self) -> Engine {
        Engine::new(self.strict_mode)
    }
}

/// The template engine
#[derive(Debug, Clone, Copy)]
pub struct Engine {
    strict_mode: bool,
}

impl Default for Engine {
    fn default() -> Self {
        EngineBuilder::new().build()
    }
}

impl Engine {
    pub fn new(strict_mode: bool) -> Self {
        Self { strict_mode }
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn is_strict(&self) -> bool {
        self.strict_mode
    }

    /// Create a configured MiniJinja environment
    fn create_environment(&self) -> Environment<'static> {
        let mut env = Environment::new();

        // Block tags leave no blank lines or indentation behind, and the
        // template's final newline survives
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.set_debug(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);

        if self.strict_mode {
            env.set_undefined_behavior(UndefinedBehavior::Strict);
        } else {
            env.set_undefined_behavior(UndefinedBehavior::Lenient);
        }

        env.add_filter("toyaml", filters::toyaml);
        env.add_filter("tojson", filters::tojson);
        env.add_filter("b64encode", filters::b64encode);
        env.add_filter("b64decode", filters::b64decode);
        env.add_filter("quote", filters::quote);
        env.add_filter("squote", filters::squote);
        env.add_filter("nindent", filters::nindent);
        env.add_filter("indent", filters::indent);
        env.add_filter("required", filters::required);

        env
    }

    /// Render a single template string
    ///
    /// Multiline top-level string variables are substituted as double-quoted
    /// YAML scalars; see [`escape_context`].
    pub fn render_string(
        &self,
        template: &str,
        context: &TemplateContext,
        template_name: &str,
    ) -> Result<String> {
        let mut env = self.create_environment();

        env.add_template_owned(template_name.to_string(), template.to_string())
            .map_err(|e| {
                EngineError::Template(TemplateError::from_minijinja(e, template_name, template))
            })?;

        let tmpl = env.get_template(template_name).map_err(|e| {
            EngineError::Template(TemplateError::from_minijinja(e, template_name, template))
        })?;

        let escaped = escape_context(context);
        tracing::debug!(
            template = template_name,
            variables = escaped.len(),
            strict = self.strict_mode,
            "rendering template"
        );

        tmpl.render(escaped.inner()).map_err(|e| {
            let ctx = context.to_json();
            EngineError::Template(TemplateError::from_minijinja_with_context(
                e,
                template_name,
                template,
                Some(&ctx),
            ))
        })
    }

    /// Render a template and parse the output as a YAML stream
    pub fn render_documents(
        &self,
        template: &str,
        context: &TemplateContext,
        template_name: &str,
    ) -> Result<DocumentList> {
        let rendered = self.render_string(template, context, template_name)?;
        Ok(DocumentList::from_yaml(&rendered)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TemplateErrorKind;
    use kubeyaml_core::CoreError;
    use serde_json::json;

    fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
        Engine::default().render_string(template, ctx, "test.yaml")
    }

    fn template_error(result: Result<String>) -> TemplateError {
        match result {
            Err(EngineError::Template(e)) => e,
            other => panic!("expected template error, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_by_default() {
        assert!(Engine::default().is_strict());
        assert!(!Engine::builder().strict(false).build().is_strict());
    }

    #[test]
    fn test_render_simple() {
        let ctx = TemplateContext::new()
            .with("n", "svc")
            .with("lis", json!([1, 2, 3]));

        let result = render("name: {{ n }}\nvalues: {{ lis|join(\",\") }}\n", &ctx).unwrap();
        assert_eq!(result, "name: svc\nvalues: 1,2,3\n");
    }

    #[test]
    fn test_block_tags_leave_no_blank_lines() {
        let ctx = TemplateContext::new().with("hosts", json!(["a", "b"]));
        let template = "hosts:\n  {% for h in hosts %}\n  - {{ h }}\n  {% endfor %}\n";

        assert_eq!(render(template, &ctx).unwrap(), "hosts:\n  - a\n  - b\n");
    }

    #[test]
    fn test_multiline_variable_stays_one_scalar() {
        let ctx = TemplateContext::new().with("motd", "hello\nworld");
        let result = render("motd: {{ motd }}\nnext: 1\n", &ctx).unwrap();

        assert_eq!(result, "motd: \"hello\\nworld\"\nnext: 1\n");
        let docs = DocumentList::from_yaml(&result).unwrap();
        assert_eq!(docs.get(0).unwrap()["motd"], "hello\nworld");
        assert_eq!(docs.get(0).unwrap()["next"], 1);
    }

    #[test]
    fn test_nested_multiline_not_escaped() {
        let ctx = TemplateContext::new().with("cfg", json!({"text": "a\nb"}));
        let result = render("{{ cfg.text }}", &ctx).unwrap();
        assert_eq!(result, "a\nb");
    }

    #[test]
    fn test_custom_filters_registered() {
        let ctx = TemplateContext::new()
            .with("labels", json!({"app": "web"}))
            .with("secret", "hello");
        let template = "metadata:\n  labels:{{ labels | toyaml | nindent(4) }}\ndata:\n  password: {{ secret | b64encode | quote }}\n";

        assert_eq!(
            render(template, &ctx).unwrap(),
            "metadata:\n  labels:\n    app: web\ndata:\n  password: \"aGVsbG8=\"\n"
        );
    }

    #[test]
    fn test_undefined_variable_strict() {
        let ctx = TemplateContext::new().with("replicas", 3);
        let err = template_error(render("count: {{ replica }}\n", &ctx));

        assert_eq!(err.kind(), TemplateErrorKind::UndefinedVariable);
        assert!(err.suggestion.unwrap().contains("replicas"));
    }

    #[test]
    fn test_undefined_variable_lenient() {
        let engine = Engine::builder().strict(false).build();
        let result = engine
            .render_string("v: {{ missing }}\n", &TemplateContext::new(), "test.yaml")
            .unwrap();
        assert_eq!(result, "v: \n");
    }

    #[test]
    fn test_syntax_error_has_span() {
        let err = template_error(render("a: 1\n{% for x in %}\n{% endfor %}\n", &TemplateContext::new()));
        assert_eq!(err.kind(), TemplateErrorKind::SyntaxError);
        assert!(err.span.is_some());
    }

    #[test]
    fn test_unknown_filter_suggestion() {
        let ctx = TemplateContext::new().with("cfg", json!({"a": 1}));
        let err = template_error(render("{{ cfg | toyml }}", &ctx));

        assert_eq!(err.kind(), TemplateErrorKind::UnknownFilter);
        assert!(err.suggestion.unwrap().contains("toyaml"));
    }

    #[test]
    fn test_required_filter_fails_render() {
        let ctx = TemplateContext::new().with("image", "");
        let err = template_error(render("{{ image | required(\"image is required\") }}", &ctx));
        assert!(err.message.contains("image is required"));
    }

    #[test]
    fn test_render_documents() {
        let ctx = TemplateContext::new().with("names", json!(["a", "b"]));
        let template = "{% for n in names %}\n---\nname: {{ n }}\n{% endfor %}\n";

        let docs = Engine::default()
            .render_documents(template, &ctx, "list.yaml")
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs.get(1).unwrap()["name"], "b");
    }

    #[test]
    fn test_render_documents_shape_error() {
        let err = Engine::default()
            .render_documents("- {{ x }}\n", &TemplateContext::new().with("x", 1), "seq.yaml")
            .unwrap_err();
        assert!(matches!(err, EngineError::Core(CoreError::Shape { .. })));
    }
}
