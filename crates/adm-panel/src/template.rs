//! Page rendering contract
//!
//! Handlers build a JSON context and hand it to a [`TemplateRenderer`]
//! together with one of the template names below. Real deployments plug in
//! their own engine; [`BasicTemplateRenderer`] emits a minimal page that
//! embeds the context for client-side rendering.

use crate::error::RenderError;
use adm_form::escape_text;
use serde_json::Value;

/// App page: models the caller may read
pub const APP: &str = "app";
/// Model list page
pub const MODEL: &str = "model";
/// Instance detail page
pub const INSTANCE: &str = "instance";
/// Add or edit form page; context carries pre-rendered `form_html`
pub const FORM: &str = "form";

/// Template engine binding
pub trait TemplateRenderer: Send + Sync {
    /// Render `template` with `context`
    ///
    /// # Errors
    /// [`RenderError`] for unknown templates or engine failures.
    fn render(&self, template: &str, context: &Value) -> Result<String, RenderError>;
}

/// Minimal HTML shell around the JSON context
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicTemplateRenderer;

impl TemplateRenderer for BasicTemplateRenderer {
    fn render(&self, template: &str, context: &Value) -> Result<String, RenderError> {
        if ![APP, MODEL, INSTANCE, FORM].contains(&template) {
            return Err(RenderError::UnknownTemplate(template.to_string()));
        }

        let title = context.get("title").and_then(Value::as_str).unwrap_or("Admin");
        let form = if template == FORM {
            let fields = context.get("form_html").and_then(Value::as_str).unwrap_or("");
            format!("<form method=\"post\">\n{fields}\n<button type=\"submit\">Save</button>\n</form>\n")
        } else {
            String::new()
        };
        let nav: Vec<&str> = context
            .get("nav_bar_items")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(|i| i["html"].as_str()).collect())
            .unwrap_or_default();
        let nav = if nav.is_empty() {
            String::new()
        } else {
            format!("<nav class=\"navbar\">{}</nav>\n", nav.join(""))
        };
        let json = serde_json::to_string(context)?.replace("</", "<\\/");

        Ok(format!(
            "<!DOCTYPE html>\n<html><head><title>{title}</title></head>\n<body data-template=\"{template}\">\n{nav}<h1>{title}</h1>\n{form}<script type=\"application/json\" id=\"admin-context\">{json}</script>\n</body></html>",
            title = escape_text(title),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_template_fails() {
        let err = BasicTemplateRenderer.render("dashboard", &json!({})).unwrap_err();
        assert!(matches!(err, RenderError::UnknownTemplate(name) if name == "dashboard"));
    }

    #[test]
    fn embeds_context_safely() {
        let html = BasicTemplateRenderer
            .render(MODEL, &json!({ "title": "A & B", "note": "</script>" }))
            .unwrap();
        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains("<\\/script>"));
        assert_eq!(html.matches("</script>").count(), 1);
    }

    #[test]
    fn renders_nav_bar_markup() {
        let context = json!({
            "title": "People",
            "nav_bar_items": [{ "name": "Site", "html": "<a class=\"nav-link\" href=\"/\">Site</a>" }],
        });
        let html = BasicTemplateRenderer.render(APP, &context).unwrap();
        assert!(html.contains("<nav class=\"navbar\"><a class=\"nav-link\" href=\"/\">Site</a></nav>\n<h1>"));

        let bare = BasicTemplateRenderer.render(APP, &json!({})).unwrap();
        assert!(!bare.contains("<nav"));
    }

    #[test]
    fn form_template_wraps_fields() {
        let html = BasicTemplateRenderer
            .render(FORM, &json!({ "title": "Add", "form_html": "<input name=\"a\">" }))
            .unwrap();
        assert!(html.contains("<form method=\"post\">\n<input name=\"a\">"));
    }
}
