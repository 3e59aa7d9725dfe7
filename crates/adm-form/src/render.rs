//! Form rendering strategies
//!
//! Four interchangeable [`FormRenderer`]s project the same form, values and
//! [`ValidationReport`] into different markup:
//!
//! | style | field wrapper | form errors |
//! |---|---|---|
//! | [`RenderStyle::Paragraph`] | `<p>` | after fields |
//! | [`RenderStyle::List`] | `<li>` inside `<ul>` | after fields |
//! | [`RenderStyle::Table`] | `<tr>` inside `<table>` | after fields |
//! | [`RenderStyle::Panel`] | Bootstrap `div.mb-3` | before fields |

use crate::form::{Form, FormField, FormValues, ValidationReport};
use crate::widget::{escape_text, Widget};
use html_escape::encode_double_quoted_attribute;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Rendering strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    Paragraph,
    List,
    Table,
    #[default]
    Panel,
}

impl RenderStyle {
    /// Renderer implementing this style
    #[must_use]
    pub fn renderer(self) -> &'static dyn FormRenderer {
        match self {
            RenderStyle::Paragraph => &ParagraphRenderer,
            RenderStyle::List => &ListRenderer,
            RenderStyle::Table => &TableRenderer,
            RenderStyle::Panel => &PanelRenderer,
        }
    }
}

/// Turns a form into HTML
pub trait FormRenderer: Send + Sync + Debug {
    /// Render every field
    ///
    /// `values` are the submitted values to echo back; when absent, each
    /// field shows its initial value. `report` carries errors to display.
    fn render(&self, form: &Form, values: Option<&FormValues>, report: Option<&ValidationReport>) -> String;

    /// Style implemented by this renderer
    fn style(&self) -> RenderStyle;
}

/// One field resolved for rendering
struct FieldView<'a> {
    name: &'a str,
    /// `name` escaped for a double-quoted attribute
    attr: String,
    label: String,
    widget: &'a Widget,
    value: Option<String>,
    errors: &'a [String],
}

fn field_views<'a>(
    form: &'a Form,
    values: Option<&'a FormValues>,
    report: Option<&'a ValidationReport>,
) -> impl Iterator<Item = FieldView<'a>> {
    form.fields().iter().map(move |field: &'a FormField| {
        let value = match values {
            Some(v) => v.get(&field.name).cloned(),
            None => form.initial_value(&field.name),
        };
        FieldView {
            name: &field.name,
            attr: encode_double_quoted_attribute(&field.name).into_owned(),
            label: escape_text(&field.label),
            widget: &field.widget,
            value,
            errors: report.map_or(&[][..], |r| r.errors_for(&field.name)),
        }
    })
}

fn form_errors(report: Option<&ValidationReport>) -> &[String] {
    report.map_or(&[][..], |r| r.form_errors.as_slice())
}

fn error_list(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: Vec<String> = errors.iter().map(|e| escape_text(e)).collect();
    format!(r#"<ul class="errorlist"><li>{}</li></ul>"#, items.join("</li><li>"))
}

/// `<p>` per field
#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphRenderer;

impl FormRenderer for ParagraphRenderer {
    fn render(&self, form: &Form, values: Option<&FormValues>, report: Option<&ValidationReport>) -> String {
        let mut parts: Vec<String> = field_views(form, values, report)
            .map(|f| {
                format!(
                    r#"<p><label for="{name}">{label}:</label> {input}{errors}</p>"#,
                    name = f.attr,
                    label = f.label,
                    input = f.widget.render_html(f.name, f.value.as_deref(), None),
                    errors = error_list(f.errors),
                )
            })
            .collect();
        let errors = form_errors(report);
        if !errors.is_empty() {
            parts.push(error_list(errors));
        }
        parts.join("\n")
    }

    fn style(&self) -> RenderStyle {
        RenderStyle::Paragraph
    }
}

/// `<li>` per field inside a `<ul>`
#[derive(Debug, Clone, Copy, Default)]
pub struct ListRenderer;

impl FormRenderer for ListRenderer {
    fn render(&self, form: &Form, values: Option<&FormValues>, report: Option<&ValidationReport>) -> String {
        let mut parts: Vec<String> = field_views(form, values, report)
            .map(|f| {
                format!(
                    r#"<li><label for="{name}">{label}:</label> {input}{errors}</li>"#,
                    name = f.attr,
                    label = f.label,
                    input = f.widget.render_html(f.name, f.value.as_deref(), None),
                    errors = error_list(f.errors),
                )
            })
            .collect();
        let errors = form_errors(report);
        if !errors.is_empty() {
            parts.push(error_list(errors));
        }
        format!("<ul>\n{}\n</ul>", parts.join("\n"))
    }

    fn style(&self) -> RenderStyle {
        RenderStyle::List
    }
}

/// `<tr>` per field inside a `<table>`
#[derive(Debug, Clone, Copy, Default)]
pub struct TableRenderer;

impl FormRenderer for TableRenderer {
    fn render(&self, form: &Form, values: Option<&FormValues>, report: Option<&ValidationReport>) -> String {
        let mut parts: Vec<String> = field_views(form, values, report)
            .map(|f| {
                format!(
                    r#"<tr><th><label for="{name}">{label}</label></th><td>{input}{errors}</td></tr>"#,
                    name = f.attr,
                    label = f.label,
                    input = f.widget.render_html(f.name, f.value.as_deref(), None),
                    errors = error_list(f.errors),
                )
            })
            .collect();
        let errors = form_errors(report);
        if !errors.is_empty() {
            parts.push(format!(r#"<tr><td colspan="2">{}</td></tr>"#, error_list(errors)));
        }
        format!("<table>\n{}\n</table>", parts.join("\n"))
    }

    fn style(&self) -> RenderStyle {
        RenderStyle::Table
    }
}

/// Bootstrap-styled panel, form errors in an alert above the fields
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelRenderer;

impl PanelRenderer {
    fn feedback(errors: &[String]) -> String {
        if errors.is_empty() {
            return String::new();
        }
        let items: Vec<String> = errors.iter().map(|e| escape_text(e)).collect();
        format!(r#"<div class="invalid-feedback d-block">{}</div>"#, items.join("<br>"))
    }

    fn field(f: &FieldView<'_>) -> String {
        if matches!(f.widget, Widget::Boolean(_)) {
            let input = f
                .widget
                .render_html(f.name, f.value.as_deref(), Some("form-check-input"));
            return format!(
                "<div class=\"mb-3\">\n<div class=\"form-check\">\n{input}\n<label class=\"form-check-label\" for=\"{name}\">{label}</label>\n</div>\n{errors}\n</div>",
                name = f.attr,
                label = f.label,
                errors = Self::feedback(f.errors),
            );
        }

        let class = if f.errors.is_empty() {
            "form-control"
        } else {
            "form-control is-invalid"
        };
        let label_class = if f.widget.is_required() {
            "form-label required-label"
        } else {
            "form-label"
        };
        format!(
            "<div class=\"mb-3\">\n<label class=\"{label_class}\" for=\"{name}\">{label}</label>\n{input}\n{errors}\n</div>",
            name = f.attr,
            label = f.label,
            input = f.widget.render_html(f.name, f.value.as_deref(), Some(class)),
            errors = Self::feedback(f.errors),
        )
    }
}

impl FormRenderer for PanelRenderer {
    fn render(&self, form: &Form, values: Option<&FormValues>, report: Option<&ValidationReport>) -> String {
        let mut parts = Vec::new();
        let errors = form_errors(report);
        if !errors.is_empty() {
            let items: Vec<String> = errors.iter().map(|e| escape_text(e)).collect();
            parts.push(format!(
                "<div class=\"alert alert-danger\" role=\"alert\">\n<ul class=\"mb-0\"><li>{}</li></ul>\n</div>",
                items.join("</li><li>")
            ));
        }
        parts.extend(field_views(form, values, report).map(|f| Self::field(&f)));
        parts.join("\n")
    }

    fn style(&self) -> RenderStyle {
        RenderStyle::Panel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::form::values_are_valid;
    use crate::value::ValueKind;
    use crate::widget::TextWidget;
    use std::sync::Arc;

    fn form() -> Form {
        let mut form = Form::new();
        form.add_field(
            "Email",
            "E-mail <addr>",
            Arc::new(Widget::Text(TextWidget {
                required: true,
                ..TextWidget::default()
            })),
        )
        .unwrap();
        form.add_field("Active", "Active", Arc::new(Widget::for_kind(ValueKind::Boolean)))
            .unwrap();
        form
    }

    fn failing_report(form: &Form) -> ValidationReport {
        let mut report = values_are_valid(form, &FormValues::new()).unwrap();
        report.form_errors.push("form broken".to_string());
        report
    }

    #[test]
    fn every_style_renders_field_and_form_errors() {
        let form = form();
        let report = failing_report(&form);
        for style in [
            RenderStyle::Paragraph,
            RenderStyle::List,
            RenderStyle::Table,
            RenderStyle::Panel,
        ] {
            let renderer = style.renderer();
            assert_eq!(renderer.style(), style);
            let html = renderer.render(&form, None, Some(&report));
            assert!(html.contains("This field is required."), "{style:?}");
            assert_eq!(html.matches("form broken").count(), 1, "{style:?}");
            assert!(html.contains("E-mail &lt;addr&gt;"), "{style:?}");
        }
    }

    #[test]
    fn paragraph_puts_form_errors_last() {
        let form = form();
        let html = ParagraphRenderer.render(&form, None, Some(&failing_report(&form)));
        assert!(html.find("form broken").unwrap() > html.find("Active").unwrap());
    }

    #[test]
    fn panel_puts_form_errors_first() {
        let form = form();
        let html = PanelRenderer.render(&form, None, Some(&failing_report(&form)));
        assert!(html.starts_with("<div class=\"alert alert-danger\""));
        assert!(html.contains("form-control is-invalid"));
        assert!(html.contains("form-check-input"));
        assert!(html.contains("required-label"));
    }

    #[test]
    fn echoes_submitted_values() {
        let form = form();
        let mut values = FormValues::new();
        values.insert("Email".into(), "a@b.c".into());
        let html = TableRenderer.render(&form, Some(&values), None);
        assert!(html.contains("value=\"a@b.c\""));
        assert!(html.starts_with("<table>"));
        assert!(!html.contains("errorlist"));
    }

    #[test]
    fn field_names_are_escaped_in_attributes() {
        let mut form = Form::new();
        form.add_field("a\"b<c", "Odd", Arc::new(Widget::for_kind(ValueKind::Text)))
            .unwrap();
        for style in [
            RenderStyle::Paragraph,
            RenderStyle::List,
            RenderStyle::Table,
            RenderStyle::Panel,
        ] {
            let html = style.renderer().render(&form, None, None);
            assert!(!html.contains("a\"b"), "{style:?}: {html}");
            assert!(html.contains("for=\"a&quot;b&lt;c\""), "{style:?}: {html}");
            assert!(html.contains("name=\"a&quot;b&lt;c\""), "{style:?}: {html}");
        }
    }

    #[test]
    fn style_deserializes_lowercase() {
        let style: RenderStyle = serde_json::from_str("\"table\"").unwrap();
        assert_eq!(style, RenderStyle::Table);
        assert_eq!(RenderStyle::default(), RenderStyle::Panel);
    }
}
