//! Navigation bar and app sidebar
//!
//! Every page context carries `nav_bar_items`: the static items from
//! [`PanelConfig::nav_bar`](crate::PanelConfig) followed by one item per
//! registered [`NavBarGenerator`], evaluated against the current request.
//! The model page additionally carries `apps`, the registered apps the
//! caller may read.

use crate::error::PanelError;
use crate::panel::Services;
use crate::request::RequestContext;
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

/// One entry of the navigation bar
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NavBarItem {
    /// Text shown
    pub name: String,
    /// Target; an item without a link renders as plain text
    pub link: Option<String>,
    /// Emphasize a text item
    pub bold: bool,
    /// Add a trailing `/` to the link
    pub append_slash: bool,
}

impl NavBarItem {
    /// Plain text item
    #[must_use]
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Link item
    #[must_use]
    pub fn link(name: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: Some(link.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    #[must_use]
    pub fn with_append_slash(mut self, append_slash: bool) -> Self {
        self.append_slash = append_slash;
        self
    }

    /// Resolved link target, `None` for text items
    #[must_use]
    pub fn href(&self) -> Option<String> {
        let link = self.link.as_deref().filter(|l| !l.is_empty())?;
        if self.append_slash && !link.ends_with('/') {
            Some(format!("{link}/"))
        } else {
            Some(link.to_string())
        }
    }

    /// Bootstrap navbar markup
    #[must_use]
    pub fn html(&self) -> String {
        let name = encode_text(&self.name);
        match self.href() {
            Some(href) => format!(
                r#"<a class="nav-link" href="{}">{name}</a>"#,
                encode_double_quoted_attribute(&href)
            ),
            None if self.bold => format!(r#"<span class="navbar-text fw-semibold me-2">{name}</span>"#),
            None => format!(r#"<span class="navbar-text me-2">{name}</span>"#),
        }
    }

    /// Template context entry: the item's fields plus its markup
    #[must_use]
    pub fn to_context(&self) -> Value {
        json!({
            "name": self.name,
            "link": self.href(),
            "bold": self.bold,
            "html": self.html(),
        })
    }
}

/// Builds a navigation item from the current request
pub type NavBarGenerator = Arc<dyn Fn(&dyn RequestContext) -> NavBarItem + Send + Sync>;

/// Registered generators, in registration order
///
/// Two sets compare equal when they hold the same generators.
#[derive(Clone, Default)]
pub struct NavBarGenerators(Vec<NavBarGenerator>);

impl NavBarGenerators {
    pub fn push(&mut self, generator: NavBarGenerator) {
        self.0.push(generator);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Evaluate every generator against `ctx`
    #[must_use]
    pub fn generate(&self, ctx: &dyn RequestContext) -> Vec<NavBarItem> {
        self.0.iter().map(|g| g(ctx)).collect()
    }
}

impl fmt::Debug for NavBarGenerators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavBarGenerators").field("count", &self.0.len()).finish()
    }
}

impl PartialEq for NavBarGenerators {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().zip(&other.0).all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

impl Eq for NavBarGenerators {}

/// `nav_bar_items` context value for the current request
pub(crate) fn nav_bar_context(services: &Services, ctx: &dyn RequestContext) -> Value {
    let items: Vec<Value> = services
        .config
        .nav_bar_items(ctx)
        .iter()
        .map(NavBarItem::to_context)
        .collect();
    Value::Array(items)
}

/// `apps` context value: registered apps the caller may read
///
/// # Errors
/// The first permission-checker failure.
pub(crate) async fn readable_apps(services: &Services, ctx: &dyn RequestContext) -> Result<Value, PanelError> {
    let directory: Vec<(String, String)> = services
        .apps
        .read()
        .iter()
        .map(|(name, display)| (name.clone(), display.clone()))
        .collect();

    let mut apps = Vec::with_capacity(directory.len());
    for (name, display_name) in directory {
        if services.permissions.app_read(&name, ctx).await? {
            apps.push(json!({
                "name": name,
                "display_name": display_name,
                "link": services.config.link(&format!("/a/{name}")),
            }));
        }
    }
    Ok(Value::Array(apps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn link_item_html() {
        let item = NavBarItem::link("Docs", "/docs").with_append_slash(true);
        assert_eq!(item.href().as_deref(), Some("/docs/"));
        assert_eq!(item.html(), r#"<a class="nav-link" href="/docs/">Docs</a>"#);
    }

    #[test]
    fn text_items() {
        assert_eq!(
            NavBarItem::text("Signed in").with_bold(true).html(),
            r#"<span class="navbar-text fw-semibold me-2">Signed in</span>"#
        );
        assert_eq!(
            NavBarItem::text("v1").html(),
            r#"<span class="navbar-text me-2">v1</span>"#
        );
    }

    #[test]
    fn markup_is_escaped() {
        let html = NavBarItem::link("<b>", "/x\"y").html();
        assert_eq!(html, r#"<a class="nav-link" href="/x&quot;y">&lt;b&gt;</a>"#);
    }

    #[test]
    fn empty_link_is_text() {
        let item = NavBarItem {
            name: "Home".into(),
            link: Some(String::new()),
            ..NavBarItem::default()
        };
        assert_eq!(item.href(), None);
        assert!(item.html().starts_with("<span"));
    }

    #[test]
    fn generators_compare_by_identity() {
        let generator: NavBarGenerator = Arc::new(|_: &dyn RequestContext| NavBarItem::text("x"));
        let mut a = NavBarGenerators::default();
        a.push(Arc::clone(&generator));
        let mut b = NavBarGenerators::default();
        b.push(generator);
        assert_eq!(a, b);

        b.push(Arc::new(|_: &dyn RequestContext| NavBarItem::text("x")));
        assert_ne!(a, b);
        assert_eq!(format!("{b:?}"), "NavBarGenerators { count: 2 }");
    }
}
