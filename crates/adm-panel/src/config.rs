//! Panel configuration

use crate::error::ConfigError;
use crate::nav::{NavBarGenerator, NavBarGenerators, NavBarItem};
use crate::request::RequestContext;
use adm_form::RenderStyle;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Smallest page size the listing ever uses
pub const MIN_INSTANCES_PER_PAGE: usize = 10;

/// Admin panel configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Panel title
    pub name: String,
    /// Path prefix every route is mounted under
    pub prefix: String,
    /// Page size when the request gives none
    pub default_instances_per_page: usize,
    /// Markup used for add/edit forms
    pub render_style: RenderStyle,
    /// Fixed navigation bar items, shown before generated ones
    pub nav_bar: Vec<NavBarItem>,
    /// Per-request navigation bar items
    #[serde(skip)]
    pub nav_bar_generators: NavBarGenerators,
}

impl PanelConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With panel title
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// With route prefix
    #[inline]
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// With default page size
    #[inline]
    #[must_use]
    pub fn with_default_instances_per_page(mut self, per_page: usize) -> Self {
        self.default_instances_per_page = per_page;
        self
    }

    /// With form render style
    #[inline]
    #[must_use]
    pub fn with_render_style(mut self, style: RenderStyle) -> Self {
        self.render_style = style;
        self
    }

    /// With a fixed navigation bar item
    #[must_use]
    pub fn with_nav_bar_item(mut self, item: NavBarItem) -> Self {
        self.nav_bar.push(item);
        self
    }

    /// With a navigation bar item built from each request
    #[must_use]
    pub fn with_nav_bar_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn(&dyn RequestContext) -> NavBarItem + Send + Sync + 'static,
    {
        let generator: NavBarGenerator = std::sync::Arc::new(generator);
        self.nav_bar_generators.push(generator);
        self
    }

    /// Navigation bar for one request: fixed items, then generated ones
    #[must_use]
    pub fn nav_bar_items(&self, ctx: &dyn RequestContext) -> Vec<NavBarItem> {
        let mut items = self.nav_bar.clone();
        items.extend(self.nav_bar_generators.generate(ctx));
        items
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// [`ConfigError::Parse`] on malformed TOML or unknown value shapes.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// [`ConfigError::Io`] when the file cannot be read, otherwise as
    /// [`PanelConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Prefix with a leading `/` and no trailing `/`; `""` for the root
    #[must_use]
    pub fn normalized_prefix(&self) -> String {
        let trimmed = self.prefix.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }

    /// Absolute link for a panel-relative path such as `/a/app`
    #[must_use]
    pub fn link(&self, path: &str) -> String {
        format!("{}{}", self.normalized_prefix(), path)
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            name: "Admin".to_string(),
            prefix: "/admin".to_string(),
            default_instances_per_page: MIN_INSTANCES_PER_PAGE,
            render_style: RenderStyle::default(),
            nav_bar: Vec::new(),
            nav_bar_generators: NavBarGenerators::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = PanelConfig::new();
        assert_eq!(config.prefix, "/admin");
        assert_eq!(config.default_instances_per_page, 10);
        assert_eq!(config.render_style, RenderStyle::Panel);
    }

    #[test]
    fn prefix_normalization() {
        assert_eq!(PanelConfig::new().with_prefix("admin/").normalized_prefix(), "/admin");
        assert_eq!(PanelConfig::new().with_prefix("/").normalized_prefix(), "");
        assert_eq!(PanelConfig::new().link("/a/people"), "/admin/a/people");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = PanelConfig::from_toml_str("prefix = \"/staff\"\nrender_style = \"table\"\n").unwrap();
        assert_eq!(config.prefix, "/staff");
        assert_eq!(config.render_style, RenderStyle::Table);
        assert_eq!(config.default_instances_per_page, 10);
    }

    #[test]
    fn nav_bar_from_toml() {
        let text = r#"
[[nav_bar]]
name = "Site"
link = "/"

[[nav_bar]]
name = "Staff only"
bold = true
"#;
        let config = PanelConfig::from_toml_str(text).unwrap();
        assert_eq!(
            config.nav_bar,
            vec![NavBarItem::link("Site", "/"), NavBarItem::text("Staff only").with_bold(true)]
        );
        assert!(config.nav_bar_generators.is_empty());
    }

    #[test]
    fn rejects_bad_style() {
        assert!(PanelConfig::from_toml_str("render_style = \"cards\"").is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"Backoffice\"\ndefault_instances_per_page = 25").unwrap();
        let config = PanelConfig::load(file.path()).unwrap();
        assert_eq!(config.name, "Backoffice");
        assert_eq!(config.default_instances_per_page, 25);

        assert!(matches!(
            PanelConfig::load("/definitely/not/here.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
