//! Field directive parsing
//!
//! A directive string is a `;`-separated list of `key` or `key:value` tokens,
//! for example `listDisplay:exclude;required;min:0;initial:18`. Only the first
//! `:` splits a token, so values may themselves contain colons.
//!
//! [`Directives`] keeps every token in order. [`Inclusion::resolve`]
//! interprets the inclusion keys and the display name; widget constraints are
//! read by the field builder.

use crate::error::DirectiveError;
use crate::humanize::humanize;

/// Toggle list-display inclusion
pub const LIST_DISPLAY: &str = "listDisplay";
/// Toggle list-fetch inclusion
pub const LIST_FETCH: &str = "listFetch";
/// Toggle search inclusion
pub const SEARCH: &str = "search";
/// Toggle instance-view inclusion
pub const VIEW: &str = "view";
/// Toggle add-form inclusion
pub const ADD_FORM: &str = "addForm";
/// Toggle edit-form inclusion
pub const EDIT_FORM: &str = "editForm";
/// Override the humanized display name
pub const DISPLAY_NAME: &str = "displayName";

const INCLUDE: &str = "include";
const EXCLUDE: &str = "exclude";

/// Parsed directive tokens in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    entries: Vec<(String, String)>,
}

impl Directives {
    /// Split a raw directive string
    ///
    /// Never fails; interpretation errors are raised by the consumers.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::default();
        }
        let entries = raw
            .split(';')
            .map(|token| match token.split_once(':') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (token.to_string(), String::new()),
            })
            .collect();
        Self { entries }
    }

    /// All `(key, value)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Last value given for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Check if `key` appears at all
    #[inline]
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Capability flags and display name resolved from directives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inclusion {
    pub list_display: bool,
    pub list_fetch: bool,
    pub search: bool,
    pub view: bool,
    pub add_form: bool,
    pub edit_form: bool,
    pub display_name: String,
}

impl Inclusion {
    /// Everything included, display name humanized from the field name
    #[must_use]
    pub fn defaults(field_name: &str) -> Self {
        Self {
            list_display: true,
            list_fetch: true,
            search: true,
            view: true,
            add_form: true,
            edit_form: true,
            display_name: humanize(field_name),
        }
    }

    /// Interpret the inclusion directives of one field
    ///
    /// When `listFetch` is absent, list-fetch is forced on for the primary
    /// key and mirrors list-display for every other field.
    ///
    /// # Errors
    /// [`DirectiveError::InvalidDirective`] when an inclusion key carries a
    /// value other than `include` or `exclude`, including an empty value.
    pub fn resolve(
        directives: &Directives,
        field_name: &str,
        is_primary_key: bool,
    ) -> Result<Self, DirectiveError> {
        let mut inclusion = Self::defaults(field_name);

        for (key, value) in directives.iter() {
            let slot = match key {
                LIST_DISPLAY => &mut inclusion.list_display,
                LIST_FETCH => &mut inclusion.list_fetch,
                SEARCH => &mut inclusion.search,
                VIEW => &mut inclusion.view,
                ADD_FORM => &mut inclusion.add_form,
                EDIT_FORM => &mut inclusion.edit_form,
                DISPLAY_NAME => {
                    inclusion.display_name = value.to_string();
                    continue;
                }
                _ => continue,
            };
            *slot = match value {
                INCLUDE => true,
                EXCLUDE => false,
                _ => return Err(DirectiveError::invalid(key, value)),
            };
        }

        if !directives.has(LIST_FETCH) {
            inclusion.list_fetch = is_primary_key || inclusion.list_display;
        }
        Ok(inclusion)
    }

    /// Check if the field needs a form widget at all
    #[inline]
    #[must_use]
    pub fn in_any_form(&self) -> bool {
        self.add_form || self.edit_form
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_string_yields_defaults() {
        let inclusion = Inclusion::resolve(&Directives::parse(""), "FirstName", false).unwrap();
        assert_eq!(inclusion, Inclusion::defaults("FirstName"));
        assert_eq!(inclusion.display_name, "First Name");
    }

    #[test]
    fn splits_on_first_colon_only() {
        let directives = Directives::parse("initial:12:30;required");
        assert_eq!(directives.get("initial"), Some("12:30"));
        assert_eq!(directives.get("required"), Some(""));
        assert!(directives.has("required"));
        assert!(!directives.has("min"));
    }

    #[test]
    fn last_value_wins() {
        let directives = Directives::parse("min:1;min:2");
        assert_eq!(directives.get("min"), Some("2"));
    }

    #[test]
    fn exclude_flags() {
        let directives = Directives::parse("search:exclude;view:exclude;addForm:exclude;editForm:exclude");
        let inclusion = Inclusion::resolve(&directives, "Notes", false).unwrap();
        assert!(!inclusion.search);
        assert!(!inclusion.view);
        assert!(!inclusion.in_any_form());
        assert!(inclusion.list_display);
    }

    #[test]
    fn list_fetch_mirrors_list_display() {
        let directives = Directives::parse("listDisplay:exclude");
        let inclusion = Inclusion::resolve(&directives, "Notes", false).unwrap();
        assert!(!inclusion.list_display);
        assert!(!inclusion.list_fetch);
    }

    #[test]
    fn primary_key_always_fetched_without_explicit_list_fetch() {
        let directives = Directives::parse("listDisplay:exclude");
        let inclusion = Inclusion::resolve(&directives, "ID", true).unwrap();
        assert!(!inclusion.list_display);
        assert!(inclusion.list_fetch);
    }

    #[test]
    fn explicit_list_fetch_wins() {
        let directives = Directives::parse("listDisplay:exclude;listFetch:include");
        assert!(Inclusion::resolve(&directives, "Notes", false).unwrap().list_fetch);

        let directives = Directives::parse("listFetch:exclude");
        assert!(!Inclusion::resolve(&directives, "ID", true).unwrap().list_fetch);
    }

    #[test]
    fn invalid_value_names_key_and_value() {
        let err = Inclusion::resolve(&Directives::parse("search:maybe"), "Notes", false).unwrap_err();
        assert_eq!(err, DirectiveError::invalid("search", "maybe"));
        assert_eq!(err.to_string(), "invalid value for 'search' directive: 'maybe'");
    }

    #[test]
    fn bare_inclusion_key_is_invalid() {
        for key in [LIST_DISPLAY, LIST_FETCH, SEARCH, VIEW, ADD_FORM, EDIT_FORM] {
            assert!(Inclusion::resolve(&Directives::parse(key), "Notes", false).is_err(), "{key}");
        }
    }

    #[test]
    fn display_name_override_and_unknown_keys() {
        let directives = Directives::parse("displayName:E-mail address;futureKey:whatever;;");
        let inclusion = Inclusion::resolve(&directives, "Email", false).unwrap();
        assert_eq!(inclusion.display_name, "E-mail address");
    }
}
