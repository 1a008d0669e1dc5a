//! Directive Matching
//!
//! CSS selector parsing and matching of directive selectors against template
//! elements.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CompilerError, Result};

static SELECTOR_REGEXP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(:not\()|(([\.#]?)[-\w]+)|(?:\[([-.\w*\\$]+)(?:=(?:"([^"]*)"|'([^']*)'|([^\]]*)))?\])|(\))|(\s*,\s*)"#,
    )
    .expect("selector grammar is a valid regular expression")
});

/// Capture groups of [`SELECTOR_REGEXP`].
#[derive(Debug, Clone, Copy)]
enum SelectorRegexp {
    Not = 1,
    Tag = 2,
    Prefix = 3,
    Attribute = 4,
    AttributeValueDouble = 5,
    AttributeValueSingle = 6,
    AttributeValueUnquoted = 7,
    NotEnd = 8,
    Separator = 9,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CssSelector {
    pub element: Option<String>,
    pub class_names: Vec<String>,
    /// `(name, lowercased value)`; an empty value matches any value.
    pub attrs: Vec<(String, String)>,
    pub not_selectors: Vec<CssSelector>,
}

impl CssSelector {
    pub fn new() -> Self {
        CssSelector::default()
    }

    /// Parses a comma separated selector list.
    pub fn parse(selector: &str) -> Result<Vec<CssSelector>> {
        let invalid = |message: &str| CompilerError::InvalidSelector {
            selector: selector.to_string(),
            message: message.to_string(),
        };

        let mut results = Vec::new();
        let mut current = CssSelector::new();
        let mut in_not = false;

        for cap in SELECTOR_REGEXP.captures_iter(selector) {
            if cap.get(SelectorRegexp::Not as usize).is_some() {
                if in_not {
                    return Err(invalid("Nesting :not in a selector is not allowed"));
                }
                in_not = true;
                current.not_selectors.push(CssSelector::new());
            }

            let target = if in_not {
                current.not_selectors.last_mut().ok_or_else(|| invalid("Dangling :not"))?
            } else {
                &mut current
            };

            if let Some(tag) = cap.get(SelectorRegexp::Tag as usize) {
                let prefix = cap.get(SelectorRegexp::Prefix as usize).map_or("", |m| m.as_str());
                let tag = tag.as_str();
                match prefix {
                    "#" => target.add_attribute("id", &tag[1..]),
                    "." => target.add_class_name(&tag[1..]),
                    _ => target.set_element(tag),
                }
            }

            if let Some(attr) = cap.get(SelectorRegexp::Attribute as usize) {
                let value = [
                    SelectorRegexp::AttributeValueDouble,
                    SelectorRegexp::AttributeValueSingle,
                    SelectorRegexp::AttributeValueUnquoted,
                ]
                .iter()
                .find_map(|group| cap.get(*group as usize))
                .map_or("", |m| m.as_str());
                let name = unescape_attribute(attr.as_str()).map_err(|msg| invalid(&msg))?;
                target.add_attribute(&name, value);
            }

            if cap.get(SelectorRegexp::NotEnd as usize).is_some() {
                in_not = false;
            }

            if cap.get(SelectorRegexp::Separator as usize).is_some() {
                if in_not {
                    return Err(invalid("Multiple selectors in :not are not supported"));
                }
                push_result(&mut results, std::mem::take(&mut current));
            }
        }

        push_result(&mut results, current);
        Ok(results)
    }

    pub fn set_element(&mut self, element: &str) {
        self.element = Some(element.to_string());
    }

    pub fn add_attribute(&mut self, name: &str, value: &str) {
        self.attrs.push((name.to_string(), value.to_lowercase()));
    }

    pub fn add_class_name(&mut self, name: &str) {
        self.class_names.push(name.to_lowercase());
    }

    pub fn has_element_selector(&self) -> bool {
        self.element.as_deref().map_or(false, |e| e != "*")
    }

    /// Tests this selector against an element description.
    pub fn matches(&self, element: &ElementSelectorInput) -> bool {
        if self.has_element_selector() && self.element.as_deref() != Some(element.tag_name.as_str()) {
            return false;
        }
        let classes = element.class_names();
        if !self.class_names.iter().all(|c| classes.contains(c)) {
            return false;
        }
        let attrs_match = self.attrs.iter().all(|(name, value)| {
            element
                .attrs
                .iter()
                .any(|(n, v)| n == name && (value.is_empty() || v.to_lowercase() == *value))
        });
        attrs_match && !self.not_selectors.iter().any(|not| not.matches(element))
    }
}

impl std::fmt::Display for CssSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = self.element.clone().unwrap_or_default();
        for class in &self.class_names {
            out.push('.');
            out.push_str(class);
        }
        for (name, value) in &self.attrs {
            let name = name.replace('$', "\\$");
            if value.is_empty() {
                out.push_str(&format!("[{}]", name));
            } else {
                out.push_str(&format!("[{}={}]", name, value));
            }
        }
        for not in &self.not_selectors {
            out.push_str(&format!(":not({})", not));
        }
        f.write_str(&out)
    }
}

fn push_result(results: &mut Vec<CssSelector>, mut selector: CssSelector) {
    if !selector.not_selectors.is_empty()
        && selector.element.is_none()
        && selector.class_names.is_empty()
        && selector.attrs.is_empty()
    {
        selector.element = Some("*".to_string());
    }
    results.push(selector);
}

fn unescape_attribute(attr: &str) -> std::result::Result<String, String> {
    let mut result = String::new();
    let mut escaping = false;
    for ch in attr.chars() {
        if ch == '\\' {
            escaping = true;
            continue;
        }
        if ch == '$' && !escaping {
            return Err(format!(
                "Error in attribute selector \"{}\". Unescaped \"$\" is not supported. Please escape with \"\\$\".",
                attr
            ));
        }
        escaping = false;
        result.push(ch);
    }
    Ok(result)
}

/// Tag name plus `(name, value)` attribute pairs of a template element, as
/// seen by directive matching. Bound inputs and outputs appear with empty values.
#[derive(Debug, Clone, Default)]
pub struct ElementSelectorInput {
    pub tag_name: String,
    pub attrs: Vec<(String, String)>,
}

impl ElementSelectorInput {
    pub fn new(tag_name: impl Into<String>) -> Self {
        ElementSelectorInput { tag_name: tag_name.into(), attrs: Vec::new() }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    fn class_names(&self) -> Vec<String> {
        self.attrs
            .iter()
            .filter(|(name, _)| name == "class")
            .flat_map(|(_, value)| value.split_whitespace().map(str::to_lowercase))
            .collect()
    }
}

/// Collection of selectors mapped to arbitrary payloads, matched in insertion order.
#[derive(Debug, Clone)]
pub struct SelectorMatcher<T> {
    entries: Vec<(Vec<CssSelector>, T)>,
}

impl<T> Default for SelectorMatcher<T> {
    fn default() -> Self {
        SelectorMatcher { entries: Vec::new() }
    }
}

impl<T> SelectorMatcher<T> {
    pub fn new() -> Self {
        SelectorMatcher::default()
    }

    pub fn add_selectables(&mut self, selectors: Vec<CssSelector>, context: T) {
        self.entries.push((selectors, context));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Payloads whose selector list has at least one selector matching `element`.
    pub fn match_element(&self, element: &ElementSelectorInput) -> Vec<&T> {
        self.entries
            .iter()
            .filter(|(selectors, _)| selectors.iter().any(|s| s.matches(element)))
            .map(|(_, context)| context)
            .collect()
    }
}
