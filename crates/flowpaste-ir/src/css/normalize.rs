use std::collections::HashMap;

use tracing::debug;

use super::{
    scanner::{CssItem, parse_declarations, scan, split_top_level, strip_comments},
    shorthand::expand_declaration,
};

/// Flattened declarations for one selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorRule {
    pub selector: String,
    /// Expanded `property: value;` declarations, space-joined, source order.
    pub declarations: String,
    /// The untouched declaration text, used when the rule is relocated.
    pub source_body: String,
}

impl SelectorRule {
    /// Renders the rule as plain CSS from its original declaration text.
    pub fn to_css(&self) -> String {
        format!("{} {{ {} }}", self.selector, self.source_body)
    }

    /// Literal class name when the selector is a bare `.class`.
    pub fn simple_class(&self) -> Option<&str> {
        simple_class_name(&self.selector)
    }
}

/// Selector to flat declaration mapping, kept in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct NormalizedSheet {
    rules: Vec<SelectorRule>,
    index: HashMap<String, usize>,
}

impl NormalizedSheet {
    /// Parses stylesheet text. `@media` and every other at-rule is skipped
    /// here; the extractor relocates those verbatim.
    pub fn parse(css: &str) -> Self {
        let stripped = strip_comments(css);
        let mut sheet = NormalizedSheet::default();
        for item in scan(&stripped) {
            let CssItem::Rule(rule) = item else {
                continue;
            };
            if rule.selector.starts_with('@') {
                continue;
            }
            let declarations: Vec<String> = parse_declarations(rule.body)
                .iter()
                .map(|decl| expand_declaration(&decl.property, &decl.value))
                .collect();
            if declarations.is_empty() {
                continue;
            }
            let declarations = declarations.join(" ");
            let body = rule.body.trim();
            for selector in split_top_level(rule.selector, b',') {
                sheet.insert(normalize_selector(selector), &declarations, body);
            }
        }
        debug!(selectors = sheet.rules.len(), "normalized stylesheet");
        sheet
    }

    /// Same-selector declarations are concatenated, never replaced.
    fn insert(&mut self, selector: String, declarations: &str, body: &str) {
        if let Some(&idx) = self.index.get(&selector) {
            let rule = &mut self.rules[idx];
            rule.declarations.push(' ');
            rule.declarations.push_str(declarations);
            rule.source_body.push(' ');
            rule.source_body.push_str(body);
            return;
        }
        self.index.insert(selector.clone(), self.rules.len());
        self.rules.push(SelectorRule {
            selector,
            declarations: declarations.to_string(),
            source_body: body.to_string(),
        });
    }

    pub fn get(&self, selector: &str) -> Option<&SelectorRule> {
        self.index.get(selector).map(|&idx| &self.rules[idx])
    }

    pub fn rules(&self) -> &[SelectorRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Collapses internal whitespace runs to single spaces.
pub fn normalize_selector(selector: &str) -> String {
    selector.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns the class name when `selector` is exactly one `.class`.
pub fn simple_class_name(selector: &str) -> Option<&str> {
    let name = selector.strip_prefix('.')?;
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii());
    valid.then_some(name)
}
