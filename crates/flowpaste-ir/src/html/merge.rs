//! Style registry and the merge decisions for matched complex selectors.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::session::IdGenerator;
use crate::xscp::{Style, StyleId};

/// Tags whose bare selectors get a fixed `custom-<tag>` style name.
const TAG_SLUG_TAGS: &[&str] = &[
    "a", "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "img", "section", "div",
    "span", "blockquote", "figure", "figcaption", "em", "strong", "nav", "header", "footer",
    "main", "article", "aside", "button", "label",
];

/// All styles of one conversion plus the lookup tables used to mutate them.
#[derive(Debug, Default)]
pub struct StyleRegistry {
    styles: Vec<Style>,
    /// Style id to position in `styles`, for in-place merges.
    by_id: HashMap<StyleId, usize>,
    /// Class name (literal or synthesized) to style id.
    by_class: HashMap<String, StyleId>,
    /// Complex selector to synthesized class name.
    synthetic: HashMap<String, String>,
    /// (target style, selector) pairs already folded in.
    merged: HashSet<(StyleId, String)>,
}

impl StyleRegistry {
    pub fn styles(&self) -> &[Style] {
        &self.styles
    }

    pub fn into_styles(self) -> Vec<Style> {
        self.styles
    }

    pub fn class_style(&self, class: &str) -> Option<&StyleId> {
        self.by_class.get(class)
    }

    /// Registers a style for a literal class name.
    pub fn add_class(&mut self, ids: &mut IdGenerator, class: &str, declarations: &str) -> StyleId {
        if let Some(existing) = self.by_class.get(class) {
            return existing.clone();
        }
        self.insert(ids, class.to_string(), declarations)
    }

    fn insert(&mut self, ids: &mut IdGenerator, name: String, declarations: &str) -> StyleId {
        let id = ids.next_id();
        self.by_id.insert(id.clone(), self.styles.len());
        self.by_class.insert(name.clone(), id.clone());
        self.styles.push(Style::class(id.clone(), name, declarations));
        id
    }

    /// Applies a matched complex selector to an element.
    ///
    /// `literal_count` is the number of leading entries in `classes` that came
    /// from the element's own class tokens. When there is at least one, the
    /// declarations are appended to the first of them, once per
    /// (style, selector) pair. Otherwise a synthetic style shared by every
    /// element matching `selector` is attached.
    pub fn merge_selector(
        &mut self,
        ids: &mut IdGenerator,
        classes: &mut Vec<StyleId>,
        literal_count: usize,
        selector: &str,
        declarations: &str,
    ) {
        if literal_count > 0 {
            let target = classes[0].clone();
            if !self.merged.insert((target.clone(), selector.to_string())) {
                return;
            }
            if let Some(&idx) = self.by_id.get(&target) {
                debug!(selector, style = %self.styles[idx].name, "merged selector into class style");
                self.styles[idx].append_declarations(declarations);
            }
            return;
        }
        let style_id = self.synthetic_style(ids, selector, declarations);
        if !classes.contains(&style_id) {
            classes.push(style_id);
        }
    }

    fn synthetic_style(&mut self, ids: &mut IdGenerator, selector: &str, declarations: &str) -> StyleId {
        if let Some(id) = self
            .synthetic
            .get(selector)
            .and_then(|name| self.by_class.get(name))
        {
            return id.clone();
        }
        let name = self.unique_name(synthetic_class_name(selector));
        debug!(selector, name = %name, "synthesized selector style");
        self.synthetic.insert(selector.to_string(), name.clone());
        self.insert(ids, name, declarations)
    }

    fn unique_name(&self, base: String) -> String {
        if !self.by_class.contains_key(&base) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}-{n}");
            if !self.by_class.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Style name for a selector with no literal class to merge into.
pub fn synthetic_class_name(selector: &str) -> String {
    let lower = selector.trim().to_lowercase();
    if TAG_SLUG_TAGS.contains(&lower.as_str()) {
        return format!("custom-{lower}");
    }
    let slug = slugify(&lower);
    if slug.is_empty() {
        "sel-style".to_string()
    } else {
        format!("sel-{slug}")
    }
}

/// Keeps word characters and hyphens; whitespace runs become one hyphen.
fn slugify(input: &str) -> String {
    let kept: String = input
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();
    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_names_for_tags_and_selectors() {
        assert_eq!(synthetic_class_name("h2"), "custom-h2");
        assert_eq!(synthetic_class_name("UL"), "custom-ul");
        assert_eq!(synthetic_class_name(".card > h2"), "sel-card-h2");
        assert_eq!(synthetic_class_name(".nav-list li:first-child"), "sel-nav-list-lifirst-child");
        assert_eq!(synthetic_class_name("> >"), "sel-style");
    }

    #[test]
    fn merges_into_first_literal_class_once() {
        let mut ids = IdGenerator::new();
        let mut registry = StyleRegistry::default();
        let card = registry.add_class(&mut ids, "card", "color: red;");
        let wide = registry.add_class(&mut ids, "wide", "width: 100%;");
        let mut classes = vec![card.clone(), wide];

        registry.merge_selector(&mut ids, &mut classes, 2, "section .card", "margin-top: 0;");
        registry.merge_selector(&mut ids, &mut classes, 2, "section .card", "margin-top: 0;");

        assert_eq!(classes.len(), 2);
        let style = registry
            .styles()
            .iter()
            .find(|style| style.id == card)
            .expect("card style");
        assert_eq!(style.style_less, "color: red; margin-top: 0;");
    }

    #[test]
    fn synthetic_style_is_shared_between_elements() {
        let mut ids = IdGenerator::new();
        let mut registry = StyleRegistry::default();
        let mut first = Vec::new();
        let mut second = Vec::new();

        registry.merge_selector(&mut ids, &mut first, 0, "h2", "font-size: 2rem;");
        registry.merge_selector(&mut ids, &mut second, 0, "h2", "font-size: 2rem;");

        assert_eq!(first, second);
        assert_eq!(registry.styles().len(), 1);
        assert_eq!(registry.styles()[0].name, "custom-h2");
        assert_eq!(registry.styles()[0].style_less, "font-size: 2rem;");
    }

    #[test]
    fn colliding_synthetic_names_get_suffixes() {
        let mut ids = IdGenerator::new();
        let mut registry = StyleRegistry::default();
        let mut a = Vec::new();
        let mut b = Vec::new();
        registry.merge_selector(&mut ids, &mut a, 0, ".card h2", "color: red;");
        registry.merge_selector(&mut ids, &mut b, 0, ".card > h2", "color: blue;");
        let names: Vec<&str> = registry.styles().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["sel-card-h2", "sel-card-h2-2"]);
    }
}
