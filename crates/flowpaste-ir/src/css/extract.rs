//! Relocation of stylesheet constructs that have no per-element style form.
//!
//! Each top-level item is assigned to at most one category, evaluated in
//! [`AdvancedCategory`] order, so no construct is emitted twice.

use tracing::debug;

use super::{
    normalize::normalize_selector,
    scanner::{CssItem, QualifiedRule, scan, split_top_level, strip_comments},
};

/// Extraction categories in priority and output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AdvancedCategory {
    RootVariables,
    Media,
    AttributeSelector,
    FunctionalPseudo,
    GlobalSelector,
    Keyframes,
    FontFace,
    Import,
    /// `@supports`, `@container`, `@layer` blocks. The normalizer skips every
    /// at-rule, so these would otherwise vanish.
    Conditional,
}

const FUNCTIONAL_PSEUDOS: &[&str] = &[":is(", ":where(", ":has(", ":not("];
const GLOBAL_SELECTORS: &[&str] = &["html", "body", "*", ":root"];
const CONDITIONAL_AT_RULES: &[&str] = &["supports", "container", "layer"];

/// Verbatim CSS pulled out of a stylesheet, grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvancedCss {
    blocks: Vec<(AdvancedCategory, String)>,
}

impl AdvancedCss {
    pub fn extract(css: &str) -> Self {
        let stripped = strip_comments(css);
        let mut blocks: Vec<(AdvancedCategory, String)> = Vec::new();
        for item in scan(&stripped) {
            match item {
                CssItem::Rule(rule) => blocks.extend(relocate_rule(&rule)),
                _ => {
                    if let Some(category) = classify_at_rule(&item) {
                        blocks.push((category, item.source().to_string()));
                    }
                }
            }
        }
        // Stable: source order is kept within a category.
        blocks.sort_by_key(|(category, _)| *category);
        debug!(blocks = blocks.len(), "extracted advanced css");
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn blocks(&self, category: AdvancedCategory) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .filter(move |(cat, _)| *cat == category)
            .map(|(_, source)| source.as_str())
    }

    /// All blocks, newline-joined in category order.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(|(_, source)| source.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn classify_at_rule(item: &CssItem<'_>) -> Option<AdvancedCategory> {
    match item {
        CssItem::Rule(_) => None,
        CssItem::AtBlock(rule) => {
            if rule.is("media") {
                Some(AdvancedCategory::Media)
            } else if rule.name.to_ascii_lowercase().ends_with("keyframes") {
                Some(AdvancedCategory::Keyframes)
            } else if rule.is("font-face") {
                Some(AdvancedCategory::FontFace)
            } else if CONDITIONAL_AT_RULES.iter().any(|name| rule.is(name)) {
                Some(AdvancedCategory::Conditional)
            } else {
                None
            }
        }
        CssItem::AtStatement(rule) => rule.is("import").then_some(AdvancedCategory::Import),
    }
}

/// Blocks to relocate for one qualified rule.
///
/// A list whose members are all relocated ships as its original text under
/// the highest-priority member category. In a mixed list only the relocated
/// members ship, each rebuilt as its own rule; the remaining members stay in
/// the normalized sheet.
fn relocate_rule(rule: &QualifiedRule<'_>) -> Vec<(AdvancedCategory, String)> {
    let selector = normalize_selector(rule.selector);
    let members: Vec<(&str, Option<AdvancedCategory>)> = split_top_level(&selector, b',')
        .into_iter()
        .map(|member| (member, classify_selector(member)))
        .collect();

    if members.iter().all(|(_, category)| category.is_some()) {
        return members
            .iter()
            .filter_map(|(_, category)| *category)
            .min()
            .map(|category| (category, rule.source.to_string()))
            .into_iter()
            .collect();
    }
    let body = rule.body.trim();
    members
        .into_iter()
        .filter_map(|(member, category)| {
            category.map(|category| (category, format!("{member} {{ {body} }}")))
        })
        .collect()
}

fn classify_selector(selector: &str) -> Option<AdvancedCategory> {
    if selector == ":root" {
        Some(AdvancedCategory::RootVariables)
    } else if has_attribute_matcher(selector) {
        Some(AdvancedCategory::AttributeSelector)
    } else if has_functional_pseudo(selector) {
        Some(AdvancedCategory::FunctionalPseudo)
    } else if is_global_selector(selector) {
        Some(AdvancedCategory::GlobalSelector)
    } else {
        None
    }
}

/// Whether a single selector is already shipped verbatim by the extractor.
pub fn is_relocated_selector(selector: &str) -> bool {
    classify_selector(selector.trim()).is_some()
}

fn has_attribute_matcher(selector: &str) -> bool {
    selector.contains('[')
}

/// `:is()`, `:where()`, `:has()` or `:not()` with non-empty arguments.
fn has_functional_pseudo(selector: &str) -> bool {
    let lower = selector.to_ascii_lowercase();
    FUNCTIONAL_PSEUDOS.iter().any(|marker| {
        lower.match_indices(marker).any(|(idx, _)| {
            let args = &lower[idx + marker.len()..];
            let inner = args.split(')').next().unwrap_or_default();
            !inner.trim().is_empty()
        })
    })
}

/// `html`, `body`, `*` or `:root`, optionally followed by pseudo-classes or
/// pseudo-elements, with no combinator.
fn is_global_selector(selector: &str) -> bool {
    let selector = selector.trim();
    if selector.contains(|c: char| c.is_whitespace() || matches!(c, '>' | '+' | '~')) {
        return false;
    }
    GLOBAL_SELECTORS.iter().any(|global| {
        selector
            .strip_prefix(global)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(':'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = r##"
@import url("fonts.css");
.a { color: red; }
@keyframes spin { from { transform: rotate(0); } to { transform: rotate(360deg); } }
*, *::before { box-sizing: border-box; }
.list > li:not(.active) { opacity: .5; }
a[href^="#"] { color: blue; }
input:not([disabled]) { border: 1px solid; }
:root { --brand: #ff0066; }
@media (max-width: 600px) { .a { color: blue; } }
@font-face { font-family: Inter; src: url(inter.woff2); }
body { margin: 0; }
.b:not() { color: green; }
@supports (display: grid) { .grid { display: grid; } }
"##;

    #[test]
    fn categories_follow_priority_order() {
        let css = AdvancedCss::extract(SHEET);
        let text = css.text();
        let order = [
            ":root {",
            "@media (max-width",
            "a[href^=",
            "input:not([disabled])",
            ".list > li:not(.active)",
            "*, *::before",
            "body { margin",
            "@keyframes spin",
            "@font-face",
            "@import",
            "@supports",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|needle| text.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text}");
    }

    #[test]
    fn attribute_rules_are_not_duplicated_as_pseudo_rules() {
        let css = AdvancedCss::extract(SHEET);
        assert_eq!(css.text().matches("input:not([disabled])").count(), 1);
        assert_eq!(css.blocks(AdvancedCategory::AttributeSelector).count(), 2);
        assert_eq!(css.blocks(AdvancedCategory::FunctionalPseudo).count(), 1);
    }

    #[test]
    fn plain_rules_and_trivial_pseudos_stay_out() {
        let css = AdvancedCss::extract(SHEET);
        let text = css.text();
        assert!(!text.contains(".a { color: red; }"));
        assert!(!text.contains(".b:not()"));
    }

    #[test]
    fn media_blocks_are_verbatim() {
        let css = AdvancedCss::extract(SHEET);
        let media: Vec<&str> = css.blocks(AdvancedCategory::Media).collect();
        assert_eq!(media, vec!["@media (max-width: 600px) { .a { color: blue; } }"]);
    }

    #[test]
    fn relocated_selector_detection() {
        assert!(is_relocated_selector("*"));
        assert!(is_relocated_selector("*::after"));
        assert!(is_relocated_selector("html"));
        assert!(is_relocated_selector(":root"));
        assert!(is_relocated_selector("a[target]"));
        assert!(is_relocated_selector("li:is(.x)"));
        assert!(!is_relocated_selector("body .card"));
        assert!(!is_relocated_selector("bodyish"));
        assert!(!is_relocated_selector(".card h2"));
    }

    #[test]
    fn mixed_selector_lists_relocate_only_their_relocated_members() {
        let css = AdvancedCss::extract(
            "body, .wrapper { margin: 0; }\nh1, a[href], :is(.x) { color: red; }",
        );
        let globals: Vec<&str> = css.blocks(AdvancedCategory::GlobalSelector).collect();
        assert_eq!(globals, vec!["body { margin: 0; }"]);
        let attributes: Vec<&str> = css.blocks(AdvancedCategory::AttributeSelector).collect();
        assert_eq!(attributes, vec!["a[href] { color: red; }"]);
        let pseudos: Vec<&str> = css.blocks(AdvancedCategory::FunctionalPseudo).collect();
        assert_eq!(pseudos, vec![":is(.x) { color: red; }"]);
        assert!(!css.text().contains(".wrapper"));
        assert!(!css.text().contains("h1"));
    }

    #[test]
    fn fully_relocated_lists_keep_their_source_text() {
        let css = AdvancedCss::extract("html, body { height: 100%; }\ninput[type], body { font: inherit; }");
        assert_eq!(
            css.blocks(AdvancedCategory::AttributeSelector).collect::<Vec<_>>(),
            vec!["input[type], body { font: inherit; }"]
        );
        assert_eq!(
            css.blocks(AdvancedCategory::GlobalSelector).collect::<Vec<_>>(),
            vec!["html, body { height: 100%; }"]
        );
    }

    #[test]
    fn empty_sheet_extracts_nothing() {
        assert!(AdvancedCss::extract(".a { color: red; }").is_empty());
    }
}
