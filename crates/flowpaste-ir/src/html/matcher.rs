//! Structural matching of complex selectors against markup elements.

use scraper::{ElementRef, Selector};
use tracing::{debug, info};

use crate::{
    css::{NormalizedSheet, SelectorRule, is_relocated_selector},
    diagnostics::diagnostics_enabled,
};

/// Outcome of testing one selector against one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorMatch {
    Matched,
    NoMatch,
    /// The matcher does not understand the selector (e.g. `:hover`).
    Unsupported,
}

/// A complex selector compiled once per conversion.
#[derive(Debug, Clone)]
pub struct CompiledSelector {
    pub rule: SelectorRule,
    compiled: Option<Selector>,
}

impl CompiledSelector {
    pub fn compile(rule: &SelectorRule) -> Self {
        let compiled = match Selector::parse(&rule.selector) {
            Ok(selector) => Some(selector),
            Err(err) => {
                debug!(selector = %rule.selector, error = ?err, "unsupported selector");
                if diagnostics_enabled("css") {
                    info!(selector = %rule.selector, "diagnostics: selector skipped by matcher");
                }
                None
            }
        };
        Self {
            rule: rule.clone(),
            compiled,
        }
    }

    pub fn selector(&self) -> &str {
        &self.rule.selector
    }

    pub fn is_supported(&self) -> bool {
        self.compiled.is_some()
    }

    pub fn matches(&self, element: &ElementRef<'_>) -> SelectorMatch {
        match &self.compiled {
            Some(selector) if selector.matches(element) => SelectorMatch::Matched,
            Some(_) => SelectorMatch::NoMatch,
            None => SelectorMatch::Unsupported,
        }
    }
}

/// Compiles every selector that is neither a bare `.class` nor already
/// relocated verbatim by the extractor.
pub fn compile_complex_selectors(sheet: &NormalizedSheet) -> Vec<CompiledSelector> {
    sheet
        .rules()
        .iter()
        .filter(|rule| rule.simple_class().is_none() && !is_relocated_selector(&rule.selector))
        .map(CompiledSelector::compile)
        .collect()
}
