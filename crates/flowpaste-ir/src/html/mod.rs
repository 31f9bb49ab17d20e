//! Markup + CSS to clipboard document conversion.

mod finalize;
mod matcher;
mod merge;
mod session;
mod tags;
mod usage;
mod walker;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

pub use matcher::SelectorMatch;
pub use merge::synthetic_class_name;
pub use session::RelocatedCss;
pub use tags::{TagDisposition, disposition, element_type_for, is_custom_attribute};

use crate::{
    css::{AdvancedCss, NormalizedSheet},
    diagnostics::diagnostics_enabled,
    error::{ConvertError, Result},
    xscp::XscpDocument,
};
use session::ConversionSession;

/// Asset identifier written into every image node.
pub const DEFAULT_ASSET_PLACEHOLDER: &str = "placeholder-image";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub asset_placeholder: String,
    /// Wrap section content in a container unless one is already present.
    pub wrap_sections: bool,
    pub relocate_unused_classes: bool,
    pub relocate_unsupported_selectors: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            asset_placeholder: DEFAULT_ASSET_PLACEHOLDER.to_string(),
            wrap_sections: true,
            relocate_unused_classes: true,
            relocate_unsupported_selectors: true,
        }
    }
}

/// Converts markup and an external stylesheet with default options.
pub fn convert(markup: &str, css: &str) -> Result<XscpDocument> {
    convert_with_options(markup, css, &ConvertOptions::default())
}

pub fn convert_with_options(
    markup: &str,
    css: &str,
    options: &ConvertOptions,
) -> Result<XscpDocument> {
    if markup.trim().is_empty() {
        return Err(ConvertError::EmptyInput);
    }
    Converter::new(Html::parse_document(markup), options).into_document(css)
}

struct Converter<'a> {
    html: Html,
    options: &'a ConvertOptions,
}

impl<'a> Converter<'a> {
    fn new(html: Html, options: &'a ConvertOptions) -> Self {
        Self { html, options }
    }

    fn into_document(self, external_css: &str) -> Result<XscpDocument> {
        let inline = inline_style_blocks(&self.html);
        if !inline.is_empty() {
            debug!(blocks = inline.len(), "collected inline style blocks");
        }
        let css = effective_css(external_css, &inline);

        let sheet = NormalizedSheet::parse(&css);
        let advanced = AdvancedCss::extract(&css);
        let used_classes = usage::collect_used_classes(&self.html);
        if diagnostics_enabled("css") {
            info!(
                selectors = sheet.len(),
                advanced_blocks = advanced.len(),
                used_classes = used_classes.len(),
                "diagnostics: stylesheet prepared"
            );
        }

        let mut session = ConversionSession::new(self.options, &sheet, advanced, used_classes);
        let top_level = session.walk(&self.html);
        let embed = session.relocated_embed();
        session.finalize(top_level, embed)?;
        session.log_summary();

        Ok(XscpDocument::new(session.nodes, session.registry.into_styles()))
    }
}

/// Text of every `<style>` block outside inline SVG, in document order.
fn inline_style_blocks(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("style") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter(|node| !inside_svg(node))
        .map(|node| node.text().collect::<String>())
        .filter(|text| !text.trim().is_empty())
        .collect()
}

fn inside_svg(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name().eq_ignore_ascii_case("svg"))
}

/// External CSS first, then inline blocks, so inline rules win ties.
fn effective_css(external: &str, inline: &[String]) -> String {
    let mut css = String::with_capacity(external.len() + inline.iter().map(String::len).sum::<usize>());
    css.push_str(external);
    for block in inline {
        css.push('\n');
        css.push_str(block);
    }
    css
}
