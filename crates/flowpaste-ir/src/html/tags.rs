//! Fixed tag and attribute tables used by the usage filter and the walker.

use scraper::ElementRef;

use crate::xscp::{Attribute, ElementType};

/// How the walker treats an element before any classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagDisposition {
    /// Produces no node; children are hoisted into the parent.
    Ignored,
    /// Produces nothing, subtree included (metadata that never renders).
    Dropped,
    /// Serialized whole into one embed node.
    Opaque { script: bool },
    /// Inline `<style>` blocks, excised before the walk.
    Style,
    /// Mapped to a target type, or a passthrough element when unmapped.
    Element,
}

pub fn disposition(tag: &str) -> TagDisposition {
    match tag {
        "script" => TagDisposition::Opaque { script: true },
        "svg" => TagDisposition::Opaque { script: false },
        "style" => TagDisposition::Style,
        "title" | "noscript" | "template" => TagDisposition::Dropped,
        // Document structure.
        "html" | "head" | "body" | "meta" | "link" | "base"
        // Table sections.
        | "table" | "thead" | "tbody" | "tfoot" | "tr" | "td" | "th" | "caption" | "colgroup"
        | "col"
        // Void elements other than `img`.
        | "br" | "hr" | "wbr" | "input" | "source" | "track" | "area" | "embed" | "param"
        // Media embeds.
        | "picture" | "video" | "audio" | "iframe" | "canvas" | "object" => TagDisposition::Ignored,
        _ => TagDisposition::Element,
    }
}

/// Target type for recognized tags; `None` takes the passthrough path.
pub fn element_type_for(tag: &str) -> Option<ElementType> {
    let element_type = match tag {
        "div" | "header" | "footer" | "nav" | "main" | "article" | "aside" => ElementType::Block,
        "section" => ElementType::Section,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => ElementType::Heading,
        "p" => ElementType::Paragraph,
        "a" => ElementType::Link,
        "img" => ElementType::Image,
        "ul" | "ol" => ElementType::List,
        "li" => ElementType::ListItem,
        "em" | "i" => ElementType::Emphasized,
        "strong" | "b" => ElementType::Strong,
        "blockquote" => ElementType::Blockquote,
        "figure" => ElementType::Figure,
        "figcaption" => ElementType::Figcaption,
        _ => return None,
    };
    Some(element_type)
}

const STANDARD_ATTRIBUTES: &[&str] = &[
    "class",
    "id",
    "style",
    "src",
    "alt",
    "href",
    "target",
    "width",
    "height",
    "loading",
    "type",
    "name",
    "value",
    "placeholder",
    "disabled",
    "readonly",
    "checked",
    "selected",
    "for",
    "action",
    "method",
    "enctype",
    "rel",
    "media",
];

pub fn is_custom_attribute(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.starts_with("data-")
        || name.starts_with("aria-")
        || !STANDARD_ATTRIBUTES.contains(&name.as_str())
}

/// Every attribute in source order.
pub fn all_attributes(element: &ElementRef<'_>) -> Vec<Attribute> {
    element
        .value()
        .attrs()
        .map(|(name, value)| Attribute::new(name, value))
        .collect()
}

/// The `data-*`, `aria-*` and non-standard subset of [`all_attributes`].
pub fn custom_attributes(element: &ElementRef<'_>) -> Vec<Attribute> {
    all_attributes(element)
        .into_iter()
        .filter(|attr| is_custom_attribute(&attr.name))
        .collect()
}
