//! Single top-down pass turning the markup tree into schema nodes.

use std::{
    collections::HashSet,
    sync::{Mutex, OnceLock},
};

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node as DomNode};
use tracing::{debug, info};

use super::{
    matcher::SelectorMatch,
    session::ConversionSession,
    tags::{TagDisposition, all_attributes, custom_attributes, disposition, element_type_for},
};
use crate::{
    diagnostics::diagnostics_enabled,
    xscp::{
        ElementData, ElementNode, ElementPayload, ElementType, EmbedNode, GridMarker, ImageAsset,
        ImageAttributes, LinkData, LinkMode, ListRole, Node, NodeId, StyleId, TextNode,
    },
};

impl ConversionSession<'_> {
    /// Walks the whole document and returns the top-level node ids in order.
    pub(crate) fn walk(&mut self, document: &Html) -> Vec<NodeId> {
        self.convert_children(document.tree.root())
    }

    fn convert_children(&mut self, node: NodeRef<'_, DomNode>) -> Vec<NodeId> {
        let mut ids = Vec::new();
        for child in node.children() {
            ids.extend(self.convert_node(child));
        }
        ids
    }

    fn convert_node(&mut self, node: NodeRef<'_, DomNode>) -> Vec<NodeId> {
        match node.value() {
            DomNode::Text(text) => {
                let content = text.trim();
                if content.is_empty() {
                    return Vec::new();
                }
                let id = self.ids.next_id();
                vec![self.push_node(Node::Text(TextNode::new(id, content)))]
            }
            DomNode::Element(_) => match ElementRef::wrap(node) {
                Some(element) => self.convert_element(element),
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn convert_element(&mut self, element: ElementRef<'_>) -> Vec<NodeId> {
        let tag = element.value().name().to_ascii_lowercase();
        match disposition(&tag) {
            TagDisposition::Dropped | TagDisposition::Style => Vec::new(),
            TagDisposition::Ignored => self.convert_children(*element),
            TagDisposition::Opaque { script } => {
                let id = self.ids.next_id();
                vec![self.push_node(Node::Embed(EmbedNode::new(id, element.html(), script)))]
            }
            TagDisposition::Element => vec![self.build_element(element, &tag)],
        }
    }

    fn build_element(&mut self, element: ElementRef<'_>, tag: &str) -> NodeId {
        let id = self.ids.next_id();
        let element_type = element_type_for(tag).unwrap_or_else(|| {
            log_passthrough_tag_once(tag);
            ElementType::Passthrough
        });
        let classes = self.resolve_classes(&element);
        let mut children = self.convert_children(*element);

        if element_type == ElementType::Section
            && self.options.wrap_sections
            && !children.is_empty()
            && !has_container_child(&element)
        {
            let wrapper_id = self.ids.next_id();
            let wrapper = ElementNode::container(wrapper_id, children);
            children = vec![self.push_node(Node::Element(wrapper))];
        }

        let payload = self.payload_for(element_type, &element);
        let node = ElementNode {
            id,
            element_type,
            tag: tag.to_string(),
            classes,
            children,
            data: ElementData {
                tag: tag.to_string(),
                xattr: custom_attributes(&element),
                payload,
            },
        };
        self.push_node(Node::Element(node))
    }

    /// Literal class styles first, then complex-selector matches.
    fn resolve_classes(&mut self, element: &ElementRef<'_>) -> Vec<StyleId> {
        let mut classes: Vec<StyleId> = Vec::new();
        for class in element.value().classes() {
            if let Some(style_id) = self.registry.class_style(class) {
                if !classes.contains(style_id) {
                    classes.push(style_id.clone());
                }
            }
        }
        let literal_count = classes.len();
        for compiled in &self.selectors {
            match compiled.matches(element) {
                SelectorMatch::Matched => self.registry.merge_selector(
                    &mut self.ids,
                    &mut classes,
                    literal_count,
                    compiled.selector(),
                    &compiled.rule.declarations,
                ),
                SelectorMatch::NoMatch | SelectorMatch::Unsupported => {}
            }
        }
        classes
    }

    fn payload_for(&self, element_type: ElementType, element: &ElementRef<'_>) -> ElementPayload {
        let attr = |name: &str| element.value().attr(name).map(str::trim);
        match element_type {
            ElementType::Section => ElementPayload::Section {
                grid: GridMarker::Section,
            },
            ElementType::Link => {
                let href = attr("href").unwrap_or_default();
                ElementPayload::Link {
                    link: LinkData {
                        mode: LinkMode::from_href(href),
                        url: href.to_string(),
                        target: attr("target")
                            .filter(|t| !t.is_empty())
                            .unwrap_or("_self")
                            .to_string(),
                    },
                }
            }
            ElementType::Image => ElementPayload::Image {
                img: ImageAsset {
                    id: self.options.asset_placeholder.clone(),
                },
                attr: ImageAttributes {
                    src: attr("src").unwrap_or_default().to_string(),
                    alt: attr("alt").unwrap_or_default().to_string(),
                    loading: non_empty_or(attr("loading"), "lazy"),
                    width: non_empty_or(attr("width"), "auto"),
                    height: non_empty_or(attr("height"), "auto"),
                },
            },
            ElementType::List => ElementPayload::List {
                list: ListRole::List,
            },
            ElementType::ListItem => ElementPayload::List {
                list: ListRole::Item,
            },
            ElementType::Passthrough => ElementPayload::Passthrough {
                attributes: all_attributes(element),
            },
            _ => ElementPayload::Plain {},
        }
    }
}

fn non_empty_or(value: Option<&str>, fallback: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// A direct `div.container` child means the section already follows the idiom.
fn has_container_child(element: &ElementRef<'_>) -> bool {
    element.children().filter_map(ElementRef::wrap).any(|child| {
        child.value().name().eq_ignore_ascii_case("div")
            && child.value().classes().any(|class| class == "container")
    })
}

fn log_passthrough_tag_once(tag: &str) {
    static SEEN: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();
    debug!(tag, "unrecognized tag kept as passthrough element");
    if !diagnostics_enabled("html") {
        return;
    }
    let set = SEEN.get_or_init(|| Mutex::new(HashSet::new()));
    if let Ok(mut guard) = set.lock() {
        if guard.insert(tag.to_string()) {
            info!(tag = %tag, "diagnostics: unrecognized tag kept as passthrough");
        }
    }
}
