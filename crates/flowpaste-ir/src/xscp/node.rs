use serde::Serialize;

use super::StyleId;

pub type NodeId = String;

/// One addressable item in the output graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Element(ElementNode),
    Text(TextNode),
    Embed(EmbedNode),
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::Element(element) => &element.id,
            Node::Text(text) => &text.id,
            Node::Embed(embed) => &embed.id,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match self {
            Node::Element(element) => &element.children,
            Node::Embed(embed) => &embed.children,
            Node::Text(_) => &[],
        }
    }

    pub fn classes(&self) -> &[StyleId] {
        match self {
            Node::Element(element) => &element.classes,
            Node::Embed(embed) => &embed.classes,
            Node::Text(_) => &[],
        }
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_embed(&self) -> Option<&EmbedNode> {
        match self {
            Node::Embed(embed) => Some(embed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementNode {
    #[serde(rename = "_id")]
    pub id: NodeId,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub tag: String,
    pub classes: Vec<StyleId>,
    pub children: Vec<NodeId>,
    pub data: ElementData,
}

impl ElementNode {
    /// Generic container with no classes, used for synthesized wrappers.
    pub fn container(id: NodeId, children: Vec<NodeId>) -> Self {
        Self {
            id,
            element_type: ElementType::Block,
            tag: "div".to_string(),
            classes: Vec::new(),
            children,
            data: ElementData {
                tag: "div".to_string(),
                xattr: Vec::new(),
                payload: ElementPayload::Plain {},
            },
        }
    }
}

/// Target element types understood by the destination tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ElementType {
    Block,
    Section,
    Heading,
    Paragraph,
    Link,
    Image,
    List,
    ListItem,
    Emphasized,
    Strong,
    Blockquote,
    Figure,
    Figcaption,
    /// Unrecognized tag kept with its original name and attributes.
    #[serde(rename = "DOM")]
    Passthrough,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementData {
    pub tag: String,
    /// Custom (`data-*`, `aria-*` and non-standard) attributes.
    pub xattr: Vec<Attribute>,
    #[serde(flatten)]
    pub payload: ElementPayload,
}

/// Type-specific data, one variant per element family.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ElementPayload {
    Plain {},
    Section { grid: GridMarker },
    Link { link: LinkData },
    Image { img: ImageAsset, attr: ImageAttributes },
    List { list: ListRole },
    Passthrough { attributes: Vec<Attribute> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GridMarker {
    Section,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListRole {
    List,
    Item,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkData {
    pub mode: LinkMode,
    pub url: String,
    pub target: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    External,
    Section,
    Email,
    Phone,
}

impl LinkMode {
    pub fn from_href(href: &str) -> Self {
        let href = href.trim();
        let lower = href.to_ascii_lowercase();
        if href.starts_with('#') {
            LinkMode::Section
        } else if lower.starts_with("mailto:") {
            LinkMode::Email
        } else if lower.starts_with("tel:") {
            LinkMode::Phone
        } else {
            LinkMode::External
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAsset {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAttributes {
    pub src: String,
    pub alt: String,
    pub loading: String,
    pub width: String,
    pub height: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextNode {
    #[serde(rename = "_id")]
    pub id: NodeId,
    pub text: bool,
    pub v: String,
}

impl TextNode {
    pub fn new(id: NodeId, content: impl Into<String>) -> Self {
        Self {
            id,
            text: true,
            v: content.into(),
        }
    }
}

/// Verbatim markup blob (scripts, inline SVG, relocated CSS).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedNode {
    #[serde(rename = "_id")]
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: EmbedKind,
    pub tag: String,
    pub classes: Vec<StyleId>,
    pub children: Vec<NodeId>,
    pub v: String,
    pub data: EmbedData,
}

impl EmbedNode {
    pub fn new(id: NodeId, html: impl Into<String>, script: bool) -> Self {
        let html = html.into();
        Self {
            id,
            kind: EmbedKind::HtmlEmbed,
            tag: "div".to_string(),
            classes: Vec::new(),
            children: Vec::new(),
            v: html.clone(),
            data: EmbedData {
                embed: EmbedPayload {
                    kind: "html".to_string(),
                    meta: EmbedMeta {
                        html,
                        div: false,
                        iframe: false,
                        script,
                        compilable: false,
                    },
                },
                inside_rte: false,
            },
        }
    }

    pub fn is_script(&self) -> bool {
        self.data.embed.meta.script
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EmbedKind {
    HtmlEmbed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedData {
    pub embed: EmbedPayload,
    #[serde(rename = "insideRTE")]
    pub inside_rte: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub meta: EmbedMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedMeta {
    pub html: String,
    pub div: bool,
    pub iframe: bool,
    pub script: bool,
    pub compilable: bool,
}
