//! Clipboard-import document model (`@webflow/XscpData`).

pub mod node;
pub mod style;

use serde::Serialize;
use serde_json::Value;

pub use node::{
    Attribute, ElementData, ElementNode, ElementPayload, ElementType, EmbedNode, GridMarker,
    ImageAsset, ImageAttributes, LinkData, LinkMode, ListRole, Node, NodeId, TextNode,
};
pub use style::{Style, StyleId, StyleVariant};

/// Type discriminator identifying the clipboard schema.
pub const XSCP_TYPE: &str = "@webflow/XscpData";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XscpDocument {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: XscpPayload,
    pub meta: XscpMeta,
}

impl XscpDocument {
    pub fn new(nodes: Vec<Node>, styles: Vec<Style>) -> Self {
        Self {
            kind: XSCP_TYPE.to_string(),
            payload: XscpPayload {
                nodes,
                styles,
                assets: Vec::new(),
                ix1: Vec::new(),
                ix2: Interactions::default(),
                variables: Vec::new(),
            },
            meta: XscpMeta::default(),
        }
    }

    /// The single root, always first in the node list.
    pub fn root(&self) -> Option<&Node> {
        self.payload.nodes.first()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.payload.nodes.iter().find(|node| node.id() == id)
    }

    pub fn style(&self, id: &str) -> Option<&Style> {
        self.payload.styles.iter().find(|style| style.id == id)
    }

    pub fn style_by_name(&self, name: &str) -> Option<&Style> {
        self.payload.styles.iter().find(|style| style.name == name)
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XscpPayload {
    pub nodes: Vec<Node>,
    pub styles: Vec<Style>,
    pub assets: Vec<Value>,
    pub ix1: Vec<Value>,
    pub ix2: Interactions,
    pub variables: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interactions {
    pub interactions: Vec<Value>,
    pub events: Vec<Value>,
    pub action_lists: Vec<Value>,
}

/// Removal counters. This engine only creates documents, so all stay zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XscpMeta {
    pub unlinked_symbol_count: u32,
    pub dropped_links: u32,
    pub dyn_bind_removed_count: u32,
    pub dyn_list_bind_removed_count: u32,
    pub pagination_removed_count: u32,
}
