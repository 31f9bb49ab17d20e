use std::collections::BTreeMap;

use serde::Serialize;

pub type StyleId = String;

/// One reusable named declaration set, referenced by id from nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(rename = "_id")]
    pub id: StyleId,
    pub fake: bool,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub namespace: String,
    pub comb: String,
    /// Flat `property: value;` declaration string.
    pub style_less: String,
    /// Breakpoint name to declarations. Media queries are relocated to the
    /// embed instead, so this stays empty.
    pub variants: BTreeMap<String, StyleVariant>,
    pub children: Vec<StyleId>,
    pub selector: Option<String>,
}

impl Style {
    pub fn class(id: StyleId, name: impl Into<String>, style_less: impl Into<String>) -> Self {
        Self {
            id,
            fake: false,
            kind: "class".to_string(),
            name: name.into(),
            namespace: String::new(),
            comb: String::new(),
            style_less: style_less.into(),
            variants: BTreeMap::new(),
            children: Vec::new(),
            selector: None,
        }
    }

    /// Appends declarations, space-joined.
    pub fn append_declarations(&mut self, declarations: &str) {
        let declarations = declarations.trim();
        if declarations.is_empty() {
            return;
        }
        if !self.style_less.is_empty() {
            self.style_less.push(' ');
        }
        self.style_less.push_str(declarations);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleVariant {
    pub style_less: String,
}
