//! Per-call conversion state. Nothing here outlives one `convert` call.

use std::collections::{BTreeMap, HashSet};

use nanoid::nanoid;
use tracing::{debug, info};

use super::{
    ConvertOptions,
    matcher::{CompiledSelector, compile_complex_selectors},
    merge::StyleRegistry,
};
use crate::{
    css::{AdvancedCss, NormalizedSheet, scanner::parse_declarations},
    diagnostics::diagnostics_enabled,
    xscp::{EmbedNode, Node, NodeId},
};

const ADVANCED_LABEL: &str = "/* Advanced CSS */";
const UNUSED_LABEL: &str = "/* Unused classes */";
const UNSUPPORTED_LABEL: &str = "/* Unsupported selectors */";

/// Issues identifiers that are unique within a run.
#[derive(Debug, Default)]
pub struct IdGenerator {
    issued: HashSet<String>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> String {
        loop {
            let id = nanoid!();
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }
}

/// CSS that has no per-element style form and ships inside the embed node.
#[derive(Debug, Default)]
pub struct RelocatedCss {
    pub advanced: AdvancedCss,
    pub unused_classes: Vec<String>,
    pub unsupported_selectors: Vec<String>,
}

impl RelocatedCss {
    pub fn is_empty(&self) -> bool {
        self.advanced.is_empty()
            && self.unused_classes.is_empty()
            && self.unsupported_selectors.is_empty()
    }

    /// Labelled `<style>` block, or `None` when nothing was relocated.
    pub fn to_style_block(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut sections = Vec::new();
        if !self.advanced.is_empty() {
            sections.push(format!("{ADVANCED_LABEL}\n{}", self.advanced.text()));
        }
        if !self.unused_classes.is_empty() {
            sections.push(format!("{UNUSED_LABEL}\n{}", self.unused_classes.join("\n")));
        }
        if !self.unsupported_selectors.is_empty() {
            sections.push(format!(
                "{UNSUPPORTED_LABEL}\n{}",
                self.unsupported_selectors.join("\n")
            ));
        }
        Some(format!("<style>\n{}\n</style>", sections.join("\n")))
    }
}

pub(crate) struct ConversionSession<'a> {
    pub(crate) options: &'a ConvertOptions,
    pub(crate) ids: IdGenerator,
    pub(crate) nodes: Vec<Node>,
    pub(crate) registry: StyleRegistry,
    pub(crate) selectors: Vec<CompiledSelector>,
    pub(crate) used_classes: HashSet<String>,
    pub(crate) relocated: RelocatedCss,
    /// Custom properties declared on `:root`.
    pub(crate) custom_properties: BTreeMap<String, String>,
}

impl<'a> ConversionSession<'a> {
    pub(crate) fn new(
        options: &'a ConvertOptions,
        sheet: &NormalizedSheet,
        advanced: AdvancedCss,
        used_classes: HashSet<String>,
    ) -> Self {
        let mut session = Self {
            options,
            ids: IdGenerator::new(),
            nodes: Vec::new(),
            registry: StyleRegistry::default(),
            selectors: compile_complex_selectors(sheet),
            used_classes,
            relocated: RelocatedCss {
                advanced,
                ..RelocatedCss::default()
            },
            custom_properties: BTreeMap::new(),
        };
        session.materialize_classes(sheet);
        session.collect_custom_properties(sheet);
        if options.relocate_unsupported_selectors {
            session.relocated.unsupported_selectors = session
                .selectors
                .iter()
                .filter(|selector| !selector.is_supported())
                .map(|selector| selector.rule.to_css())
                .collect();
        }
        session
    }

    /// Creates styles for used simple classes; unused ones are relocated.
    fn materialize_classes(&mut self, sheet: &NormalizedSheet) {
        for rule in sheet.rules() {
            let Some(class) = rule.simple_class() else {
                continue;
            };
            if self.used_classes.contains(class) {
                self.registry
                    .add_class(&mut self.ids, class, &rule.declarations);
            } else if self.options.relocate_unused_classes {
                debug!(class, "relocating unused class");
                self.relocated.unused_classes.push(rule.to_css());
            }
        }
    }

    fn collect_custom_properties(&mut self, sheet: &NormalizedSheet) {
        let Some(root) = sheet.get(":root") else {
            return;
        };
        for decl in parse_declarations(&root.source_body) {
            if decl.property.starts_with("--") {
                self.custom_properties.insert(decl.property, decl.value);
            }
        }
    }

    pub(crate) fn push_node(&mut self, node: Node) -> NodeId {
        let id = node.id().to_string();
        self.nodes.push(node);
        id
    }

    /// Builds the relocated-CSS embed node, if anything was relocated.
    pub(crate) fn relocated_embed(&mut self) -> Option<EmbedNode> {
        let html = self.relocated.to_style_block()?;
        Some(EmbedNode::new(self.ids.next_id(), html, false))
    }

    /// Names of custom properties referenced by styles but never declared on `:root`.
    pub(crate) fn undeclared_custom_properties(&self) -> Vec<String> {
        let mut missing: Vec<String> = Vec::new();
        for style in self.registry.styles() {
            for (idx, _) in style.style_less.match_indices("var(--") {
                let name: String = style.style_less[idx + 4..]
                    .chars()
                    .take_while(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
                    .collect();
                if !self.custom_properties.contains_key(&name) && !missing.contains(&name) {
                    missing.push(name);
                }
            }
        }
        missing
    }

    pub(crate) fn log_summary(&self) {
        info!(
            nodes = self.nodes.len(),
            styles = self.registry.styles().len(),
            unused_classes = self.relocated.unused_classes.len(),
            unsupported_selectors = self.relocated.unsupported_selectors.len(),
            advanced_blocks = self.relocated.advanced.len(),
            custom_properties = self.custom_properties.len(),
            "conversion finished"
        );
        if diagnostics_enabled("css") {
            for name in self.undeclared_custom_properties() {
                info!(property = %name, "diagnostics: custom property not declared on :root");
            }
        }
    }
}
