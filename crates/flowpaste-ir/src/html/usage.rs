use std::collections::HashSet;

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node};

use super::tags::{TagDisposition, disposition};

/// Literal class tokens carried by elements that will become nodes.
///
/// Ignored tags still have their subtrees scanned; script, svg, style and
/// dropped metadata subtrees are skipped entirely.
pub fn collect_used_classes(document: &Html) -> HashSet<String> {
    let mut used = HashSet::new();
    visit(document.tree.root(), &mut used);
    used
}

fn visit(node: NodeRef<'_, Node>, used: &mut HashSet<String>) {
    for child in node.children() {
        let Some(element) = ElementRef::wrap(child) else {
            continue;
        };
        let tag = element.value().name().to_ascii_lowercase();
        match disposition(&tag) {
            TagDisposition::Element => {
                used.extend(element.value().classes().map(str::to_string));
            }
            TagDisposition::Ignored => {}
            TagDisposition::Opaque { .. } | TagDisposition::Style | TagDisposition::Dropped => {
                continue;
            }
        }
        visit(child, used);
    }
}
