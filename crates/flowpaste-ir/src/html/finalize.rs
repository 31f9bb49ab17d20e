//! Root selection and depth-first ordering of the flat node list.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use super::session::ConversionSession;
use crate::{
    error::{ConvertError, Result},
    xscp::{ElementNode, EmbedNode, Node, NodeId},
};

impl ConversionSession<'_> {
    /// Picks the single root, then orders `nodes` pre-order from it.
    ///
    /// The relocated-CSS embed, when present, becomes the last top-level node.
    pub(crate) fn finalize(&mut self, mut top_level: Vec<NodeId>, embed: Option<EmbedNode>) -> Result<()> {
        if let Some(embed) = embed {
            top_level.push(self.push_node(Node::Embed(embed)));
        }

        let root_id = match top_level.len() {
            1 => top_level.remove(0),
            _ => {
                let wrapper = ElementNode::container(self.ids.next_id(), top_level);
                self.push_node(Node::Element(wrapper))
            }
        };

        self.nodes = order_from_root(std::mem::take(&mut self.nodes), &root_id)?;
        Ok(())
    }
}

/// Reorders `nodes` so `root_id` comes first and every parent precedes its
/// children. Nodes not reachable from the root keep creation order at the end.
pub(crate) fn order_from_root(nodes: Vec<Node>, root_id: &str) -> Result<Vec<Node>> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(nodes.len());
    for (position, node) in nodes.iter().enumerate() {
        if index.insert(node.id().to_string(), position).is_some() {
            return Err(ConvertError::DuplicateId(node.id().to_string()));
        }
    }

    let mut slots: Vec<Option<Node>> = nodes.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(slots.len());
    let mut visited: HashSet<String> = HashSet::new();
    let mut stack: Vec<(Option<String>, String)> = vec![(None, root_id.to_string())];

    while let Some((parent, id)) = stack.pop() {
        if !visited.insert(id.clone()) {
            continue;
        }
        let Some(&position) = index.get(&id) else {
            return Err(ConvertError::DanglingChild {
                parent: parent.unwrap_or_default(),
                child: id,
            });
        };
        let Some(node) = slots[position].take() else {
            continue;
        };
        for child in node.children().iter().rev() {
            stack.push((Some(id.clone()), child.clone()));
        }
        ordered.push(node);
    }

    let unreached: Vec<Node> = slots.into_iter().flatten().collect();
    if !unreached.is_empty() {
        warn!(count = unreached.len(), "nodes not reachable from root kept at end");
        ordered.extend(unreached);
    }
    Ok(ordered)
}
