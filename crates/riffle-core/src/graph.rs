//! Quantity mappings and the deduplicated node/link graph built from them.
//!
//! A [`QuantityMapping`] is the raw per-frame input: source category →
//! target category → quantity. Iteration order is semantic — it fixes each
//! node's index — so the mapping is an `IndexMap`, never a hash map.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Source category → target category → quantity, for one time step.
pub type QuantityMapping = IndexMap<String, IndexMap<String, f64>>;

/// All frames of a time series, keyed by time key.
pub type Frames = IndexMap<String, QuantityMapping>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Node {
    pub index: usize,
    pub name: String,
    /// Sum of incident flow; filled in by the layout collaborator.
    pub value: f64,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    /// Indices into `Graph::links` of links leaving this node.
    #[serde(default)]
    pub outgoing: Vec<usize>,
    /// Indices into `Graph::links` of links entering this node.
    #[serde(default)]
    pub incoming: Vec<usize>,
}

impl Node {
    pub fn center_y(&self) -> f64 {
        (self.y0 + self.y1) / 2.0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub source: usize,
    pub target: usize,
    pub value: f64,
    /// Rendered thickness; derived from `value` by layout, then overwritten
    /// by reference normalization.
    pub width: f64,
    /// Vertical center of the link endpoint at the source node.
    pub y0: f64,
    /// Vertical center of the link endpoint at the target node.
    pub y1: f64,
}

/// Deduplicated node/link graph for one frame.
///
/// Invariants: every link's `source`/`target` is a valid index into `nodes`;
/// node names are unique; a name appearing as both a source and a target in
/// the mapping occurs exactly once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl Graph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

fn find_or_create_node(
    nodes: &mut Vec<Node>,
    index_of: &mut FxHashMap<String, usize>,
    name: &str,
) -> usize {
    if let Some(&idx) = index_of.get(name) {
        return idx;
    }
    let idx = nodes.len();
    nodes.push(Node {
        index: idx,
        name: name.to_string(),
        ..Default::default()
    });
    index_of.insert(name.to_string(), idx);
    idx
}

/// Builds the frame graph from a raw quantity mapping.
///
/// Nodes are deduplicated preserving first-occurrence order (each source key,
/// then its target keys, in mapping order), which fixes the indices. Values
/// are copied verbatim — no sign or finiteness validation happens here. A
/// target name that never appears as a source key is a sink, not an error.
pub fn build_graph(mapping: &QuantityMapping) -> Graph {
    let mut nodes: Vec<Node> = Vec::new();
    let mut index_of: FxHashMap<String, usize> = FxHashMap::default();

    for (source, targets) in mapping {
        find_or_create_node(&mut nodes, &mut index_of, source);
        for target in targets.keys() {
            find_or_create_node(&mut nodes, &mut index_of, target);
        }
    }

    let mut links: Vec<Link> = Vec::new();
    for (source, targets) in mapping {
        let source_idx = index_of[source.as_str()];
        for (target, &value) in targets {
            let target_idx = index_of[target.as_str()];
            let link_idx = links.len();
            links.push(Link {
                source: source_idx,
                target: target_idx,
                value,
                width: 0.0,
                y0: 0.0,
                y1: 0.0,
            });
            nodes[source_idx].outgoing.push(link_idx);
            nodes[target_idx].incoming.push(link_idx);
        }
    }

    Graph { nodes, links }
}
