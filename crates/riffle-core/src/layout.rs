//! The seam between the core and the geometric layout collaborator.
//!
//! The core never positions anything itself; it hands a freshly built graph
//! and an [`Extent`] to a [`Layout`] implementation and relies on its
//! contract. Behavior on cyclic graphs is the implementation's to define
//! (typically an error); the core neither detects nor repairs cycles.

use crate::error::Result;
use crate::geom::Extent;
use crate::graph::Graph;
use serde::{Deserialize, Serialize};

/// Node thickness and inter-node padding handed to the layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_width: f64,
    pub node_padding: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 10.0,
            node_padding: 10.0,
        }
    }
}

/// Assigns geometry to a graph within an extent.
///
/// Contract: on success every node carries `x0..x1` within the extent,
/// nodes sharing a column occupy non-overlapping vertical bands in
/// left-to-right columns, each node's `value` is the flow through it, and
/// every link's `width` is proportional to its value. An empty graph must
/// succeed as a no-op.
pub trait Layout {
    fn layout(&self, graph: &mut Graph, extent: Extent) -> Result<()>;
}
