#![forbid(unsafe_code)]

//! Columnar Sankey layout for `riffle-core` graphs.
//!
//! Implements the core's [`Layout`] contract: nodes in left-to-right
//! columns, each column's nodes stacked into non-overlapping vertical bands
//! sized by flow value, link widths proportional to value. Column
//! assignment is longest-path from the sources, with sinks pushed to the
//! rightmost column (justify alignment). The iterative crossing-reduction
//! passes of the full d3-sankey algorithm are intentionally absent; the
//! reference normalizer overwrites vertical positions per frame anyway.

use riffle_core::error::{Error, Result};
use riffle_core::geom::Extent;
use riffle_core::graph::Graph;
use riffle_core::layout::{Layout, LayoutConfig};

#[derive(Debug, Clone, Default)]
pub struct ColumnLayout {
    config: LayoutConfig,
}

impl ColumnLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> LayoutConfig {
        self.config
    }
}

impl Layout for ColumnLayout {
    fn layout(&self, graph: &mut Graph, extent: Extent) -> Result<()> {
        if graph.is_empty() {
            return Ok(());
        }

        compute_node_values(graph);
        let depths = compute_node_depths(graph)?;
        place_columns(graph, &depths, extent, &self.config);
        Ok(())
    }
}

/// A node's value is the larger of its total inflow and total outflow.
fn compute_node_values(graph: &mut Graph) {
    for i in 0..graph.nodes.len() {
        let out: f64 = graph.nodes[i]
            .outgoing
            .iter()
            .map(|&li| graph.links[li].value)
            .sum();
        let inc: f64 = graph.nodes[i]
            .incoming
            .iter()
            .map(|&li| graph.links[li].value)
            .sum();
        graph.nodes[i].value = out.max(inc);
    }
}

/// Longest-path depth per node, by breadth-first waves along outgoing
/// links. More waves than nodes means a cycle.
fn compute_node_depths(graph: &Graph) -> Result<Vec<usize>> {
    let n = graph.nodes.len();
    let mut depths = vec![0usize; n];
    let mut current: Vec<usize> = (0..n).collect();
    let mut next: Vec<usize> = Vec::new();
    let mut next_seen = vec![false; n];
    let mut wave = 0usize;

    while !current.is_empty() {
        for &ni in &current {
            depths[ni] = wave;
            for &li in &graph.nodes[ni].outgoing {
                let target = graph.links[li].target;
                if !next_seen[target] {
                    next_seen[target] = true;
                    next.push(target);
                }
            }
        }
        wave += 1;
        if wave > n {
            return Err(Error::CircularFlow);
        }
        current = std::mem::take(&mut next);
        next_seen.fill(false);
    }

    Ok(depths)
}

fn place_columns(graph: &mut Graph, depths: &[usize], extent: Extent, config: &LayoutConfig) {
    let column_count = depths.iter().copied().max().unwrap_or(0) + 1;

    // Justify alignment: terminal nodes sit in the rightmost column.
    let mut columns: Vec<Vec<usize>> = vec![Vec::new(); column_count];
    for (i, node) in graph.nodes.iter().enumerate() {
        let layer = if node.outgoing.is_empty() {
            column_count - 1
        } else {
            depths[i]
        };
        columns[layer].push(i);
    }

    let kx = if column_count <= 1 {
        0.0
    } else {
        (extent.width - config.node_width) / (column_count as f64 - 1.0)
    };
    for (layer, column) in columns.iter().enumerate() {
        for &ni in column {
            graph.nodes[ni].x0 = extent.x + layer as f64 * kx;
            graph.nodes[ni].x1 = graph.nodes[ni].x0 + config.node_width;
        }
    }

    let max_len = columns.iter().map(|c| c.len()).max().unwrap_or(0);
    let py = if max_len <= 1 {
        config.node_padding
    } else {
        config
            .node_padding
            .min(extent.height / (max_len as f64 - 1.0))
    };

    // One vertical scale for the whole diagram, tight enough that every
    // column fits its values plus padding.
    let mut ky = f64::INFINITY;
    for column in &columns {
        let sum: f64 = column.iter().map(|&ni| graph.nodes[ni].value).sum();
        if sum <= 0.0 {
            continue;
        }
        let available = extent.height - (column.len() as f64 - 1.0) * py;
        ky = ky.min(available / sum);
    }
    if !ky.is_finite() {
        ky = 0.0;
    }

    for column in &columns {
        let mut y = extent.y;
        for &ni in column {
            graph.nodes[ni].y0 = y;
            graph.nodes[ni].y1 = y + graph.nodes[ni].value * ky;
            y = graph.nodes[ni].y1 + py;
        }
        if !column.is_empty() {
            let used = y - py - extent.y;
            let shift = (extent.height - used) / 2.0;
            for &ni in column {
                graph.nodes[ni].y0 += shift;
                graph.nodes[ni].y1 += shift;
            }
        }
    }

    for link in &mut graph.links {
        link.width = link.value * ky;
    }

    // Stack link endpoints down each node face in link order.
    for ni in 0..graph.nodes.len() {
        let mut y = graph.nodes[ni].y0;
        for &li in &graph.nodes[ni].outgoing {
            graph.links[li].y0 = y + graph.links[li].width / 2.0;
            y += graph.links[li].width;
        }
        let mut y = graph.nodes[ni].y0;
        for &li in &graph.nodes[ni].incoming {
            graph.links[li].y1 = y + graph.links[li].width / 2.0;
            y += graph.links[li].width;
        }
    }
}
