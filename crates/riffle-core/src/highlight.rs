//! Selected/hovered node bookkeeping and the visual flags derived from it.
//!
//! This is the only state that survives redraws: graphs are rebuilt per
//! frame, highlight membership is not. Nodes are identified by index into
//! the current frame graph.

use crate::traverse::RevealMode;
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Default)]
pub struct HighlightState {
    selected: FxHashSet<usize>,
    hovered: FxHashSet<usize>,
}

impl HighlightState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, node: usize) {
        self.selected.insert(node);
    }

    pub fn deselect(&mut self, node: usize) {
        self.selected.remove(&node);
    }

    pub fn hover(&mut self, node: usize) {
        self.hovered.insert(node);
    }

    pub fn unhover(&mut self, node: usize) {
        self.hovered.remove(&node);
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.hovered.clear();
    }

    pub fn is_selected(&self, node: usize) -> bool {
        self.selected.contains(&node)
    }

    pub fn is_hovered(&self, node: usize) -> bool {
        self.hovered.contains(&node)
    }

    /// Hovered or selected.
    pub fn is_highlighted(&self, node: usize) -> bool {
        self.is_hovered(node) || self.is_selected(node)
    }

    pub fn any_selected(&self) -> bool {
        !self.selected.is_empty()
    }

    /// A non-empty selection dims every node outside it.
    pub fn is_dimmed(&self, node: usize) -> bool {
        self.any_selected() && !self.is_selected(node)
    }

    /// Hover animates; selection (or hover of an already-selected node)
    /// applies instantly.
    pub fn reveal_mode(&self, node: usize) -> RevealMode {
        if self.is_hovered(node) && !self.is_selected(node) {
            RevealMode::Animated
        } else {
            RevealMode::Instant
        }
    }

    /// Small nodes suppress their label unless the viewer has focused them.
    pub fn label_visible(&self, node: usize, node_height: f64, label_height: f64) -> bool {
        node_height >= label_height || self.is_highlighted(node)
    }
}
