//! Deduplicating cache for link gradient definitions.
//!
//! Each link is painted with a gradient from its source node's color to its
//! target node's color. Definitions are shared: the cache hands out one id
//! per ordered color pair, and the renderer emits a def only for pairs it
//! has not seen. Purely a caching layer — nothing here touches the graph.

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GradientId(pub usize);

#[derive(Debug, Clone, Default)]
pub struct GradientCache {
    ids: FxHashMap<(String, String), GradientId>,
    pairs: Vec<(String, String)>,
}

impl GradientCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for the ordered pair, inserting it if absent.
    ///
    /// Ids are dense and stable in intern order, so they double as indices
    /// for the emitted defs.
    pub fn intern(&mut self, source_color: &str, target_color: &str) -> GradientId {
        let key = (source_color.to_string(), target_color.to_string());
        if let Some(&id) = self.ids.get(&key) {
            return id;
        }
        let id = GradientId(self.pairs.len());
        self.pairs.push(key.clone());
        self.ids.insert(key, id);
        id
    }

    pub fn get(&self, source_color: &str, target_color: &str) -> Option<GradientId> {
        self.ids
            .get(&(source_color.to_string(), target_color.to_string()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pairs in intern order, paired with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (&(String, String), GradientId)> {
        self.pairs
            .iter()
            .enumerate()
            .map(|(i, pair)| (pair, GradientId(i)))
    }
}
