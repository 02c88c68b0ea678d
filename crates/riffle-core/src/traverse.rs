//! Layer-ordered traversal that reveals the flows connected to a node.
//!
//! Hovering or selecting a node lights up every link reachable from it,
//! hop by hop: the links one hop away are revealed first, and only once
//! that reveal completes do the next layers start — in parallel across
//! sibling branches, joined at the end. The reveal callback decides the
//! timing (instant or animated); the traversal is identical either way and
//! never depends on a particular executor.

use crate::error::Result;
use crate::graph::Graph;
use futures::future::{LocalBoxFuture, try_join, try_join_all};
use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Follow incoming links, toward the flow's origins.
    Upstream,
    /// Follow outgoing links, toward the flow's destinations.
    Downstream,
}

/// How a reveal callback should apply its visual state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealMode {
    /// Apply the final state synchronously and resolve immediately.
    Instant,
    /// Run a timed transition and resolve when it ends.
    Animated,
}

/// Reveals every link reachable from `start` in `direction`, layer by layer.
///
/// Each step collects the links incident to the frontier node in the
/// requested direction, awaits `reveal` on that layer, then recurses into
/// all newly reached nodes in parallel; the traversal completes when every
/// branch has. A node with no incident links in the direction ends its
/// branch. Diamond reconvergence re-reveals the shared node's links once per
/// arriving branch; duplicate reveals are expected and must be idempotent in
/// the callback. Errors from `reveal` propagate; structural dead ends never
/// error.
pub async fn traverse<'a, R, Fut>(
    graph: &'a Graph,
    start: usize,
    direction: Direction,
    reveal: &'a R,
) -> Result<()>
where
    R: Fn(Vec<usize>) -> Fut,
    Fut: Future<Output = Result<()>> + 'a,
{
    branch(graph, start, direction, reveal).await
}

/// Runs [`traverse`] upstream and downstream of `start`, joined.
pub async fn traverse_both<'a, R, Fut>(graph: &'a Graph, start: usize, reveal: &'a R) -> Result<()>
where
    R: Fn(Vec<usize>) -> Fut,
    Fut: Future<Output = Result<()>> + 'a,
{
    try_join(
        branch(graph, start, Direction::Upstream, reveal),
        branch(graph, start, Direction::Downstream, reveal),
    )
    .await?;
    Ok(())
}

fn branch<'a, R, Fut>(
    graph: &'a Graph,
    node: usize,
    direction: Direction,
    reveal: &'a R,
) -> LocalBoxFuture<'a, Result<()>>
where
    R: Fn(Vec<usize>) -> Fut,
    Fut: Future<Output = Result<()>> + 'a,
{
    Box::pin(async move {
        let layer = incident(graph, node, direction);
        if layer.is_empty() {
            return Ok(());
        }
        reveal(layer.clone()).await?;

        let next = layer.into_iter().map(|li| {
            let link = &graph.links[li];
            let reached = match direction {
                Direction::Upstream => link.source,
                Direction::Downstream => link.target,
            };
            branch(graph, reached, direction, reveal)
        });
        try_join_all(next).await?;
        Ok(())
    })
}

fn incident(graph: &Graph, node: usize, direction: Direction) -> Vec<usize> {
    match direction {
        Direction::Upstream => graph.nodes[node].incoming.clone(),
        Direction::Downstream => graph.nodes[node].outgoing.clone(),
    }
}

/// Resets the entire link set to hidden in one call.
///
/// Not a traversal: `hide` receives every link index at once, so the reset
/// is idempotent regardless of what any prior highlight revealed.
pub fn unhighlight<F>(graph: &Graph, hide: F)
where
    F: FnOnce(Vec<usize>),
{
    hide((0..graph.links.len()).collect());
}
