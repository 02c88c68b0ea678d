//! Rendering-host lifecycle around the per-frame pipeline.
//!
//! The host is the composition root the (external) renderer talks to. It
//! owns the frame provider, the layout collaborator, the reference graph,
//! the current frame graph, and the highlight state, and it sequences the
//! redraw pipeline: fetch → build → layout → normalize, swapping the frame
//! in only on success so a failed rebuild leaves the previous frame intact.
//!
//! Lifecycle is an explicit state machine. `init` records configuration,
//! `ready` eagerly builds the reference graph from all frames (required
//! before any frame can be normalized), and only then do per-frame redraws
//! run.

use crate::error::{Error, Result};
use crate::geom::Extent;
use crate::graph::{Frames, Graph, QuantityMapping, build_graph};
use crate::highlight::HighlightState;
use crate::layout::Layout;
use crate::reference::{build_reference_mapping, graph_ratio, normalize};
use crate::traverse::{RevealMode, traverse_both};
use futures::future::LocalBoxFuture;
use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Initialized,
    Ready,
}

/// Asynchronous source of frame data; the sole ingestion path.
pub trait FrameProvider {
    /// Every frame of the series at once, for building the reference graph.
    fn all_frames(&self) -> LocalBoxFuture<'_, Result<Frames>>;

    /// The quantity mapping for one time step.
    fn frame(&self, time_key: &str) -> LocalBoxFuture<'_, Result<QuantityMapping>>;
}

/// Monotonic counter stamping the lifetime of the current frame graph.
///
/// Every successful redraw advances it. A traversal captures the value at
/// start and stops revealing once it no longer matches, so reveals belonging
/// to a superseded frame are discarded instead of applied to the new one.
#[derive(Debug, Clone, Default)]
pub struct Generation(Rc<Cell<u64>>);

impl Generation {
    pub fn current(&self) -> u64 {
        self.0.get()
    }

    pub fn advance(&self) {
        self.0.set(self.0.get() + 1);
    }
}

#[derive(Debug)]
struct Reference {
    graph: Graph,
    ratio: f64,
}

pub struct Host<P, L> {
    provider: P,
    layout: L,
    extent: Extent,
    phase: Phase,
    reference: Option<Reference>,
    frame: Option<Graph>,
    time_key: Option<String>,
    highlight: HighlightState,
    generation: Generation,
}

impl<P: FrameProvider, L: Layout> Host<P, L> {
    pub fn new(provider: P, layout: L, extent: Extent) -> Self {
        Self {
            provider,
            layout,
            extent,
            phase: Phase::Uninitialized,
            reference: None,
            frame: None,
            time_key: None,
            highlight: HighlightState::new(),
            generation: Generation::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// The finalized (post-normalization) graph of the current frame.
    pub fn graph(&self) -> Option<&Graph> {
        self.frame.as_ref()
    }

    pub fn reference_graph(&self) -> Option<&Graph> {
        self.reference.as_ref().map(|r| &r.graph)
    }

    pub fn time_key(&self) -> Option<&str> {
        self.time_key.as_deref()
    }

    pub fn highlight(&self) -> &HighlightState {
        &self.highlight
    }

    pub fn highlight_mut(&mut self) -> &mut HighlightState {
        &mut self.highlight
    }

    /// A handle onto the redraw generation counter.
    pub fn generation(&self) -> Generation {
        self.generation.clone()
    }

    fn expect_phase(&self, expected: Phase) -> Result<()> {
        if self.phase != expected {
            return Err(Error::Lifecycle {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    /// Uninitialized → Initialized.
    pub fn init(&mut self) -> Result<()> {
        self.expect_phase(Phase::Uninitialized)?;
        self.phase = Phase::Initialized;
        Ok(())
    }

    /// Initialized → Ready: fetches all frames and eagerly builds the
    /// reference graph, so every later frame can be normalized against it.
    pub async fn ready(&mut self) -> Result<()> {
        self.expect_phase(Phase::Initialized)?;
        let frames = self.provider.all_frames().await?;
        self.reference = self.build_reference(&frames)?;
        self.phase = Phase::Ready;
        tracing::debug!(
            frames = frames.len(),
            has_reference = self.reference.is_some(),
            "host ready"
        );
        Ok(())
    }

    fn build_reference(&self, frames: &Frames) -> Result<Option<Reference>> {
        self.build_reference_for(frames, self.extent)
    }

    fn build_reference_for(&self, frames: &Frames, extent: Extent) -> Result<Option<Reference>> {
        let mut graph = build_graph(&build_reference_mapping(frames));
        if graph.is_empty() {
            return Ok(None);
        }
        self.layout.layout(&mut graph, extent)?;
        let ratio = graph_ratio(&graph)?;
        Ok(Some(Reference { graph, ratio }))
    }

    /// Rebuilds the frame graph for a time step and swaps it in.
    ///
    /// The pipeline runs on locals; on any failure the previously rendered
    /// frame stays untouched. On success the generation advances, cutting
    /// off traversals still in flight against the old frame.
    pub async fn set_time(&mut self, time_key: &str) -> Result<()> {
        self.expect_phase(Phase::Ready)?;
        let mapping = self.provider.frame(time_key).await?;
        let graph = self.rebuild(&mapping)?;

        self.frame = Some(graph);
        self.time_key = Some(time_key.to_string());
        self.generation.advance();
        tracing::debug!(
            time_key,
            generation = self.generation.current(),
            "frame swapped"
        );
        Ok(())
    }

    fn rebuild(&self, mapping: &QuantityMapping) -> Result<Graph> {
        self.rebuild_against(mapping, self.reference.as_ref(), self.extent)
    }

    fn rebuild_against(
        &self,
        mapping: &QuantityMapping,
        reference: Option<&Reference>,
        extent: Extent,
    ) -> Result<Graph> {
        let mut graph = build_graph(mapping);
        if graph.is_empty() {
            return Ok(graph);
        }
        let reference = reference.ok_or(Error::DegenerateReference)?;
        self.layout.layout(&mut graph, extent)?;
        normalize(&mut graph, &reference.graph, reference.ratio)?;
        Ok(graph)
    }

    /// Re-runs layout for the new extent, reference first (the ratio depends
    /// on it), then the current frame. Everything is rebuilt into locals and
    /// committed together, so a failure changes nothing.
    pub async fn resize(&mut self, extent: Extent) -> Result<()> {
        if self.phase == Phase::Uninitialized {
            return Err(Error::Lifecycle {
                expected: Phase::Initialized,
                actual: self.phase,
            });
        }
        if self.phase != Phase::Ready {
            self.extent = extent;
            return Ok(());
        }

        let frames = self.provider.all_frames().await?;
        let reference = self.build_reference_for(&frames, extent)?;
        let frame = match &self.time_key {
            Some(key) => {
                let mapping = frames.get(key).cloned().ok_or_else(|| Error::Provider {
                    message: format!("no frame for time key {key}"),
                })?;
                Some(self.rebuild_against(&mapping, reference.as_ref(), extent)?)
            }
            None => None,
        };

        self.extent = extent;
        self.reference = reference;
        if let Some(graph) = frame {
            self.frame = Some(graph);
            self.generation.advance();
        }
        tracing::debug!(?extent, "relaid out after resize");
        Ok(())
    }

    /// Reveals every flow connected to `node`, upstream and downstream.
    ///
    /// The reveal mode comes from the highlight state (hover animates,
    /// selection is instant). Layers belonging to a generation that a newer
    /// frame has superseded are skipped rather than applied.
    pub async fn trace_flows<R, Fut>(&self, node: usize, reveal: R) -> Result<()>
    where
        R: Fn(Vec<usize>, RevealMode) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        self.expect_phase(Phase::Ready)?;
        let Some(graph) = self.frame.as_ref() else {
            return Ok(());
        };
        if node >= graph.nodes.len() {
            // Stale index from a previous frame's renderer state.
            return Ok(());
        }

        let mode = self.highlight.reveal_mode(node);
        let token = self.generation.current();
        let generation = self.generation.clone();
        let guarded = move |links: Vec<usize>| {
            let layer = if generation.current() == token {
                Some(reveal(links, mode))
            } else {
                tracing::debug!(token, "discarding stale reveal layer");
                None
            };
            async move {
                match layer {
                    Some(fut) => fut.await,
                    None => Ok(()),
                }
            }
        };
        traverse_both(graph, node, &guarded).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    struct NoFrames;

    impl FrameProvider for NoFrames {
        fn all_frames(&self) -> LocalBoxFuture<'_, Result<Frames>> {
            Box::pin(futures::future::ready(Ok(Frames::new())))
        }

        fn frame(&self, _time_key: &str) -> LocalBoxFuture<'_, Result<QuantityMapping>> {
            Box::pin(futures::future::ready(Ok(QuantityMapping::new())))
        }
    }

    struct NoopLayout;

    impl Layout for NoopLayout {
        fn layout(&self, _graph: &mut Graph, _extent: Extent) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn phases_advance_in_order() {
        let mut host = Host::new(NoFrames, NoopLayout, Extent::default());
        assert_eq!(host.phase(), Phase::Uninitialized);

        host.init().unwrap();
        assert_eq!(host.phase(), Phase::Initialized);

        block_on(host.ready()).unwrap();
        assert_eq!(host.phase(), Phase::Ready);
    }

    #[test]
    fn out_of_order_transitions_are_lifecycle_errors() {
        let mut host = Host::new(NoFrames, NoopLayout, Extent::default());
        assert!(matches!(
            block_on(host.ready()),
            Err(Error::Lifecycle { .. })
        ));
        assert!(matches!(
            block_on(host.set_time("t1")),
            Err(Error::Lifecycle { .. })
        ));

        host.init().unwrap();
        assert!(matches!(host.init(), Err(Error::Lifecycle { .. })));
    }

    #[test]
    fn empty_series_is_ready_with_no_reference() {
        let mut host = Host::new(NoFrames, NoopLayout, Extent::default());
        host.init().unwrap();
        block_on(host.ready()).unwrap();
        assert!(host.reference_graph().is_none());

        // An empty frame redraw is a no-op, not an error.
        block_on(host.set_time("t1")).unwrap();
        assert!(host.graph().unwrap().is_empty());
    }

    #[test]
    fn generation_advances_per_redraw() {
        let mut host = Host::new(NoFrames, NoopLayout, Extent::default());
        host.init().unwrap();
        block_on(host.ready()).unwrap();

        let generation = host.generation();
        let before = generation.current();
        block_on(host.set_time("t1")).unwrap();
        block_on(host.set_time("t2")).unwrap();
        assert_eq!(generation.current(), before + 2);
    }

    #[test]
    fn resize_requires_init() {
        let mut host = Host::new(NoFrames, NoopLayout, Extent::default());
        assert!(matches!(
            block_on(host.resize(Extent::new(0.0, 0.0, 100.0, 100.0))),
            Err(Error::Lifecycle { .. })
        ));
    }
}
