#![forbid(unsafe_code)]

//! Headless core of a Sankey flow diagram over a time series.
//!
//! Design goals:
//! - pure, deterministic data-to-graph pipeline (mapping → deduplicated
//!   nodes/links → layout → reference normalization)
//! - runtime-agnostic async APIs (no specific executor required)
//! - rendering stays external: this crate exposes the finalized graph,
//!   highlight queries, and the flow-reveal traversal, nothing DOM-shaped
//!
//! The geometric layout is a collaborator behind the [`Layout`] trait; the
//! `riffle-layout` crate ships a columnar implementation.

pub mod error;
pub mod geom;
pub mod gradient;
pub mod graph;
pub mod highlight;
pub mod host;
pub mod layout;
pub mod reference;
pub mod traverse;

pub use error::{Error, Result};
pub use geom::Extent;
pub use gradient::{GradientCache, GradientId};
pub use graph::{Frames, Graph, Link, Node, QuantityMapping, build_graph};
pub use highlight::HighlightState;
pub use host::{FrameProvider, Generation, Host, Phase};
pub use layout::{Layout, LayoutConfig};
pub use reference::{build_reference_mapping, graph_ratio, normalize};
pub use traverse::{Direction, RevealMode, traverse, traverse_both, unhighlight};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
