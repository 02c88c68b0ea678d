//! Reference graph construction and per-frame height normalization.
//!
//! The layout collaborator rescales every frame to fill the extent on its
//! own, so a category's height would change whenever *other* categories'
//! totals change. The reference graph — built from the per-pair maximum
//! quantity across all frames — pins a single value-to-height ratio that
//! every frame is rescaled against, which removes that jitter.

use crate::error::{Error, Result};
use crate::graph::{Frames, Graph, QuantityMapping};
use indexmap::map::Entry;
use rustc_hash::FxHashMap;

/// Folds all frames into one mapping holding, for each (source, target)
/// pair, the maximum value observed across the series.
///
/// The first frame initializes a pair; ties keep the first value; strictly
/// greater values replace it. The result is fed through `build_graph` and
/// the layout collaborator exactly like an ordinary frame.
pub fn build_reference_mapping(frames: &Frames) -> QuantityMapping {
    let mut reference = QuantityMapping::new();
    for mapping in frames.values() {
        for (source, targets) in mapping {
            let merged = reference.entry(source.clone()).or_default();
            for (target, &value) in targets {
                match merged.entry(target.clone()) {
                    Entry::Occupied(mut seen) => {
                        if value > *seen.get() {
                            seen.insert(value);
                        }
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(value);
                    }
                }
            }
        }
    }
    reference
}

/// The fixed value-to-height ratio derived from a laid-out reference graph.
///
/// Computed once, eagerly, before any per-frame redraw. A reference with no
/// nodes, or whose first node has zero height or value, would yield a
/// non-finite or useless ratio; that fails here rather than leaking NaN
/// extents into every frame.
pub fn graph_ratio(reference: &Graph) -> Result<f64> {
    let first = reference.nodes.first().ok_or(Error::DegenerateReference)?;
    let ratio = first.value / first.height();
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(Error::DegenerateReference);
    }
    Ok(ratio)
}

/// Rescales a laid-out frame graph against the reference, in place.
///
/// Each node keeps the vertical center of its reference counterpart (matched
/// by name) and takes a height of `value / ratio`; each link's width becomes
/// `value / ratio`. An empty frame is a no-op. A frame category absent from
/// the reference violates the build-reference-first invariant and is a
/// [`Error::MissingCategory`].
pub fn normalize(frame: &mut Graph, reference: &Graph, ratio: f64) -> Result<()> {
    if frame.is_empty() {
        return Ok(());
    }

    let centers: FxHashMap<&str, f64> = reference
        .nodes
        .iter()
        .map(|n| (n.name.as_str(), n.center_y()))
        .collect();

    for node in &mut frame.nodes {
        let center = centers
            .get(node.name.as_str())
            .copied()
            .ok_or_else(|| Error::MissingCategory {
                name: node.name.clone(),
            })?;
        let half = node.value / ratio / 2.0;
        node.y0 = center - half;
        node.y1 = center + half;
    }

    for link in &mut frame.links {
        link.width = link.value / ratio;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use indexmap::indexmap;

    fn frames() -> Frames {
        indexmap! {
            "t1".to_string() => indexmap! {
                "A".to_string() => indexmap! { "B".to_string() => 10.0 },
            },
            "t2".to_string() => indexmap! {
                "A".to_string() => indexmap! { "B".to_string() => 30.0 },
            },
        }
    }

    // Stands in for the layout collaborator: one column per node, heights
    // proportional to value with a unit ratio.
    fn lay_out(graph: &mut Graph, ratio: f64) {
        for node in &mut graph.nodes {
            let out: f64 = node.outgoing.iter().map(|&li| graph.links[li].value).sum();
            let inc: f64 = node.incoming.iter().map(|&li| graph.links[li].value).sum();
            node.value = out.max(inc);
        }
        let mut y = 0.0;
        for node in &mut graph.nodes {
            node.y0 = y;
            node.y1 = y + node.value / ratio;
            y = node.y1 + 10.0;
        }
    }

    #[test]
    fn reference_keeps_per_pair_maximum() {
        let reference = build_reference_mapping(&frames());
        assert_eq!(reference["A"]["B"], 30.0);
    }

    #[test]
    fn reference_tie_keeps_first_value() {
        let frames: Frames = indexmap! {
            "t1".to_string() => indexmap! {
                "A".to_string() => indexmap! { "B".to_string() => 10.0 },
            },
            "t2".to_string() => indexmap! {
                "A".to_string() => indexmap! { "B".to_string() => 10.0 },
            },
        };
        let reference = build_reference_mapping(&frames);
        assert_eq!(reference["A"]["B"], 10.0);
    }

    #[test]
    fn reference_unions_pairs_across_frames() {
        let frames: Frames = indexmap! {
            "t1".to_string() => indexmap! {
                "A".to_string() => indexmap! { "B".to_string() => 1.0 },
            },
            "t2".to_string() => indexmap! {
                "B".to_string() => indexmap! { "C".to_string() => 2.0 },
            },
        };
        let reference = build_reference_mapping(&frames);
        assert_eq!(reference["A"]["B"], 1.0);
        assert_eq!(reference["B"]["C"], 2.0);
    }

    #[test]
    fn normalize_scales_heights_by_value_over_ratio() {
        let all = frames();
        let mut reference = build_graph(&build_reference_mapping(&all));
        lay_out(&mut reference, 1.0);
        let ratio = graph_ratio(&reference).unwrap();

        let mut t1 = build_graph(&all["t1"]);
        lay_out(&mut t1, 1.0);
        normalize(&mut t1, &reference, ratio).unwrap();

        let mut t2 = build_graph(&all["t2"]);
        lay_out(&mut t2, 1.0);
        normalize(&mut t2, &reference, ratio).unwrap();

        let h1 = t1.node_by_name("A").unwrap().height();
        let h2 = t2.node_by_name("A").unwrap().height();
        assert!((h1 / h2 - 10.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn normalize_is_stable_for_unchanged_values() {
        // B→D carries 10 in both frames; only A's flows differ.
        let all: Frames = indexmap! {
            "t1".to_string() => indexmap! {
                "A".to_string() => indexmap! { "B".to_string() => 10.0 },
                "B".to_string() => indexmap! { "D".to_string() => 10.0 },
            },
            "t2".to_string() => indexmap! {
                "A".to_string() => indexmap! { "B".to_string() => 40.0 },
                "B".to_string() => indexmap! { "D".to_string() => 10.0 },
            },
        };
        let mut reference = build_graph(&build_reference_mapping(&all));
        lay_out(&mut reference, 1.0);
        let ratio = graph_ratio(&reference).unwrap();

        let heights: Vec<f64> = ["t1", "t2"]
            .iter()
            .map(|key| {
                let mut frame = build_graph(&all[*key]);
                lay_out(&mut frame, 1.0);
                normalize(&mut frame, &reference, ratio).unwrap();
                frame.node_by_name("D").unwrap().height()
            })
            .collect();
        assert!((heights[0] - heights[1]).abs() < 1e-9);
    }

    #[test]
    fn normalize_keeps_reference_centers() {
        let all = frames();
        let mut reference = build_graph(&build_reference_mapping(&all));
        lay_out(&mut reference, 1.0);
        let ratio = graph_ratio(&reference).unwrap();

        let mut frame = build_graph(&all["t1"]);
        lay_out(&mut frame, 1.0);
        normalize(&mut frame, &reference, ratio).unwrap();

        for node in &frame.nodes {
            let counterpart = reference.node_by_name(&node.name).unwrap();
            assert!((node.center_y() - counterpart.center_y()).abs() < 1e-9);
        }
    }

    #[test]
    fn normalize_rejects_category_missing_from_reference() {
        let all = frames();
        let mut reference = build_graph(&build_reference_mapping(&all));
        lay_out(&mut reference, 1.0);
        let ratio = graph_ratio(&reference).unwrap();

        let rogue: QuantityMapping = indexmap! {
            "X".to_string() => indexmap! { "B".to_string() => 1.0 },
        };
        let mut frame = build_graph(&rogue);
        lay_out(&mut frame, 1.0);
        let err = normalize(&mut frame, &reference, ratio).unwrap_err();
        assert!(matches!(err, Error::MissingCategory { name } if name == "X"));
    }

    #[test]
    fn normalize_empty_frame_is_a_noop() {
        let all = frames();
        let mut reference = build_graph(&build_reference_mapping(&all));
        lay_out(&mut reference, 1.0);
        let ratio = graph_ratio(&reference).unwrap();

        let mut empty = Graph::default();
        assert!(normalize(&mut empty, &reference, ratio).is_ok());
    }

    #[test]
    fn graph_ratio_rejects_empty_or_flat_reference() {
        assert!(matches!(
            graph_ratio(&Graph::default()),
            Err(Error::DegenerateReference)
        ));

        let mut flat = build_graph(&frames()["t1"]);
        // No layout ran: value and height are both zero.
        assert!(matches!(
            graph_ratio(&flat),
            Err(Error::DegenerateReference)
        ));
        flat.nodes[0].value = 5.0;
        assert!(matches!(
            graph_ratio(&flat),
            Err(Error::DegenerateReference)
        ));
    }

    #[test]
    fn normalize_sets_link_widths_from_ratio() {
        let all = frames();
        let mut reference = build_graph(&build_reference_mapping(&all));
        lay_out(&mut reference, 2.0);
        // value 30, height 15 → ratio 2.
        let ratio = graph_ratio(&reference).unwrap();
        assert!((ratio - 2.0).abs() < 1e-9);

        let mut frame = build_graph(&all["t1"]);
        lay_out(&mut frame, 2.0);
        normalize(&mut frame, &reference, ratio).unwrap();
        assert!((frame.links[0].width - 5.0).abs() < 1e-9);
    }
}
