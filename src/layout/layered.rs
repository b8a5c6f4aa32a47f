//! Single-level layered layout of sized boxes.

use super::order::{build_layering, reduce_crossings};
use super::position::assign_coordinates;
use super::rank::{assign_ranks, make_acyclic};
use super::types::{NodeLayout, RankDir};
use std::collections::{BTreeMap, BTreeSet};

/// A node to place: id plus its drawn size.
#[derive(Debug, Clone)]
pub(super) struct Boxed {
    pub id: String,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy)]
pub(super) struct Spacing {
    pub rank_dir: RankDir,
    pub node_sep: f64,
    pub rank_sep: f64,
    pub margin: f64,
}

/// Positions keyed by id plus the bounds including margins.
#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct Placed {
    pub nodes: BTreeMap<String, NodeLayout>,
    pub width: f64,
    pub height: f64,
}

pub(super) fn layout_boxes(boxes: &[Boxed], edges: &[(String, String)], spacing: &Spacing) -> Placed {
    let mut sorted: Vec<&Boxed> = boxes.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));
    sorted.dedup_by(|a, b| a.id == b.id);
    if sorted.is_empty() {
        return Placed::default();
    }

    let index: BTreeMap<&str, usize> = sorted
        .iter()
        .enumerate()
        .map(|(i, b)| (b.id.as_str(), i))
        .collect();
    let unique: BTreeSet<(usize, usize)> = edges
        .iter()
        .filter_map(|(s, t)| Some((*index.get(s.as_str())?, *index.get(t.as_str())?)))
        .filter(|(s, t)| s != t)
        .collect();
    let unique: Vec<(usize, usize)> = unique.into_iter().collect();

    let n = sorted.len();
    let acyclic = make_acyclic(n, &unique);
    let ranks = assign_ranks(n, &acyclic);
    let mut layering = build_layering(&ranks, &acyclic);
    reduce_crossings(&mut layering);

    let vertical = matches!(spacing.rank_dir, RankDir::Tb | RankDir::Bt);
    // breadth runs along a layer, depth along the rank axis
    let extent = |b: &Boxed| {
        if vertical {
            (b.width, b.height)
        } else {
            (b.height, b.width)
        }
    };
    let mut breadth = vec![0.0; layering.node_count()];
    let mut depth = vec![0.0; n];
    for (i, b) in sorted.iter().enumerate() {
        let (br, d) = extent(*b);
        breadth[i] = br;
        depth[i] = d;
    }

    let center = assign_coordinates(&layering, &breadth, spacing.node_sep);
    let total_breadth = center
        .iter()
        .zip(&breadth)
        .map(|(c, b)| c + b / 2.0)
        .fold(0.0, f64::max);

    let mut rank_start = Vec::with_capacity(layering.layers.len());
    let mut offset = 0.0;
    for (r, layer) in layering.layers.iter().enumerate() {
        if r > 0 {
            offset += spacing.rank_sep;
        }
        rank_start.push(offset);
        let thickest = layer
            .iter()
            .filter(|&&node| !layering.is_virtual(node))
            .map(|&node| depth[node])
            .fold(0.0, f64::max);
        offset += thickest;
    }
    let total_depth = offset;

    let m = spacing.margin;
    let mut nodes = BTreeMap::new();
    for (i, b) in sorted.iter().enumerate() {
        let lx = center[i] - breadth[i] / 2.0;
        let ly = rank_start[ranks[i]];
        let d = depth[i];
        let (x, y) = match spacing.rank_dir {
            RankDir::Tb => (lx, ly),
            RankDir::Bt => (lx, total_depth - ly - d),
            RankDir::Lr => (ly, lx),
            RankDir::Rl => (total_depth - ly - d, lx),
        };
        nodes.insert(
            b.id.clone(),
            NodeLayout {
                x: x + m,
                y: y + m,
                width: b.width,
                height: b.height,
            },
        );
    }

    let (width, height) = if vertical {
        (total_breadth, total_depth)
    } else {
        (total_depth, total_breadth)
    };
    Placed {
        nodes,
        width: width + 2.0 * m,
        height: height + 2.0 * m,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(id: &str) -> Boxed {
        Boxed {
            id: id.to_string(),
            width: 100.0,
            height: 50.0,
        }
    }

    fn edge(s: &str, t: &str) -> (String, String) {
        (s.to_string(), t.to_string())
    }

    fn spacing(rank_dir: RankDir) -> Spacing {
        Spacing {
            rank_dir,
            node_sep: 20.0,
            rank_sep: 40.0,
            margin: 10.0,
        }
    }

    #[test]
    fn test_top_to_bottom_chain() {
        let placed = layout_boxes(
            &[boxed("a"), boxed("b")],
            &[edge("a", "b")],
            &spacing(RankDir::Tb),
        );
        let a = &placed.nodes["a"];
        let b = &placed.nodes["b"];
        assert_eq!((a.x, a.y), (10.0, 10.0));
        assert_eq!((b.x, b.y), (10.0, 100.0));
        assert_eq!((placed.width, placed.height), (120.0, 160.0));
    }

    #[test]
    fn test_left_to_right_chain() {
        let placed = layout_boxes(
            &[boxed("a"), boxed("b")],
            &[edge("a", "b")],
            &spacing(RankDir::Lr),
        );
        let a = &placed.nodes["a"];
        let b = &placed.nodes["b"];
        assert_eq!((a.x, a.y), (10.0, 10.0));
        assert_eq!((b.x, b.y), (150.0, 10.0));
        assert_eq!((a.width, a.height), (100.0, 50.0));
        assert_eq!((placed.width, placed.height), (260.0, 70.0));
    }

    #[test]
    fn test_reversed_directions_flip_rank_axis() {
        let placed = layout_boxes(
            &[boxed("a"), boxed("b")],
            &[edge("a", "b")],
            &spacing(RankDir::Bt),
        );
        assert!(placed.nodes["a"].y > placed.nodes["b"].y);

        let placed = layout_boxes(
            &[boxed("a"), boxed("b")],
            &[edge("a", "b")],
            &spacing(RankDir::Rl),
        );
        assert!(placed.nodes["a"].x > placed.nodes["b"].x);
    }

    #[test]
    fn test_nodes_in_a_rank_do_not_overlap() {
        let boxes = [boxed("root"), boxed("x"), boxed("y"), boxed("z")];
        let edges = [edge("root", "x"), edge("root", "y"), edge("root", "z")];
        let placed = layout_boxes(&boxes, &edges, &spacing(RankDir::Tb));
        let mut xs: Vec<f64> = ["x", "y", "z"].iter().map(|id| placed.nodes[*id].x).collect();
        xs.sort_by(f64::total_cmp);
        assert!(xs[1] - xs[0] >= 120.0 - 1e-9);
        assert!(xs[2] - xs[1] >= 120.0 - 1e-9);
    }

    #[test]
    fn test_self_loops_and_unknown_ids_ignored() {
        let placed = layout_boxes(
            &[boxed("a")],
            &[edge("a", "a"), edge("a", "ghost")],
            &spacing(RankDir::Tb),
        );
        assert_eq!(placed.nodes.len(), 1);
    }

    #[test]
    fn test_cycle_still_laid_out() {
        let boxes = [boxed("a"), boxed("b"), boxed("c")];
        let edges = [edge("a", "b"), edge("b", "c"), edge("c", "a")];
        let placed = layout_boxes(&boxes, &edges, &spacing(RankDir::Tb));
        assert_eq!(placed.nodes.len(), 3);
        assert_eq!(placed, layout_boxes(&boxes, &edges, &spacing(RankDir::Tb)));
    }

    #[test]
    fn test_empty_input() {
        let placed = layout_boxes(&[], &[], &spacing(RankDir::Lr));
        assert!(placed.nodes.is_empty());
        assert_eq!((placed.width, placed.height), (0.0, 0.0));
    }
}
