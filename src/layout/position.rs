//! In-layer coordinate assignment.

use super::order::Layering;

const ITERATIONS: usize = 4;

/// Centre of every node along the in-layer axis, smallest left edge at 0.
///
/// Layers start packed at `node_sep` (half that next to virtual nodes) and
/// centred on a shared axis. Each iteration then moves nodes toward the mean
/// centre of their neighbours while keeping order and spacing.
pub(super) fn assign_coordinates(layering: &Layering, breadth: &[f64], node_sep: f64) -> Vec<f64> {
    let gap = |a: usize, b: usize| {
        let sep = if layering.is_virtual(a) || layering.is_virtual(b) {
            node_sep / 2.0
        } else {
            node_sep
        };
        (breadth[a] + breadth[b]) / 2.0 + sep
    };

    let mut center = vec![0.0f64; layering.node_count()];
    for layer in &layering.layers {
        let mut x = 0.0;
        for (i, &node) in layer.iter().enumerate() {
            if i > 0 {
                x += gap(layer[i - 1], node);
            }
            center[node] = x;
        }
        let shift = x / 2.0;
        for &node in layer {
            center[node] -= shift;
        }
    }

    for _ in 0..ITERATIONS {
        for layer in &layering.layers {
            let desired: Vec<f64> = layer
                .iter()
                .map(|&node| {
                    let neighbours = layering.preds[node].iter().chain(&layering.succs[node]);
                    let (sum, count) =
                        neighbours.fold((0.0, 0usize), |(s, c), &n| (s + center[n], c + 1));
                    if count == 0 {
                        center[node]
                    } else {
                        sum / count as f64
                    }
                })
                .collect();

            let placed = place_in_order(layer, &desired, &gap);
            for (&node, x) in layer.iter().zip(placed) {
                center[node] = x;
            }
        }
    }

    let left = (0..layering.node_count())
        .map(|n| center[n] - breadth[n] / 2.0)
        .fold(f64::INFINITY, f64::min);
    if left.is_finite() {
        for c in &mut center {
            *c -= left;
        }
    }
    center
}

/// Closest positions to `desired` that keep layer order and minimum gaps:
/// the mean of a left-to-right push and a right-to-left push, each of
/// which already satisfies the gaps.
fn place_in_order(layer: &[usize], desired: &[f64], gap: &impl Fn(usize, usize) -> f64) -> Vec<f64> {
    let n = layer.len();
    let mut forward = desired.to_vec();
    for i in 1..n {
        forward[i] = forward[i].max(forward[i - 1] + gap(layer[i - 1], layer[i]));
    }
    let mut backward = desired.to_vec();
    for i in (0..n.saturating_sub(1)).rev() {
        backward[i] = backward[i].min(backward[i + 1] - gap(layer[i], layer[i + 1]));
    }
    forward
        .iter()
        .zip(&backward)
        .map(|(f, b)| (f + b) / 2.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::order::build_layering;
    use super::*;

    #[test]
    fn test_spacing_respected() {
        let layering = build_layering(&[0, 0, 0], &[]);
        let breadth = [100.0, 50.0, 100.0];
        let c = assign_coordinates(&layering, &breadth, 20.0);
        assert_eq!(c, vec![50.0, 145.0, 240.0]);
    }

    #[test]
    fn test_child_centred_under_parents() {
        // Two parents feed one child; the child lands between them.
        let layering = build_layering(&[0, 0, 1], &[(0, 2), (1, 2)]);
        let breadth = [100.0, 100.0, 100.0];
        let c = assign_coordinates(&layering, &breadth, 20.0);
        assert!((c[2] - (c[0] + c[1]) / 2.0).abs() < 1e-9);
        assert!(c[1] - c[0] >= 120.0 - 1e-9);
    }

    #[test]
    fn test_leftmost_edge_is_zero() {
        let layering = build_layering(&[0, 1, 1, 1], &[(0, 1), (0, 2), (0, 3)]);
        let breadth = [80.0, 80.0, 80.0, 80.0];
        let c = assign_coordinates(&layering, &breadth, 10.0);
        let left = (0..4).map(|n| c[n] - 40.0).fold(f64::INFINITY, f64::min);
        assert!(left.abs() < 1e-9);
    }
}
