//! Virtual nodes for long edges and barycentric crossing reduction.

/// Nodes grouped by rank, in left-to-right order, plus the unit-length
/// segments that connect adjacent ranks. Indices past `real` are virtual.
#[derive(Debug, Clone)]
pub(super) struct Layering {
    pub layers: Vec<Vec<usize>>,
    pub preds: Vec<Vec<usize>>,
    pub succs: Vec<Vec<usize>>,
    pub real: usize,
}

impl Layering {
    pub fn node_count(&self) -> usize {
        self.preds.len()
    }

    pub fn is_virtual(&self, node: usize) -> bool {
        node >= self.real
    }

    /// Position of every node inside its layer.
    pub fn positions(&self) -> Vec<usize> {
        let mut pos = vec![0; self.node_count()];
        for layer in &self.layers {
            for (i, &node) in layer.iter().enumerate() {
                pos[node] = i;
            }
        }
        pos
    }
}

/// Split edges spanning several ranks into chains of virtual nodes.
pub(super) fn build_layering(ranks: &[usize], edges: &[(usize, usize)]) -> Layering {
    let real = ranks.len();
    let layer_count = ranks.iter().copied().max().map(|r| r + 1).unwrap_or(0);
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); layer_count];
    for (node, &rank) in ranks.iter().enumerate() {
        layers[rank].push(node);
    }

    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); real];
    let mut succs: Vec<Vec<usize>> = vec![Vec::new(); real];

    for &(source, target) in edges {
        if ranks[target] <= ranks[source] {
            continue;
        }
        let mut prev = source;
        for rank in ranks[source] + 1..ranks[target] {
            let dummy = preds.len();
            preds.push(Vec::new());
            succs.push(Vec::new());
            layers[rank].push(dummy);
            succs[prev].push(dummy);
            preds[dummy].push(prev);
            prev = dummy;
        }
        succs[prev].push(target);
        preds[target].push(prev);
    }

    Layering {
        layers,
        preds,
        succs,
        real,
    }
}

/// Crossings between segments of every pair of adjacent layers.
pub(super) fn count_crossings(layering: &Layering) -> usize {
    let pos = layering.positions();
    let mut total = 0;
    for layer in &layering.layers {
        let segments: Vec<(usize, usize)> = layer
            .iter()
            .flat_map(|&u| layering.succs[u].iter().map(move |&v| (u, v)))
            .map(|(u, v)| (pos[u], pos[v]))
            .collect();
        for (i, a) in segments.iter().enumerate() {
            for b in &segments[i + 1..] {
                if (a.0 < b.0 && a.1 > b.1) || (a.0 > b.0 && a.1 < b.1) {
                    total += 1;
                }
            }
        }
    }
    total
}

const SWEEPS: usize = 8;

/// Alternate downward and upward barycenter sweeps, keeping the ordering
/// with the fewest crossings seen.
pub(super) fn reduce_crossings(layering: &mut Layering) {
    let mut best = layering.layers.clone();
    let mut best_crossings = count_crossings(layering);

    for sweep in 0..SWEEPS {
        if best_crossings == 0 {
            break;
        }
        let layer_count = layering.layers.len();
        if sweep % 2 == 0 {
            for r in 1..layer_count {
                reorder_layer(layering, r, true);
            }
        } else {
            for r in (0..layer_count.saturating_sub(1)).rev() {
                reorder_layer(layering, r, false);
            }
        }

        let crossings = count_crossings(layering);
        if crossings < best_crossings {
            best_crossings = crossings;
            best = layering.layers.clone();
        }
    }

    layering.layers = best;
}

/// Sort layer `r` by the mean position of each node's neighbours in the
/// layer above (`downward`) or below. Nodes without such neighbours keep
/// their current position as key; ties keep their current order.
fn reorder_layer(layering: &mut Layering, r: usize, downward: bool) {
    let pos = layering.positions();
    let mut keyed: Vec<(f64, usize)> = layering.layers[r]
        .iter()
        .enumerate()
        .map(|(i, &node)| {
            let neighbours = if downward {
                &layering.preds[node]
            } else {
                &layering.succs[node]
            };
            let key = if neighbours.is_empty() {
                i as f64
            } else {
                neighbours.iter().map(|&n| pos[n] as f64).sum::<f64>() / neighbours.len() as f64
            };
            (key, node)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    layering.layers[r] = keyed.into_iter().map(|(_, node)| node).collect();
}
