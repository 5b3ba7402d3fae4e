//! Pair selection and biased random walks

use crate::graph::LevelGraph;
use petgraph::graph::NodeIndex;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Share of each round's pairs drawn from each stratum; the rest are uniform
const BACKBONE_SHARE: f64 = 0.4;
const CORE_SHARE: f64 = 0.3;
const RIM_SHARE: f64 = 0.2;

pub(super) type Pair = (NodeIndex, NodeIndex);

/// Nodes grouped by eccentricity: whichever of the minimum, midpoint and
/// maximum eccentricity a node is closest to
#[derive(Debug, Clone)]
pub(super) struct Tiers {
    pub center: Vec<NodeIndex>,
    pub medium: Vec<NodeIndex>,
    pub periphery: Vec<NodeIndex>,
    all: Vec<NodeIndex>,
    pub diameter: usize,
}

impl Tiers {
    pub fn classify(graph: &LevelGraph) -> Self {
        let ecc = graph.eccentricities();
        let min = ecc.iter().copied().min().unwrap_or(0) as f64;
        let max = ecc.iter().copied().max().unwrap_or(0);
        let mid = (min + max as f64) / 2.0;

        let mut tiers = Tiers {
            center: Vec::new(),
            medium: Vec::new(),
            periphery: Vec::new(),
            all: graph.node_indices().collect(),
            diameter: max,
        };
        for idx in graph.node_indices() {
            let e = ecc[idx.index()] as f64;
            let (to_min, to_mid, to_max) = (e - min, (e - mid).abs(), max as f64 - e);
            if to_min <= to_mid && to_min <= to_max {
                tiers.center.push(idx);
            } else if to_max <= to_mid {
                tiers.periphery.push(idx);
            } else {
                tiers.medium.push(idx);
            }
        }
        tiers
    }

    /// Up to `target` distinct unordered pairs: stratified quotas first,
    /// then uniform pairs for the remainder and any stratum shortfall
    pub fn stratified_pairs<R: Rng + ?Sized>(&self, target: usize, rng: &mut R) -> Vec<Pair> {
        let n = self.all.len();
        let target = target.min(n * n.saturating_sub(1) / 2);
        let mut chosen: HashSet<Pair> = HashSet::new();
        let mut pairs = Vec::with_capacity(target);

        let quota = |share: f64| (share * target as f64).round() as usize;
        let strata = [
            (quota(BACKBONE_SHARE), cross(&self.center, &self.periphery)),
            (
                quota(CORE_SHARE),
                [within(&self.center), cross(&self.center, &self.medium)].concat(),
            ),
            (
                quota(RIM_SHARE),
                [within(&self.periphery), within(&self.medium)].concat(),
            ),
        ];

        for (wanted, mut candidates) in strata {
            candidates.shuffle(rng);
            let mut taken = 0;
            for pair in candidates {
                if taken >= wanted || pairs.len() >= target {
                    break;
                }
                if chosen.insert(normalize(pair)) {
                    pairs.push(pair);
                    taken += 1;
                }
            }
        }

        if pairs.len() < target {
            let mut rest = within(&self.all);
            rest.shuffle(rng);
            for pair in rest {
                if pairs.len() >= target {
                    break;
                }
                if chosen.insert(normalize(pair)) {
                    pairs.push(pair);
                }
            }
        }
        pairs
    }
}

fn normalize((a, b): Pair) -> Pair {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn cross(xs: &[NodeIndex], ys: &[NodeIndex]) -> Vec<Pair> {
    xs.iter()
        .flat_map(|&x| ys.iter().filter(move |&&y| y != x).map(move |&y| (x, y)))
        .collect()
}

fn within(xs: &[NodeIndex]) -> Vec<Pair> {
    let mut out = Vec::new();
    for (i, &a) in xs.iter().enumerate() {
        for &b in &xs[i + 1..] {
            out.push((a, b));
        }
    }
    out
}

/// Random walks that prefer unvisited neighbours
pub(super) struct PathSampler<'g> {
    graph: &'g LevelGraph,
    walks_per_pair: usize,
    max_length: usize,
    unvisited_bias: f64,
}

impl<'g> PathSampler<'g> {
    pub fn new(
        graph: &'g LevelGraph,
        walks_per_pair: usize,
        max_length: usize,
        unvisited_bias: f64,
    ) -> Self {
        Self {
            graph,
            walks_per_pair,
            max_length,
            unvisited_bias,
        }
    }

    /// Successful walks from `source` to `target`; failed walks are dropped
    pub fn sample_paths<R: Rng + ?Sized>(
        &self,
        (source, target): Pair,
        rng: &mut R,
    ) -> Vec<Vec<NodeIndex>> {
        (0..self.walks_per_pair)
            .filter_map(|_| self.walk(source, target, rng))
            .collect()
    }

    fn walk<R: Rng + ?Sized>(
        &self,
        source: NodeIndex,
        target: NodeIndex,
        rng: &mut R,
    ) -> Option<Vec<NodeIndex>> {
        let mut path = vec![source];
        let mut visited: HashSet<NodeIndex> = HashSet::from([source]);
        let mut current = source;

        for _ in 0..self.max_length {
            let neighbors = self.graph.neighbors(current);
            if neighbors.is_empty() {
                return None;
            }
            let weights: Vec<f64> = neighbors
                .iter()
                .map(|n| {
                    if visited.contains(n) {
                        1.0
                    } else {
                        self.unvisited_bias
                    }
                })
                .collect();
            let next = neighbors[weighted_pick(&weights, rng)];

            path.push(next);
            visited.insert(next);
            current = next;
            if current == target {
                return Some(path);
            }
        }
        None
    }
}

/// Index drawn with probability proportional to its weight
fn weighted_pick<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> usize {
    let total: f64 = weights.iter().sum();
    let mut roll = rng.random::<f64>() * total;
    for (i, w) in weights.iter().enumerate() {
        if roll < *w {
            return i;
        }
        roll -= w;
    }
    weights.len().saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Connection, Level, Room};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn graph(ids: &[&str], edges: &[(&str, &str)]) -> LevelGraph {
        let mut level = Level::new("L1");
        for (i, id) in ids.iter().enumerate() {
            level.rooms.push(Room::new(*id, i as f64 * 10.0, 0.0, 5.0, 5.0));
        }
        for (a, b) in edges {
            level.connections.push(Connection::new(*a, *b));
        }
        LevelGraph::from_connections(&level)
    }

    fn path5() -> LevelGraph {
        graph(
            &["a", "b", "c", "d", "e"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e")],
        )
    }

    #[test]
    fn test_tiers_on_path() {
        // Eccentricities 4,3,2,3,4
        let g = path5();
        let tiers = Tiers::classify(&g);
        assert_eq!(tiers.diameter, 4);
        assert_eq!(tiers.center, vec![g.index_of("c").unwrap()]);
        assert_eq!(tiers.medium.len(), 2);
        assert_eq!(tiers.periphery.len(), 2);
    }

    #[test]
    fn test_regular_graph_is_all_center() {
        let g = graph(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a")],
        );
        let tiers = Tiers::classify(&g);
        assert_eq!(tiers.center.len(), 4);
        assert!(tiers.periphery.is_empty());
    }

    #[test]
    fn test_stratified_pairs_are_distinct_and_capped() {
        let g = path5();
        let tiers = Tiers::classify(&g);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let pairs = tiers.stratified_pairs(24, &mut rng);
        // Only 10 unordered pairs exist among five nodes
        assert_eq!(pairs.len(), 10);
        let unique: HashSet<Pair> = pairs.iter().map(|p| normalize(*p)).collect();
        assert_eq!(unique.len(), 10);
        assert!(pairs.iter().all(|(a, b)| a != b));
    }

    #[test]
    fn test_walks_end_at_target_and_respect_cap() {
        let g = path5();
        let sampler = PathSampler::new(&g, 10, 12, 3.0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let a = g.index_of("a").unwrap();
        let e = g.index_of("e").unwrap();
        let paths = sampler.sample_paths((a, e), &mut rng);
        assert!(!paths.is_empty());
        for p in &paths {
            assert_eq!(p.first(), Some(&a));
            assert_eq!(p.last(), Some(&e));
            assert!(p.len() <= 13);
        }
    }

    #[test]
    fn test_walk_across_components_fails() {
        let g = graph(&["a", "b", "c", "d"], &[("a", "b"), ("c", "d")]);
        let sampler = PathSampler::new(&g, 5, 20, 3.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let pair = (g.index_of("a").unwrap(), g.index_of("d").unwrap());
        assert!(sampler.sample_paths(pair, &mut rng).is_empty());
    }

    #[test]
    fn test_weighted_pick_never_picks_zero_weight() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..100 {
            assert_eq!(weighted_pick(&[0.0, 5.0, 0.0], &mut rng), 1);
        }
    }
}
