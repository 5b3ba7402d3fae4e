//! Undirected connectivity graph for a single level
//!
//! `LevelGraph` wraps a petgraph `UnGraph` keyed by node id. Connections are
//! treated as unordered pairs: duplicates in either direction collapse into one
//! edge and self loops are dropped, so every traversal sees a simple graph.
//!
//! Two constructors cover the two views the rules need:
//! - [`LevelGraph::from_connections`] - only nodes that take part in a
//!   connection (the "connected" view used by accessibility, dead ends, loops)
//! - [`LevelGraph::from_level`] - every room and corridor, isolated ones included

use crate::models::Level;
use petgraph::algo::kosaraju_scc;
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

pub struct LevelGraph {
    graph: UnGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

impl LevelGraph {
    /// Graph over connection endpoints, in order of first appearance
    pub fn from_connections(level: &Level) -> Self {
        let mut lg = Self::empty();
        lg.add_connections(level);
        lg
    }

    /// Graph over every node of the level, rooms first, then corridors
    pub fn from_level(level: &Level) -> Self {
        let mut lg = Self::empty();
        for node in level.nodes() {
            lg.ensure_node(node.id());
        }
        lg.add_connections(level);
        lg
    }

    fn empty() -> Self {
        Self {
            graph: UnGraph::new_undirected(),
            index: HashMap::new(),
        }
    }

    fn ensure_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.to_string());
        self.index.insert(id.to_string(), idx);
        idx
    }

    fn add_connections(&mut self, level: &Level) {
        let known: HashSet<&str> = level.nodes().map(|n| n.id()).collect();
        for conn in &level.connections {
            if conn.from_room == conn.to_room {
                continue;
            }
            if !known.contains(conn.from_room.as_str()) || !known.contains(conn.to_room.as_str()) {
                debug!(
                    "Level {}: skipping connection {} - {} with unknown endpoint",
                    level.id, conn.from_room, conn.to_room
                );
                continue;
            }
            let a = self.ensure_node(&conn.from_room);
            let b = self.ensure_node(&conn.to_room);
            self.graph.update_edge(a, b, ());
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn id_of(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.graph.neighbors(idx).count()
    }

    /// Degree by id; nodes outside the graph have degree 0
    pub fn degree_of(&self, id: &str) -> usize {
        self.index_of(id).map(|idx| self.degree(idx)).unwrap_or(0)
    }

    /// Neighbours in ascending index order
    pub fn neighbors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
        out.sort();
        out
    }

    /// Hop distance from `start` to every node (`None` = unreachable)
    pub fn bfs_distances(&self, start: NodeIndex) -> Vec<Option<usize>> {
        let mut dist = vec![None; self.graph.node_count()];
        if start.index() >= dist.len() {
            return dist;
        }
        dist[start.index()] = Some(0);
        let mut queue = VecDeque::from([start]);
        while let Some(u) = queue.pop_front() {
            let du = dist[u.index()].unwrap_or(0);
            for v in self.graph.neighbors(u) {
                if dist[v.index()].is_none() {
                    dist[v.index()] = Some(du + 1);
                    queue.push_back(v);
                }
            }
        }
        dist
    }

    pub fn shortest_distance(&self, from: NodeIndex, to: NodeIndex) -> Option<usize> {
        self.bfs_distances(from).get(to.index()).copied().flatten()
    }

    /// Longest shortest-path distance from `idx` to any reachable node
    pub fn eccentricity(&self, idx: NodeIndex) -> usize {
        self.bfs_distances(idx)
            .into_iter()
            .flatten()
            .max()
            .unwrap_or(0)
    }

    /// Eccentricity of every node, indexed by `NodeIndex::index()`
    pub fn eccentricities(&self) -> Vec<usize> {
        self.graph
            .node_indices()
            .map(|idx| self.eccentricity(idx))
            .collect()
    }

    /// Connected components, ordered by their lowest node index
    pub fn connected_components(&self) -> Vec<Vec<NodeIndex>> {
        // On an undirected graph the strongly connected components are the
        // connected components
        let mut components = kosaraju_scc(&self.graph);
        for component in &mut components {
            component.sort();
        }
        components.sort_by_key(|c| c.first().copied());
        components
    }

    pub fn largest_component_size(&self) -> usize {
        self.connected_components()
            .iter()
            .map(|c| c.len())
            .max()
            .unwrap_or(0)
    }

    /// Number of independent cycles, counted as DFS back edges.
    ///
    /// Each non-tree edge of an undirected DFS closes exactly one cycle with
    /// the tree path, so for a simple graph this equals `E - V + components`.
    pub fn cycle_count(&self) -> usize {
        let n = self.graph.node_count();
        let mut disc = vec![usize::MAX; n];
        let mut parent: Vec<Option<NodeIndex>> = vec![None; n];
        let mut time = 0usize;
        let mut back_edges = 0usize;

        for root in self.graph.node_indices() {
            if disc[root.index()] != usize::MAX {
                continue;
            }
            disc[root.index()] = time;
            time += 1;
            let mut stack = vec![(root, self.neighbors(root), 0usize)];

            loop {
                let step = match stack.last_mut() {
                    None => break,
                    Some((u, nbrs, pos)) => {
                        if *pos < nbrs.len() {
                            let v = nbrs[*pos];
                            *pos += 1;
                            Some((*u, v))
                        } else {
                            None
                        }
                    }
                };
                match step {
                    Some((u, v)) => {
                        if disc[v.index()] == usize::MAX {
                            disc[v.index()] = time;
                            time += 1;
                            parent[v.index()] = Some(u);
                            stack.push((v, self.neighbors(v), 0));
                        } else if parent[u.index()] != Some(v)
                            && disc[v.index()] < disc[u.index()]
                        {
                            back_edges += 1;
                        }
                    }
                    None => {
                        stack.pop();
                    }
                }
            }
        }
        back_edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Connection, Room};

    fn level_with(ids: &[&str], edges: &[(&str, &str)]) -> Level {
        let mut level = Level::new("L1");
        for (i, id) in ids.iter().enumerate() {
            level.rooms.push(Room::new(*id, i as f64 * 10.0, 0.0, 4.0, 4.0));
        }
        for (a, b) in edges {
            level.connections.push(Connection::new(*a, *b));
        }
        level
    }

    #[test]
    fn test_duplicate_and_reversed_edges_collapse() {
        let level = level_with(&["a", "b"], &[("a", "b"), ("b", "a"), ("a", "b"), ("a", "a")]);
        let g = LevelGraph::from_connections(&level);
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.cycle_count(), 0);
    }

    #[test]
    fn test_unknown_endpoints_are_skipped() {
        let level = level_with(&["a", "b"], &[("a", "b"), ("b", "ghost")]);
        let g = LevelGraph::from_connections(&level);
        assert_eq!(g.node_count(), 2);
        assert!(g.index_of("ghost").is_none());
    }

    #[test]
    fn test_from_level_keeps_isolated_nodes() {
        let level = level_with(&["a", "b", "c"], &[("a", "b")]);
        let g = LevelGraph::from_level(&level);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.degree_of("c"), 0);
        assert_eq!(g.connected_components().len(), 2);
    }

    #[test]
    fn test_bfs_and_eccentricity_on_path() {
        let level = level_with(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c"), ("c", "d")]);
        let g = LevelGraph::from_connections(&level);
        let a = g.index_of("a").unwrap();
        let d = g.index_of("d").unwrap();
        assert_eq!(g.shortest_distance(a, d), Some(3));
        assert_eq!(g.eccentricity(a), 3);
        assert_eq!(g.eccentricity(g.index_of("b").unwrap()), 2);
    }

    #[test]
    fn test_cycle_count_matches_cyclomatic_number() {
        // Ring of four plus a chord: two independent cycles
        let level = level_with(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a"), ("a", "c")],
        );
        let g = LevelGraph::from_connections(&level);
        assert_eq!(g.cycle_count(), 2);
        assert_eq!(g.cycle_count(), g.edge_count() - g.node_count() + 1);
    }

    #[test]
    fn test_components_and_largest() {
        let level = level_with(
            &["a", "b", "c", "d", "e"],
            &[("a", "b"), ("b", "c"), ("d", "e")],
        );
        let g = LevelGraph::from_connections(&level);
        assert_eq!(g.connected_components().len(), 2);
        assert_eq!(g.largest_component_size(), 3);
    }

    #[test]
    fn test_components_are_sorted_by_lowest_index() {
        let level = level_with(
            &["a", "b", "c", "d", "e", "f"],
            &[("d", "e"), ("a", "c"), ("f", "b")],
        );
        let g = LevelGraph::from_level(&level);
        let ids: Vec<Vec<&str>> = g
            .connected_components()
            .iter()
            .map(|c| c.iter().map(|&i| g.id_of(i)).collect())
            .collect();
        assert_eq!(ids, vec![vec!["a", "c"], vec!["b", "f"], vec!["d", "e"]]);
    }
}
