//! Entrance/exit resolution
//!
//! Rules that reason about a directed key path need a start and a goal. Few
//! generators mark them, so each slot is resolved independently through a
//! cascade where the first strategy with a hit wins:
//!
//! 1. Explicit `is_entrance` / `is_exit` flag
//! 2. Keyword in the node's name or description
//! 3. Lowest connection degree (leaf rooms are natural start/end points),
//!    ties broken by geometric extremity
//! 4. Geometric extremity: entrance = smallest `x + y` of the centre,
//!    exit = largest
//!
//! The exit is always resolved with the entrance excluded, so the two never
//! coincide when the level has more than one candidate.

use crate::graph::LevelGraph;
use crate::models::{Level, NodeKind, NodeRef};
use serde::Serialize;

const ENTRANCE_KEYWORDS: &[&str] = &["entrance", "entry", "start", "upstairs", "gate"];
const EXIT_KEYWORDS: &[&str] = &["exit", "boss", "goal", "downstairs", "lair", "throne"];

/// Which cascade step produced a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    ExplicitFlag,
    Keyword,
    LowestDegree,
    Geometric,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntranceExit {
    pub entrance: String,
    pub exit: String,
    pub entrance_strategy: Strategy,
    pub exit_strategy: Strategy,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Slot {
    Entrance,
    Exit,
}

impl Slot {
    fn flagged(self, node: &NodeRef<'_>) -> bool {
        match self {
            Slot::Entrance => node.is_entrance(),
            Slot::Exit => node.is_exit(),
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Slot::Entrance => ENTRANCE_KEYWORDS,
            Slot::Exit => EXIT_KEYWORDS,
        }
    }

    /// Pick the most extreme node: lowest `x + y` for entrances, highest for exits.
    /// Earlier declarations win ties.
    fn most_extreme<'a>(self, nodes: &[NodeRef<'a>]) -> Option<NodeRef<'a>> {
        let mut best: Option<(NodeRef<'a>, f64)> = None;
        for node in nodes {
            let c = node.center();
            let key = match self {
                Slot::Entrance => c.x + c.y,
                Slot::Exit => -(c.x + c.y),
            };
            let better = match best {
                Some((_, k)) => key < k,
                None => true,
            };
            if better {
                best = Some((*node, key));
            }
        }
        best.map(|(n, _)| n)
    }
}

fn mentions_keyword(node: &NodeRef<'_>, keywords: &[&str]) -> bool {
    let text = node.text().to_lowercase();
    text.split(|c: char| !c.is_alphanumeric())
        .any(|word| keywords.contains(&word))
}

/// Resolve the entrance and exit of `level`, using `graph` for degrees.
///
/// Candidates are the level's rooms, or all nodes when it has no rooms. The
/// exit falls back to the other nodes when no second room exists, so the two
/// only coincide on a single-node level. Returns `None` for a level without nodes.
pub fn identify(level: &Level, graph: &LevelGraph) -> Option<EntranceExit> {
    let rooms: Vec<NodeRef<'_>> = level
        .nodes()
        .filter(|n| n.kind() == NodeKind::Room)
        .collect();
    let candidates: Vec<NodeRef<'_>> = if rooms.is_empty() {
        level.nodes().collect()
    } else {
        rooms
    };

    let (entrance, entrance_strategy) = resolve(Slot::Entrance, &candidates, graph)?;

    let mut remaining: Vec<NodeRef<'_>> = candidates
        .iter()
        .copied()
        .filter(|n| n.id() != entrance.id())
        .collect();
    if remaining.is_empty() {
        // A lone room still gets a distinct exit among the corridors
        remaining = level
            .nodes()
            .filter(|n| n.id() != entrance.id())
            .collect();
    }
    let (exit, exit_strategy) = if remaining.is_empty() {
        (entrance, entrance_strategy)
    } else {
        resolve(Slot::Exit, &remaining, graph)?
    };

    Some(EntranceExit {
        entrance: entrance.id().to_string(),
        exit: exit.id().to_string(),
        entrance_strategy,
        exit_strategy,
    })
}

fn resolve<'a>(
    slot: Slot,
    candidates: &[NodeRef<'a>],
    graph: &LevelGraph,
) -> Option<(NodeRef<'a>, Strategy)> {
    if let Some(node) = candidates.iter().find(|n| slot.flagged(n)) {
        return Some((*node, Strategy::ExplicitFlag));
    }

    if let Some(node) = candidates
        .iter()
        .find(|n| mentions_keyword(n, slot.keywords()))
    {
        return Some((*node, Strategy::Keyword));
    }

    // Only nodes that are actually wired in count as leaves
    let wired: Vec<(NodeRef<'a>, usize)> = candidates
        .iter()
        .map(|n| (*n, graph.degree_of(n.id())))
        .filter(|(_, d)| *d > 0)
        .collect();
    if let Some(min_degree) = wired.iter().map(|(_, d)| *d).min() {
        let lowest: Vec<NodeRef<'a>> = wired
            .iter()
            .filter(|(_, d)| *d == min_degree)
            .map(|(n, _)| *n)
            .collect();
        if let Some(node) = slot.most_extreme(&lowest) {
            return Some((node, Strategy::LowestDegree));
        }
    }

    slot.most_extreme(candidates)
        .map(|node| (node, Strategy::Geometric))
}
