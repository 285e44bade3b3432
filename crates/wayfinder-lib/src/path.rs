use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};

/// A simple path through the graph with its recomputed total weight.
#[derive(Debug, Clone, PartialEq)]
pub struct PathCandidate {
    pub nodes: Vec<NodeId>,
    pub weight: f64,
}

/// Wall-clock budget shared by every enumeration in one request.
#[derive(Debug, Clone, Copy)]
pub struct SearchBudget {
    started: Instant,
    deadline: Option<Instant>,
}

impl SearchBudget {
    pub fn new(limit: Option<Duration>) -> Self {
        let started = Instant::now();
        Self {
            started,
            deadline: limit.map(|limit| started + limit),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(None)
    }

    /// Fail with [`Error::SearchTimedOut`] once the deadline has passed.
    pub fn check(&self) -> Result<()> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(Error::SearchTimedOut {
                elapsed: self.started.elapsed(),
            }),
            _ => Ok(()),
        }
    }
}

/// Lowest-cost path between two nodes, if any.
pub fn shortest_path(graph: &Graph, start: &str, goal: &str) -> Option<PathCandidate> {
    let start = graph.node_index(start)?;
    let goal = graph.node_index(goal)?;
    dijkstra(graph, start, goal, &HashSet::new(), &HashSet::new())
        .map(|(path, cost)| candidate(graph, &path, cost))
}

/// Enumerate up to `k` loopless paths from `start` to `goal` in
/// non-decreasing weight order (Yen's algorithm).
///
/// Paths are distinct as node sequences; parallel edges never produce two
/// copies of the same sequence. Unknown endpoints or `start == goal` yield
/// no paths.
pub fn k_shortest_paths(
    graph: &Graph,
    start: &str,
    goal: &str,
    k: usize,
    budget: &SearchBudget,
) -> Result<Vec<PathCandidate>> {
    let (Some(start), Some(goal)) = (graph.node_index(start), graph.node_index(goal)) else {
        return Ok(Vec::new());
    };
    if k == 0 || start == goal {
        return Ok(Vec::new());
    }

    budget.check()?;
    let Some(first) = dijkstra(graph, start, goal, &HashSet::new(), &HashSet::new()) else {
        return Ok(Vec::new());
    };

    let mut accepted: Vec<(Vec<usize>, f64)> = vec![first];
    let mut candidates: BinaryHeap<CandidateEntry> = BinaryHeap::new();
    let mut seen: HashSet<Vec<usize>> = HashSet::new();
    seen.insert(accepted[0].0.clone());

    while accepted.len() < k {
        let previous = accepted[accepted.len() - 1].0.clone();

        for spur_index in 0..previous.len() - 1 {
            budget.check()?;

            let spur_node = previous[spur_index];
            let root = &previous[..=spur_index];

            let mut banned_edges = HashSet::new();
            for (path, _) in &accepted {
                if path.len() > spur_index + 1 && &path[..=spur_index] == root {
                    let next = path[spur_index + 1];
                    banned_edges.extend(
                        graph
                            .incident(spur_node)
                            .filter(|(_, edge)| edge.other(spur_node) == next)
                            .map(|(index, _)| index),
                    );
                }
            }
            let banned_nodes: HashSet<usize> = root[..spur_index].iter().copied().collect();

            let Some((spur_path, _)) =
                dijkstra(graph, spur_node, goal, &banned_nodes, &banned_edges)
            else {
                continue;
            };

            let mut total = root[..spur_index].to_vec();
            total.extend(spur_path);
            if !seen.insert(total.clone()) {
                continue;
            }
            if let Some(cost) = path_cost(graph, &total) {
                candidates.push(CandidateEntry {
                    cost: FloatOrd(cost),
                    path: total,
                });
            }
        }

        match candidates.pop() {
            Some(entry) => accepted.push((entry.path, entry.cost.0)),
            None => break,
        }
    }

    debug!(
        paths = accepted.len(),
        pending = candidates.len(),
        "enumerated k-shortest paths"
    );

    Ok(accepted
        .iter()
        .map(|(path, cost)| candidate(graph, path, *cost))
        .collect())
}

fn candidate(graph: &Graph, path: &[usize], cost: f64) -> PathCandidate {
    PathCandidate {
        nodes: path.iter().map(|&index| graph.node_at(index).id.clone()).collect(),
        weight: cost,
    }
}

fn path_cost(graph: &Graph, path: &[usize]) -> Option<f64> {
    path.windows(2).try_fold(0.0, |total, hop| {
        graph
            .edge_between_indices(hop[0], hop[1])
            .map(|edge| total + edge.weight)
    })
}

/// Dijkstra's algorithm over node indices, skipping banned nodes and edges.
fn dijkstra(
    graph: &Graph,
    start: usize,
    goal: usize,
    banned_nodes: &HashSet<usize>,
    banned_edges: &HashSet<usize>,
) -> Option<(Vec<usize>, f64)> {
    if start == goal {
        return Some((vec![start], 0.0));
    }

    let mut distances: HashMap<usize, f64> = HashMap::new();
    let mut parents: HashMap<usize, Option<usize>> = HashMap::new();
    let mut queue = BinaryHeap::new();

    distances.insert(start, 0.0);
    parents.insert(start, None);
    queue.push(QueueEntry::new(start, 0.0));

    while let Some(entry) = queue.pop() {
        let current_distance = match distances.get(&entry.node) {
            Some(distance) if *distance < entry.cost.0 => continue,
            Some(distance) => *distance,
            None => continue,
        };

        if entry.node == goal {
            return Some((reconstruct_path(&parents, start, goal), current_distance));
        }

        for (edge_index, edge) in graph.incident(entry.node) {
            if banned_edges.contains(&edge_index) {
                continue;
            }
            let next = edge.other(entry.node);
            if next == entry.node || banned_nodes.contains(&next) {
                continue;
            }

            let next_cost = current_distance + edge.weight;
            if next_cost < *distances.get(&next).unwrap_or(&f64::INFINITY) {
                distances.insert(next, next_cost);
                parents.insert(next, Some(entry.node));
                queue.push(QueueEntry::new(next, next_cost));
            }
        }
    }

    None
}

fn reconstruct_path(parents: &HashMap<usize, Option<usize>>, start: usize, goal: usize) -> Vec<usize> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        path.push(node);
        if node == start {
            break;
        }
        current = parents.get(&node).copied().flatten();
    }
    path.reverse();
    path
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: usize,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: usize, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Yen candidate; min-heap by cost, then by node sequence for determinism.
#[derive(Clone, Debug, Eq, PartialEq)]
struct CandidateEntry {
    cost: FloatOrd,
    path: Vec<usize>,
}

impl Ord for CandidateEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.path.cmp(&self.path))
    }
}

impl PartialOrd for CandidateEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
