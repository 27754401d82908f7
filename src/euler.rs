use crate::error::{AssemblyError, Result};
use crate::graph::Graph;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;

/// Rule deciding whether the walk may step from a node into one of its successors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum ContinuationGuard {
    /// Step into a successor if it still has any in- or out-degree left. Every
    /// successor is tried at most once per visit, so parallel edges can be skipped
    /// and the walk is not guaranteed to be Eulerian.
    NodeDegree,
    /// Keep following an edge while `traversed < weight`.
    #[default]
    EdgeCapacity,
}

/// An Eulerian walk as an ordered list of node labels.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EulerianWalk {
    pub nodes: Vec<String>,
}

impl EulerianWalk {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Spell the walk: the first label in full, then the last base of each following label.
    pub fn sequence(&self) -> String {
        let mut nodes = self.nodes.iter();
        let mut seq = nodes.next().cloned().unwrap_or_default();
        for label in nodes {
            if let Some(base) = label.chars().last() {
                seq.push(base);
            }
        }
        seq
    }

    /// True when every step follows a graph edge and each edge is used exactly `weight` times.
    pub fn covers(&self, graph: &Graph) -> bool {
        let mut used: HashMap<(&str, &str), usize> = HashMap::new();
        for pair in self.nodes.windows(2) {
            if graph.edge(&pair[0], &pair[1]).is_none() {
                return false;
            }
            *used.entry((pair[0].as_str(), pair[1].as_str())).or_insert(0) += 1;
        }
        used.len() == graph.edge_count()
            && graph
                .edges()
                .all(|e| used.get(&(e.start.as_str(), e.end.as_str())) == Some(&e.weight))
    }
}

/// One suspended visit of the depth-first walk.
struct Frame {
    node: String,
    successors: Vec<String>,
    cursor: usize,
}

/// Randomized depth-first Eulerian walk over a [`Graph`].
///
/// The walk consumes the graph's degree maps as scratch counters; call
/// [`Graph::set_in_out_degree`] afterwards before relying on degrees again.
pub struct EulerianPathFinder<'a, R: Rng + ?Sized> {
    graph: &'a mut Graph,
    rng: &'a mut R,
    guard: ContinuationGuard,
}

impl<'a, R: Rng + ?Sized> EulerianPathFinder<'a, R> {
    pub fn new(graph: &'a mut Graph, rng: &'a mut R, guard: ContinuationGuard) -> Self {
        EulerianPathFinder { graph, rng, guard }
    }

    /// Walk from `start` and return the visited nodes in reverse post-order.
    ///
    /// Uses an explicit stack whose frames hold the shuffled successors and a cursor,
    /// which visits and backtracks in the same order as the recursive formulation.
    pub fn find_path(&mut self, start: &str) -> Vec<String> {
        let mut path = Vec::new();
        if !self.graph.contains_node(start) {
            return path;
        }
        self.graph.clear_traversed();

        let mut stack = Vec::new();
        if let Some(frame) = self.enter(start, &mut path) {
            stack.push(frame);
        }
        while let Some(frame) = stack.last_mut() {
            match self.advance(frame) {
                Some(next) => {
                    if let Some(child) = self.enter(&next, &mut path) {
                        stack.push(child);
                    }
                }
                None => {
                    if let Some(done) = stack.pop() {
                        path.push(done.node);
                    }
                }
            }
        }
        path
    }

    /// Start a visit. Dead ends are appended right away and yield no frame.
    fn enter(&mut self, node: &str, path: &mut Vec<String>) -> Option<Frame> {
        self.graph.decrement_in_degree(node);
        if self.graph.out_degree(node) == 0 {
            path.push(node.to_string());
            return None;
        }
        let mut successors = self.graph.successors(node);
        successors.shuffle(&mut *self.rng);
        Some(Frame {
            node: node.to_string(),
            successors,
            cursor: 0,
        })
    }

    /// Pick the next successor to descend into, consuming one unit of its edge.
    fn advance(&mut self, frame: &mut Frame) -> Option<String> {
        while frame.cursor < frame.successors.len() {
            let next = frame.successors[frame.cursor].clone();
            let proceed = match self.guard {
                ContinuationGuard::NodeDegree => {
                    frame.cursor += 1;
                    self.graph.out_degree(&next) > 0 || self.graph.in_degree(&next) > 0
                }
                ContinuationGuard::EdgeCapacity => {
                    let open = self
                        .graph
                        .edge(&frame.node, &next)
                        .map_or(false, |e| e.traversed < e.weight);
                    if !open {
                        frame.cursor += 1;
                    }
                    open
                }
            };
            if proceed {
                if let Some(edge) = self.graph.edge_mut(&frame.node, &next) {
                    edge.traversed += 1;
                }
                self.graph.decrement_out_degree(&frame.node);
                return Some(next);
            }
        }
        None
    }
}

/// Find a start node and walk the graph from it, returning the walk in forward order.
pub fn assemble_walk<R: Rng + ?Sized>(
    graph: &mut Graph,
    rng: &mut R,
    guard: ContinuationGuard,
) -> Result<EulerianWalk> {
    let start = graph
        .find_start_node()
        .ok_or_else(|| AssemblyError::NoStartNode {
            semi_balanced: graph.semi_balanced_nodes().len(),
        })?;
    let mut nodes = EulerianPathFinder::new(graph, rng, guard).find_path(&start);
    nodes.reverse();
    Ok(EulerianWalk { nodes })
}
