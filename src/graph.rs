use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// A De Bruijn node, identified by its (L-1)-mer label
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Node {
    pub label: String,
}

/// A directed edge between two node labels.
///
/// Edges are keyed by `(start, end)`; adding the same pair again bumps `weight`
/// instead of creating a parallel record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub start: String,
    pub end: String,
    pub label: String,
    pub weight: usize,
    pub traversed: usize,
}

/// Directed multigraph over string labels with weighted edges and degree bookkeeping.
///
/// Degrees are signed: the Eulerian walk uses them as scratch counters and can push
/// the in-degree of the start node below zero. A label missing from a degree map has
/// degree 0.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    node_set: HashSet<String>,
    edge_order: Vec<(String, String)>,
    adjacency: HashMap<String, BTreeMap<String, Edge>>,
    in_degree: HashMap<String, i64>,
    out_degree: HashMap<String, i64>,
}

impl Graph {
    pub fn new() -> Self {
        Graph::default()
    }

    /// Build a De Bruijn graph: every k-mer `t` becomes an edge `t[..L-1] -> t[1..]`.
    pub fn from_kmers<I, S>(kmers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut graph = Graph::new();
        for kmer in kmers {
            let kmer = kmer.as_ref();
            if kmer.len() < 2 {
                continue;
            }
            graph.add_edge(&kmer[..kmer.len() - 1], &kmer[1..], kmer);
        }
        graph
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct `(start, end)` edge records, ignoring weight.
    pub fn edge_count(&self) -> usize {
        self.edge_order.len()
    }

    /// Sum of all edge weights.
    pub fn total_weight(&self) -> usize {
        self.edges().map(|e| e.weight).sum()
    }

    pub fn contains_node(&self, label: &str) -> bool {
        self.node_set.contains(label)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edge_order
            .iter()
            .filter_map(move |(start, end)| self.edge(start, end))
    }

    pub fn edge(&self, start: &str, end: &str) -> Option<&Edge> {
        self.adjacency.get(start).and_then(|ends| ends.get(end))
    }

    pub(crate) fn edge_mut(&mut self, start: &str, end: &str) -> Option<&mut Edge> {
        self.adjacency
            .get_mut(start)
            .and_then(|ends| ends.get_mut(end))
    }

    /// Distinct successor labels of `label`, sorted.
    pub fn successors(&self, label: &str) -> Vec<String> {
        self.adjacency
            .get(label)
            .map(|ends| ends.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn in_degree(&self, label: &str) -> i64 {
        self.in_degree.get(label).copied().unwrap_or(0)
    }

    pub fn out_degree(&self, label: &str) -> i64 {
        self.out_degree.get(label).copied().unwrap_or(0)
    }

    pub(crate) fn decrement_in_degree(&mut self, label: &str) {
        *self.in_degree.entry(label.to_string()).or_insert(0) -= 1;
    }

    pub(crate) fn decrement_out_degree(&mut self, label: &str) {
        *self.out_degree.entry(label.to_string()).or_insert(0) -= 1;
    }

    /// Insert a node unless one with the same label exists. Returns whether it was inserted.
    pub fn add_node(&mut self, label: &str) -> bool {
        if !self.node_set.insert(label.to_string()) {
            return false;
        }
        self.nodes.push(Node {
            label: label.to_string(),
        });
        true
    }

    /// Add one unit of weight from `start` to `end`.
    ///
    /// The label is only recorded when the edge is new. Degrees grow by one in both
    /// branches, so they always equal the cumulative weight.
    pub fn add_edge(&mut self, start: &str, end: &str, label: &str) {
        if let Some(edge) = self.edge_mut(start, end) {
            edge.weight += 1;
        } else {
            self.add_node(start);
            self.add_node(end);
            self.adjacency.entry(start.to_string()).or_default().insert(
                end.to_string(),
                Edge {
                    start: start.to_string(),
                    end: end.to_string(),
                    label: label.to_string(),
                    weight: 1,
                    traversed: 0,
                },
            );
            self.edge_order.push((start.to_string(), end.to_string()));
        }
        *self.out_degree.entry(start.to_string()).or_insert(0) += 1;
        *self.in_degree.entry(end.to_string()).or_insert(0) += 1;
    }

    /// Remove one unit of weight from `start -> end`. Returns false if no such edge exists.
    ///
    /// At weight 1 the edge record and its index entry are deleted outright.
    pub fn remove_edge(&mut self, start: &str, end: &str) -> bool {
        let Some(ends) = self.adjacency.get_mut(start) else {
            return false;
        };
        let Some(edge) = ends.get_mut(end) else {
            return false;
        };

        if edge.weight > 1 {
            edge.weight -= 1;
        } else {
            ends.remove(end);
            if ends.is_empty() {
                self.adjacency.remove(start);
            }
            self.edge_order.retain(|(s, e)| !(s == start && e == end));
        }
        self.decrement_out_degree(start);
        self.decrement_in_degree(end);
        true
    }

    /// Remove a node by label. Edges touching it must already be gone.
    pub fn remove_node(&mut self, label: &str) -> bool {
        if !self.node_set.remove(label) {
            return false;
        }
        self.nodes.retain(|n| n.label != label);
        self.in_degree.remove(label);
        self.out_degree.remove(label);
        true
    }

    /// Nodes whose in- and out-degree differ by exactly one, in insertion order.
    pub fn semi_balanced_nodes(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .map(|n| n.label.as_str())
            .filter(|label| (self.out_degree(label) - self.in_degree(label)).abs() == 1)
            .collect()
    }

    /// Start node for an Eulerian walk.
    ///
    /// With two semi-balanced nodes this is the one with one surplus outgoing edge;
    /// with none it is the first node that has outgoing edges. Any other count means
    /// the graph has no Eulerian path and `None` is returned.
    pub fn find_start_node(&self) -> Option<String> {
        let semi_balanced = self.semi_balanced_nodes();
        match semi_balanced.len() {
            2 => semi_balanced
                .into_iter()
                .find(|label| self.out_degree(label) - self.in_degree(label) == 1)
                .map(str::to_string),
            0 => self
                .nodes
                .iter()
                .find(|n| self.out_degree(&n.label) != 0)
                .map(|n| n.label.clone()),
            _ => None,
        }
    }

    /// Recompute both degree maps from edge weights.
    pub fn set_in_out_degree(&mut self) {
        let mut in_degree = HashMap::new();
        let mut out_degree = HashMap::new();
        for edge in self.edges() {
            *out_degree.entry(edge.start.clone()).or_insert(0) += edge.weight as i64;
            *in_degree.entry(edge.end.clone()).or_insert(0) += edge.weight as i64;
        }
        self.in_degree = in_degree;
        self.out_degree = out_degree;
    }

    /// Whether the incrementally maintained degrees match a fresh recount.
    pub fn degrees_consistent(&self) -> bool {
        let mut recounted = self.clone();
        recounted.set_in_out_degree();
        self.nodes.iter().all(|n| {
            self.in_degree(&n.label) == recounted.in_degree(&n.label)
                && self.out_degree(&n.label) == recounted.out_degree(&n.label)
        })
    }

    pub fn clear_traversed(&mut self) {
        for ends in self.adjacency.values_mut() {
            for edge in ends.values_mut() {
                edge.traversed = 0;
            }
        }
    }
}
