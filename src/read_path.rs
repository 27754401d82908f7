use rayon::prelude::*;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

/// One step of a read path: a node label and, unless it is the last step, the
/// label of the edge leaving it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PathNode {
    pub label: String,
    pub edge: Option<String>,
}

/// The trace of a single read through the graph, stored as a contiguous arena of
/// steps. All substitutions address steps by position.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReadPath {
    nodes: Vec<PathNode>,
}

/// Labels describing one xy-detachment: edges `x = v_in -> v_mid` and
/// `y = v_mid -> v_out` collapse into `z = v_in -> v_out`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct XyDetachment {
    pub x: String,
    pub y: String,
    pub z: String,
    pub v_in: String,
    pub v_mid: String,
    pub v_out: String,
}

impl XyDetachment {
    /// Build the detachment for two chained edge labels. `z` is `x` followed by
    /// whatever `y` spells past the shared middle node.
    pub fn new(v_in: &str, v_mid: &str, v_out: &str, x: &str, y: &str) -> Self {
        let tail = y.get(v_mid.len()..).unwrap_or("");
        XyDetachment {
            x: x.to_string(),
            y: y.to_string(),
            z: format!("{}{}", x, tail),
            v_in: v_in.to_string(),
            v_mid: v_mid.to_string(),
            v_out: v_out.to_string(),
        }
    }
}

impl ReadPath {
    /// Trace a read through its (l-1)-mer windows. Reads shorter than `l - 1`
    /// give an empty path.
    pub fn from_read(read: &str, l: usize) -> Self {
        if l < 2 || read.len() < l - 1 {
            return ReadPath::default();
        }
        let width = l - 1;
        let labels: Vec<&str> = (0..=read.len() - width).map(|i| &read[i..i + width]).collect();
        let nodes = labels
            .iter()
            .enumerate()
            .map(|(i, label)| PathNode {
                label: label.to_string(),
                edge: labels.get(i + 1).map(|next| {
                    let mut edge = label.to_string();
                    edge.push_str(&next[next.len() - 1..]);
                    edge
                }),
            })
            .collect();
        ReadPath { nodes }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn node(&self, index: usize) -> Option<&PathNode> {
        self.nodes.get(index)
    }

    pub fn node_labels(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.label.as_str())
    }

    pub fn edge_labels(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().filter_map(|n| n.edge.as_deref())
    }

    fn edge_at(&self, index: usize) -> Option<&str> {
        self.nodes.get(index).and_then(|n| n.edge.as_deref())
    }

    /// Spell the sequence the path covers: the first edge in full, then every later
    /// edge past its start node's label.
    pub fn sequence(&self) -> String {
        if self.edge_count() == 0 {
            return self
                .nodes
                .first()
                .map(|n| n.label.clone())
                .unwrap_or_default();
        }
        let mut seq = String::new();
        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(edge) = &node.edge {
                if i == 0 {
                    seq.push_str(edge);
                } else {
                    seq.push_str(edge.get(node.label.len()..).unwrap_or(""));
                }
            }
        }
        seq
    }

    pub fn is_start_edge(&self, label: &str) -> bool {
        self.edge_at(0) == Some(label)
    }

    /// Position of the node preceding the final edge, if that edge has this label.
    pub fn is_end_edge(&self, label: &str) -> Option<usize> {
        let penultimate = self.nodes.len().checked_sub(2)?;
        (self.edge_at(penultimate) == Some(label)).then_some(penultimate)
    }

    /// Positions `i` where edge `i` is `x` and edge `i + 1` is `y`.
    pub fn find_xy_occurrences(&self, x: &str, y: &str) -> Vec<usize> {
        if self.nodes.len() < 3 {
            return Vec::new();
        }
        (0..self.nodes.len() - 2)
            .filter(|&i| self.edge_at(i) == Some(x) && self.edge_at(i + 1) == Some(y))
            .collect()
    }

    /// The path now starts with `z`: relabel the head and its outgoing edge.
    pub fn apply_start_sub(&mut self, z: &str, new_head: &str) {
        if let Some(head) = self.nodes.first_mut() {
            if head.edge.is_some() {
                head.label = new_head.to_string();
                head.edge = Some(z.to_string());
            }
        }
    }

    /// The path now ends with `z`: relabel the final edge and the tail node.
    pub fn apply_end_sub(&mut self, z: &str, new_tail: &str, penultimate: usize) {
        if penultimate + 1 >= self.nodes.len() {
            return;
        }
        self.nodes[penultimate].edge = Some(z.to_string());
        self.nodes[penultimate + 1].label = new_tail.to_string();
    }

    /// Collapse each `x, y` pair starting at the given positions into a single `z`
    /// edge, dropping the middle node. Returns how many pairs were collapsed.
    ///
    /// Positions are spliced from the back so earlier ones stay valid. An occurrence
    /// overlapping one already collapsed is skipped.
    pub fn apply_interior_sub(&mut self, z: &str, occurrences: &[usize]) -> usize {
        let mut positions = occurrences.to_vec();
        positions.sort_unstable_by(|a, b| b.cmp(a));
        positions.dedup();

        let mut applied = 0;
        let mut last_spliced: Option<usize> = None;
        for i in positions {
            if i + 2 >= self.nodes.len() || last_spliced == Some(i + 1) {
                continue;
            }
            self.nodes[i].edge = Some(z.to_string());
            self.nodes.remove(i + 1);
            last_spliced = Some(i);
            applied += 1;
        }
        applied
    }

    /// Rewrite this path for one xy-detachment. All matches are located before any
    /// substitution is made. Returns whether the path changed.
    pub fn xy_detach(&mut self, merge: &XyDetachment) -> bool {
        let starts_with_y = self.is_start_edge(&merge.y);
        let ends_with_x = self.is_end_edge(&merge.x);
        let interior = self.find_xy_occurrences(&merge.x, &merge.y);

        if starts_with_y {
            self.apply_start_sub(&merge.z, &merge.v_in);
        }
        if let Some(penultimate) = ends_with_x {
            self.apply_end_sub(&merge.z, &merge.v_out, penultimate);
        }
        let collapsed = if interior.is_empty() {
            0
        } else {
            self.apply_interior_sub(&merge.z, &interior)
        };
        starts_with_y || ends_with_x.is_some() || collapsed > 0
    }
}

impl fmt::Display for ReadPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(&node.label)?;
        }
        Ok(())
    }
}

/// FIFO of paths, by index into a [`PathSet`], waiting to be reduced.
#[derive(Clone, Debug, Default)]
pub struct WorkQueue {
    queue: VecDeque<usize>,
}

impl WorkQueue {
    pub fn enqueue(&mut self, path: usize) {
        self.queue.push_back(path);
    }

    pub fn dequeue(&mut self) -> Option<usize> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// All read paths, in read order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PathSet {
    paths: Vec<ReadPath>,
}

impl PathSet {
    pub fn from_reads(reads: &[String], l: usize) -> Self {
        PathSet {
            paths: reads
                .par_iter()
                .map(|read| ReadPath::from_read(read, l))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ReadPath> {
        self.paths.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReadPath> {
        self.paths.iter()
    }

    /// Queue every path that still has more than one edge.
    pub fn paths_to_reduce(&self) -> WorkQueue {
        let mut queue = WorkQueue::default();
        for (i, path) in self.paths.iter().enumerate() {
            if path.edge_count() > 1 {
                queue.enqueue(i);
            }
        }
        queue
    }

    /// Apply one xy-detachment to every path. Returns how many paths changed.
    pub fn xy_detach_all(&mut self, merge: &XyDetachment) -> usize {
        self.paths
            .iter_mut()
            .map(|path| path.xy_detach(merge))
            .filter(|&changed| changed)
            .count()
    }
}

impl FromIterator<ReadPath> for PathSet {
    fn from_iter<I: IntoIterator<Item = ReadPath>>(iter: I) -> Self {
        PathSet {
            paths: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PathSet {
    type Item = &'a ReadPath;
    type IntoIter = std::slice::Iter<'a, ReadPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}
