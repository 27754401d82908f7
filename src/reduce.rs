use crate::graph::Graph;
use crate::read_path::{PathSet, XyDetachment};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReduceOptions {
    /// Stop after this many dequeues even if work remains.
    pub max_iterations: Option<usize>,
}

/// Counters describing a reduction run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReduceOutcome {
    pub iterations: usize,
    pub merges: usize,
    pub nodes_removed: usize,
    /// Paths still queued when the iteration cap was hit; zero on a full run.
    pub remaining: usize,
    pub capped: bool,
}

/// Drives xy-detachment over a graph and the read paths built from the same reads.
///
/// Each merge is applied to every path first and then to the graph, so the two
/// stay in lockstep.
pub struct PathReducer<'a> {
    graph: &'a mut Graph,
    paths: &'a mut PathSet,
    options: ReduceOptions,
}

impl<'a> PathReducer<'a> {
    pub fn new(graph: &'a mut Graph, paths: &'a mut PathSet, options: ReduceOptions) -> Self {
        PathReducer {
            graph,
            paths,
            options,
        }
    }

    /// Drain the work queue until every path holds at most one edge.
    ///
    /// Degrees are recounted from the edge set once the loop ends.
    pub fn run(&mut self) -> ReduceOutcome {
        let mut queue = self.paths.paths_to_reduce();
        let mut outcome = ReduceOutcome::default();
        info!(queued = queue.len(), paths = self.paths.len(), "starting xy-detachment");

        while !queue.is_empty() {
            if self
                .options
                .max_iterations
                .map_or(false, |cap| outcome.iterations >= cap)
            {
                outcome.capped = true;
                outcome.remaining = queue.len();
                warn!(
                    iterations = outcome.iterations,
                    remaining = outcome.remaining,
                    "iteration cap reached, stopping reduction early"
                );
                break;
            }
            let Some(index) = queue.dequeue() else {
                break;
            };
            outcome.iterations += 1;

            // Paths of one edge were shortened by an earlier merge; drop them.
            let Some(merge) = self.detachment_for(index) else {
                continue;
            };
            self.apply(&merge, &mut outcome);

            if self.paths.get(index).map_or(false, |p| p.edge_count() > 1) {
                queue.enqueue(index);
            }
        }

        self.graph.set_in_out_degree();
        info!(
            iterations = outcome.iterations,
            merges = outcome.merges,
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "xy-detachment finished"
        );
        outcome
    }

    /// The merge of the first two edges of a path, if it has at least two.
    fn detachment_for(&self, index: usize) -> Option<XyDetachment> {
        let path = self.paths.get(index)?;
        if path.len() <= 2 {
            return None;
        }
        let (v_in, v_mid, v_out) = (path.node(0)?, path.node(1)?, path.node(2)?);
        let x = v_in.edge.as_deref()?;
        let y = v_mid.edge.as_deref()?;

        for (start, end, label) in [(v_in, v_mid, x), (v_mid, v_out, y)] {
            let recorded = self.graph.edge(&start.label, &end.label).map(|e| e.label.as_str());
            if recorded != Some(label) {
                debug!(
                    start = %start.label,
                    end = %end.label,
                    path_label = label,
                    graph_label = ?recorded,
                    "path edge differs from graph edge, using path label"
                );
            }
        }
        Some(XyDetachment::new(&v_in.label, &v_mid.label, &v_out.label, x, y))
    }

    fn apply(&mut self, merge: &XyDetachment, outcome: &mut ReduceOutcome) {
        let touched = self.paths.xy_detach_all(merge);

        self.graph.add_edge(&merge.v_in, &merge.v_out, &merge.z);
        self.graph.remove_edge(&merge.v_in, &merge.v_mid);
        self.graph.remove_edge(&merge.v_mid, &merge.v_out);

        if self.graph.in_degree(&merge.v_mid) == 0
            && self.graph.out_degree(&merge.v_mid) == 0
            && self.graph.remove_node(&merge.v_mid)
        {
            outcome.nodes_removed += 1;
        }
        outcome.merges += 1;
        debug!(
            x = %merge.x,
            y = %merge.y,
            z = %merge.z,
            paths = touched,
            "merged edge pair"
        );
    }
}

/// Reduce `paths` against `graph` with the given options.
pub fn reduce_paths(graph: &mut Graph, paths: &mut PathSet, options: ReduceOptions) -> ReduceOutcome {
    PathReducer::new(graph, paths, options).run()
}
