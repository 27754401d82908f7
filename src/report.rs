use crate::error::{AssemblyError, Result};
use crate::graph::Graph;
use crate::read_path::{PathSet, ReadPath};
use crate::reduce::ReduceOutcome;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    pub total_weight: usize,
}

impl From<&Graph> for GraphSummary {
    fn from(graph: &Graph) -> Self {
        GraphSummary {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            total_weight: graph.total_weight(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PathSummary {
    pub nodes: Vec<String>,
    pub sequence: String,
}

impl From<&ReadPath> for PathSummary {
    fn from(path: &ReadPath) -> Self {
        PathSummary {
            nodes: path.node_labels().map(str::to_string).collect(),
            sequence: path.sequence(),
        }
    }
}

pub(crate) fn path_summaries(paths: &PathSet) -> Vec<PathSummary> {
    paths.iter().map(PathSummary::from).collect()
}

/// Result of one Eulerian walk attempt on a strand's graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WalkSummary {
    pub sequence: Option<String>,
    pub eulerian: bool,
    pub error: Option<String>,
}

/// Everything a run produced, ready to print or serialize.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AssemblyReport {
    pub kmer_length: usize,
    pub reads: usize,
    pub kmers: usize,
    pub forward_graph: GraphSummary,
    pub reverse_graph: GraphSummary,
    pub forward_walk: WalkSummary,
    pub reverse_walk: WalkSummary,
    pub original_paths: Vec<PathSummary>,
    pub reduced_paths: Vec<PathSummary>,
    pub reduction: ReduceOutcome,
    pub reduced_graph: GraphSummary,
    pub contigs: Vec<String>,
}

impl AssemblyReport {
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| AssemblyError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer).map_err(|e| AssemblyError::io(path, e))?;
        writer.flush().map_err(|e| AssemblyError::io(path, e))?;
        Ok(())
    }
}

fn write_paths(f: &mut fmt::Formatter<'_>, paths: &[PathSummary]) -> fmt::Result {
    for (i, path) in paths.iter().enumerate() {
        writeln!(f, "Read Path {} Nodes: {}", i, path.nodes.join(" "))?;
        writeln!(f, "Read Path {} Sequence: {}", i, path.sequence)?;
        writeln!(f)?;
    }
    Ok(())
}

impl fmt::Display for AssemblyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.forward_walk.sequence, &self.forward_walk.error) {
            (Some(seq), _) => writeln!(f, "Eulerian Walk: {}", seq)?,
            (None, Some(err)) => writeln!(f, "Eulerian Walk: unavailable ({})", err)?,
            (None, None) => writeln!(f, "Eulerian Walk: unavailable")?,
        }
        writeln!(f)?;

        writeln!(f, "Original Read Path Set")?;
        write_paths(f, &self.original_paths)?;
        writeln!(f)?;
        writeln!(f, "Reduced Read Path Set")?;
        write_paths(f, &self.reduced_paths)?;

        writeln!(f, "Contigs: {}", self.contigs.join(" "))
    }
}
