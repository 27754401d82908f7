use crate::error::Result;
use crate::euler::{assemble_walk, ContinuationGuard, EulerianWalk};
use crate::graph::Graph;
use crate::kmer::{check_kmer_length, sample_kmers, save_kmers};
use crate::read_path::PathSet;
use crate::reduce::{reduce_paths, ReduceOptions, ReduceOutcome};
use crate::report::{path_summaries, AssemblyReport, GraphSummary, WalkSummary};
use crate::seq_io::{load_reads, reverse_complements, SequenceRecord};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "dbgrush",
    version,
    about = "De Bruijn graph assembly with Eulerian walks and xy-detachment"
)]
pub struct Args {
    /// Input FASTQ or FASTA file
    pub reads: PathBuf,

    /// K-mer (L-tuple) length; graph nodes are (L-1)-mers
    #[arg(short = 'l', long = "kmer-length", default_value_t = 3)]
    pub kmer_length: usize,

    /// Seed for the walk's branch order (drawn from entropy when omitted)
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Number of threads
    #[arg(short, long, default_value_t = 1)]
    pub threads: usize,

    /// Continue into a successor whenever it has degree left, instead of checking
    /// the edge's remaining weight
    #[arg(long = "node-degree-guard")]
    pub node_degree_guard: bool,

    /// Stop xy-detachment after this many queue iterations
    #[arg(long = "max-iterations")]
    pub max_iterations: Option<usize>,

    /// Write the distinct forward k-mers to this file, one per line
    #[arg(long = "kmers-out")]
    pub kmers_out: Option<PathBuf>,

    /// Write a JSON report to this file
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn config(&self) -> AssemblyConfig {
        AssemblyConfig {
            kmer_length: self.kmer_length,
            seed: self.seed,
            guard: if self.node_degree_guard {
                ContinuationGuard::NodeDegree
            } else {
                ContinuationGuard::EdgeCapacity
            },
            reduce: ReduceOptions {
                max_iterations: self.max_iterations,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssemblyConfig {
    pub kmer_length: usize,
    pub seed: Option<u64>,
    pub guard: ContinuationGuard,
    pub reduce: ReduceOptions,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        AssemblyConfig {
            kmer_length: 3,
            seed: None,
            guard: ContinuationGuard::default(),
            reduce: ReduceOptions::default(),
        }
    }
}

/// Outcome of walking one strand's graph.
#[derive(Clone, Debug)]
pub struct StrandWalk {
    pub walk: Option<EulerianWalk>,
    pub eulerian: bool,
    pub error: Option<String>,
}

impl From<&StrandWalk> for WalkSummary {
    fn from(strand: &StrandWalk) -> Self {
        WalkSummary {
            sequence: strand.walk.as_ref().map(EulerianWalk::sequence),
            eulerian: strand.eulerian,
            error: strand.error.clone(),
        }
    }
}

/// Graphs, walks and paths produced from one read set.
#[derive(Clone, Debug)]
pub struct Assembly {
    pub kmer_length: usize,
    pub forward_kmers: Vec<String>,
    pub forward_summary: GraphSummary,
    /// Forward-strand graph after xy-detachment.
    pub forward_graph: Graph,
    pub reverse_graph: Graph,
    pub forward_walk: StrandWalk,
    pub reverse_walk: StrandWalk,
    pub original_paths: PathSet,
    pub reduced_paths: PathSet,
    pub reduction: ReduceOutcome,
}

impl Assembly {
    /// Edge labels left in the reduced forward graph.
    pub fn contigs(&self) -> Vec<String> {
        self.forward_graph.edges().map(|e| e.label.clone()).collect()
    }

    pub fn report(&self) -> AssemblyReport {
        AssemblyReport {
            kmer_length: self.kmer_length,
            reads: self.original_paths.len(),
            kmers: self.forward_kmers.len(),
            forward_graph: self.forward_summary.clone(),
            reverse_graph: GraphSummary::from(&self.reverse_graph),
            forward_walk: WalkSummary::from(&self.forward_walk),
            reverse_walk: WalkSummary::from(&self.reverse_walk),
            original_paths: path_summaries(&self.original_paths),
            reduced_paths: path_summaries(&self.reduced_paths),
            reduction: self.reduction,
            reduced_graph: GraphSummary::from(&self.forward_graph),
            contigs: self.contigs(),
        }
    }
}

/// Walk a strand's graph, then restore its degrees for later use.
///
/// An unassemblable graph is logged and reported, not raised.
fn walk_strand<R: Rng + ?Sized>(
    graph: &mut Graph,
    rng: &mut R,
    guard: ContinuationGuard,
    strand: &str,
) -> StrandWalk {
    let result = assemble_walk(graph, rng, guard);
    graph.set_in_out_degree();
    match result {
        Ok(walk) => {
            let eulerian = walk.covers(graph);
            if !eulerian {
                warn!(strand, ?guard, "walk does not use every edge exactly once");
            }
            info!(strand, nodes = walk.len(), "Eulerian walk found");
            StrandWalk {
                walk: Some(walk),
                eulerian,
                error: None,
            }
        }
        Err(e) => {
            warn!(strand, error = %e, "skipping Eulerian walk");
            StrandWalk {
                walk: None,
                eulerian: false,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Build both strand graphs and the forward read paths, walk the graphs and reduce
/// the forward paths.
pub fn assemble(reads: &[String], config: &AssemblyConfig) -> Result<Assembly> {
    let l = config.kmer_length;
    check_kmer_length(l)?;

    let reverse_reads = reverse_complements(reads);
    let forward_kmers = sample_kmers(reads, l);
    let reverse_kmers = sample_kmers(&reverse_reads, l);

    let mut forward_graph = Graph::from_kmers(&forward_kmers);
    let mut reverse_graph = Graph::from_kmers(&reverse_kmers);
    let original_paths = PathSet::from_reads(reads, l);
    info!(
        reads = reads.len(),
        kmers = forward_kmers.len(),
        nodes = forward_graph.node_count(),
        edges = forward_graph.edge_count(),
        "built De Bruijn graph"
    );
    let forward_summary = GraphSummary::from(&forward_graph);

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let forward_walk = walk_strand(&mut forward_graph, &mut rng, config.guard, "forward");
    let reverse_walk = walk_strand(&mut reverse_graph, &mut rng, config.guard, "reverse");

    let mut reduced_paths = original_paths.clone();
    let reduction = reduce_paths(&mut forward_graph, &mut reduced_paths, config.reduce);

    Ok(Assembly {
        kmer_length: l,
        forward_kmers,
        forward_summary,
        forward_graph,
        reverse_graph,
        forward_walk,
        reverse_walk,
        original_paths,
        reduced_paths,
        reduction,
    })
}

/// Load reads from `args.reads`, assemble them and write any requested side outputs.
pub fn run_dbgrush(args: &Args) -> Result<AssemblyReport> {
    // Only initialize thread pool if not already initialized
    let _ = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global();

    let config = args.config();
    check_kmer_length(config.kmer_length)?;

    let records = load_reads(&args.reads)?;
    info!(path = %args.reads.display(), reads = records.len(), "loaded reads");
    let reads: Vec<String> = records.into_iter().map(|r: SequenceRecord| r.seq).collect();

    let assembly = assemble(&reads, &config)?;

    if let Some(path) = &args.kmers_out {
        save_kmers(&assembly.forward_kmers, path)?;
        info!(path = %path.display(), kmers = assembly.forward_kmers.len(), "wrote k-mers");
    }

    let report = assembly.report();
    if let Some(path) = &args.json {
        report.write_json(path)?;
        info!(path = %path.display(), "wrote JSON report");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_reads() -> Vec<String> {
        ["ACGC", "GCGTC", "CGCGT", "GCGTCG", "ACGCGT"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn seeded(seed: u64) -> AssemblyConfig {
        AssemblyConfig {
            seed: Some(seed),
            ..AssemblyConfig::default()
        }
    }

    #[test]
    fn test_assemble_example() {
        let assembly = assemble(&example_reads(), &seeded(5)).unwrap();

        assert_eq!(assembly.forward_summary.nodes, 5);
        assert_eq!(assembly.forward_summary.edges, 6);
        let walk = assembly.forward_walk.walk.as_ref().unwrap();
        assert!(assembly.forward_walk.eulerian);
        assert_eq!(walk.sequence().len(), 8);

        assert!(assembly.reduced_paths.iter().all(|p| p.edge_count() <= 1));
        assert_eq!(assembly.contigs(), vec!["ACGCGTCG"]);
        assert_eq!(assembly.original_paths.get(1).unwrap().to_string(), "GC CG GT TC");
    }

    #[test]
    fn test_reverse_strand_is_walked() {
        let assembly = assemble(&example_reads(), &seeded(5)).unwrap();
        // Reverse complement of the example genome ACGCGTCG.
        assert_eq!(assembly.reverse_graph.node_count(), 5);
        let walk = assembly.reverse_walk.walk.as_ref().unwrap();
        assert!(assembly.reverse_walk.eulerian);
        assert_eq!(walk.sequence().len(), 8);
    }

    #[test]
    fn test_unassemblable_graph_still_reduces() {
        let reads: Vec<String> = ["ACG", "TTA"].iter().map(|s| s.to_string()).collect();
        let assembly = assemble(&reads, &seeded(1)).unwrap();
        assert!(assembly.forward_walk.walk.is_none());
        assert!(assembly.forward_walk.error.is_some());
        assert!(assembly.reduced_paths.iter().all(|p| p.edge_count() <= 1));
    }

    #[test]
    fn test_rejects_short_kmer_length() {
        let config = AssemblyConfig {
            kmer_length: 1,
            ..AssemblyConfig::default()
        };
        assert!(assemble(&example_reads(), &config).is_err());
    }

    #[test]
    fn test_report_lists_paths() {
        let report = assemble(&example_reads(), &seeded(9)).unwrap().report();
        assert_eq!(report.reads, 5);
        assert_eq!(report.kmers, 6);
        assert_eq!(report.reduced_graph.edges, 1);
        assert_eq!(report.reduced_paths[0].sequence, "ACGCGTCG");
        let text = report.to_string();
        assert!(text.starts_with("Eulerian Walk: "));
        assert!(text.contains("Read Path 0 Nodes: AC CG GC"));
        assert!(text.contains("Reduced Read Path Set"));
        assert!(text.contains("Contigs: ACGCGTCG"));
    }
}
