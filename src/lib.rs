pub mod dbgrush;
pub mod error;
pub mod euler;
pub mod graph;
pub mod kmer;
pub mod read_path;
pub mod reduce;
pub mod report;
pub mod seq_io;

pub use dbgrush::{assemble, run_dbgrush, Args, Assembly, AssemblyConfig};
pub use error::{AssemblyError, Result};
pub use euler::{assemble_walk, ContinuationGuard, EulerianPathFinder, EulerianWalk};
pub use graph::{Edge, Graph, Node};
pub use read_path::{PathSet, ReadPath, XyDetachment};
pub use reduce::{reduce_paths, PathReducer, ReduceOptions, ReduceOutcome};
pub use report::AssemblyReport;
pub use seq_io::{load_reads, parse_reads, reverse_complement, SequenceRecord};
