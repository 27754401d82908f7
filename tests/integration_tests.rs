use dbgrush::{load_reads, run_dbgrush, Args, AssemblyError};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

const EXAMPLE_FASTQ: &str = "\
@r1
ACGC
+
IIII
@r2
GCGTC
+
IIIII
@r3
CGCGT
+
IIIII
@r4
GCGTCG
+
IIIIII
@r5
ACGCGT
+
IIIIII
";

fn temp_file() -> NamedTempFile {
    NamedTempFile::new().unwrap()
}

fn write_input(contents: &str) -> NamedTempFile {
    let mut file = temp_file();
    write!(file, "{}", contents).unwrap();
    file.as_file_mut().sync_all().unwrap();
    file
}

fn args_for(reads: PathBuf) -> Args {
    Args {
        reads,
        kmer_length: 3,
        seed: Some(7),
        threads: 1,
        node_degree_guard: false,
        max_iterations: None,
        kmers_out: None,
        json: None,
        verbose: false,
    }
}

#[test]
fn load_reads_parses_fastq() {
    let file = write_input(EXAMPLE_FASTQ);
    let reads = load_reads(file.path()).unwrap();
    assert_eq!(reads.len(), 5);
    assert_eq!(reads[0].id, "r1");
    assert_eq!(reads[3].seq, "GCGTCG");
}

#[test]
fn run_dbgrush_reduces_example_reads() {
    let file = write_input(EXAMPLE_FASTQ);
    let report = run_dbgrush(&args_for(file.path().to_path_buf())).unwrap();

    assert_eq!(report.reads, 5);
    assert_eq!(report.kmers, 6);
    assert_eq!(report.forward_graph.nodes, 5);
    assert_eq!(report.forward_graph.edges, 6);
    assert!(report.forward_walk.eulerian);
    assert_eq!(report.original_paths[1].nodes, vec!["GC", "CG", "GT", "TC"]);
    for path in &report.reduced_paths {
        assert_eq!(path.nodes, vec!["AC", "CG"]);
        assert_eq!(path.sequence, "ACGCGTCG");
    }
    assert_eq!(report.contigs, vec!["ACGCGTCG"]);
    assert_eq!(report.reduction.merges, 5);
}

#[test]
fn run_dbgrush_accepts_fasta() {
    let file = write_input(">a\nACGC\n>b\nGCGTC\n>c\nCGCGT\n>d\nGCG\nTCG\n>e\nacgcgt\n");
    let report = run_dbgrush(&args_for(file.path().to_path_buf())).unwrap();
    assert_eq!(report.reads, 5);
    assert_eq!(report.contigs, vec!["ACGCGTCG"]);
}

#[test]
fn run_dbgrush_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_dbgrush(&args_for(dir.path().join("absent.fq"))).unwrap_err();
    assert!(matches!(err, AssemblyError::Io { .. }));
}

#[test]
fn run_dbgrush_rejects_truncated_fastq() {
    let file = write_input("@r1\nACGT\n+\nII\n");
    let err = run_dbgrush(&args_for(file.path().to_path_buf())).unwrap_err();
    assert!(matches!(err, AssemblyError::MalformedRecord { .. }));
}

#[test]
fn run_dbgrush_rejects_ambiguous_bases() {
    let file = write_input(">a\nACNGT\n");
    let err = run_dbgrush(&args_for(file.path().to_path_buf())).unwrap_err();
    assert!(matches!(err, AssemblyError::InvalidBase { line: 2, base: 'N' }));
}

#[test]
fn run_dbgrush_rejects_short_kmer_length() {
    let file = write_input(EXAMPLE_FASTQ);
    let mut args = args_for(file.path().to_path_buf());
    args.kmer_length = 1;
    let err = run_dbgrush(&args).unwrap_err();
    assert!(matches!(err, AssemblyError::InvalidKmerLength { l: 1 }));
}

#[test]
fn run_dbgrush_writes_kmers_and_json() {
    let file = write_input(EXAMPLE_FASTQ);
    let kmers_out = temp_file();
    let json_out = temp_file();
    let mut args = args_for(file.path().to_path_buf());
    args.kmers_out = Some(kmers_out.path().to_path_buf());
    args.json = Some(json_out.path().to_path_buf());

    run_dbgrush(&args).unwrap();

    let kmers = fs::read_to_string(kmers_out.path()).unwrap();
    let lines: Vec<_> = kmers.lines().collect();
    assert_eq!(lines, vec!["ACG", "CGC", "GCG", "CGT", "GTC", "TCG"]);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(json_out.path()).unwrap()).unwrap();
    assert_eq!(json["kmer_length"], 3);
    assert_eq!(json["contigs"][0], "ACGCGTCG");
    assert_eq!(json["reduced_graph"]["edges"], 1);
    assert_eq!(json["reduction"]["capped"], false);
}

#[test]
fn run_dbgrush_same_seed_same_walk() {
    let file = write_input(EXAMPLE_FASTQ);
    let args = args_for(file.path().to_path_buf());
    let first = run_dbgrush(&args).unwrap();
    let second = run_dbgrush(&args).unwrap();
    assert_eq!(first.forward_walk, second.forward_walk);
    assert_eq!(first.reverse_walk, second.reverse_walk);
}

#[test]
fn run_dbgrush_node_degree_guard() {
    let file = write_input(EXAMPLE_FASTQ);
    let mut args = args_for(file.path().to_path_buf());
    args.node_degree_guard = true;
    let report = run_dbgrush(&args).unwrap();
    let walk = report.forward_walk.sequence.unwrap();
    assert!(walk == "ACGCGTCG" || walk == "ACGTCGCG", "unexpected walk {}", walk);
}

#[test]
fn run_dbgrush_iteration_cap() {
    let file = write_input(EXAMPLE_FASTQ);
    let mut args = args_for(file.path().to_path_buf());
    args.max_iterations = Some(2);
    let report = run_dbgrush(&args).unwrap();
    assert!(report.reduction.capped);
    assert_eq!(report.reduction.iterations, 2);
    assert!(report.reduced_paths.iter().any(|p| p.nodes.len() > 2));
}

#[test]
fn run_dbgrush_empty_input() {
    let file = write_input("");
    let report = run_dbgrush(&args_for(file.path().to_path_buf())).unwrap();
    assert_eq!(report.reads, 0);
    assert!(report.forward_walk.sequence.is_none());
    assert!(report.contigs.is_empty());
}
