use crate::error::{AssemblyError, Result};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Smallest window length that still yields a node label of at least one base.
pub const MIN_KMER_LENGTH: usize = 2;

pub fn check_kmer_length(l: usize) -> Result<()> {
    if l < MIN_KMER_LENGTH {
        return Err(AssemblyError::InvalidKmerLength { l });
    }
    Ok(())
}

/// Distinct length-`l` windows of a read, in order of first occurrence.
pub fn read_kmers(read: &str, l: usize) -> Vec<String> {
    if l == 0 || read.len() < l {
        return Vec::new();
    }
    let mut seen = HashSet::new();
    (0..=read.len() - l)
        .map(|i| &read[i..i + l])
        .filter(|kmer| seen.insert(*kmer))
        .map(str::to_string)
        .collect()
}

/// Distinct k-mers over a whole read set, in order of first occurrence.
///
/// Per-read extraction runs on the rayon pool; the merge is sequential so the
/// output order only depends on the input order.
pub fn sample_kmers(reads: &[String], l: usize) -> Vec<String> {
    let per_read: Vec<Vec<String>> = reads.par_iter().map(|read| read_kmers(read, l)).collect();

    let mut seen = HashSet::new();
    let mut kmers = Vec::new();
    for kmer in per_read.into_iter().flatten() {
        if seen.insert(kmer.clone()) {
            kmers.push(kmer);
        }
    }
    kmers
}

/// Write one k-mer per line.
pub fn save_kmers(kmers: &[String], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| AssemblyError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    for kmer in kmers {
        writeln!(writer, "{}", kmer).map_err(|e| AssemblyError::io(path, e))?;
    }
    writer.flush().map_err(|e| AssemblyError::io(path, e))?;
    Ok(())
}
