use crate::error::{AssemblyError, Result};
use rayon::prelude::*;
use std::fs;
use std::path::Path;

/// A named read as it appears in the input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub id: String,
    pub seq: String,
}

/// Load every read from a FASTQ or FASTA file.
///
/// The format is chosen from the first non-empty line (`@` for FASTQ, `>` for FASTA).
/// Bases are upper-cased and anything outside `ACGT` is rejected.
pub fn load_reads(path: impl AsRef<Path>) -> Result<Vec<SequenceRecord>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| AssemblyError::io(path, e))?;
    parse_reads(&contents)
}

/// Parse reads from an in-memory FASTQ or FASTA document.
pub fn parse_reads(contents: &str) -> Result<Vec<SequenceRecord>> {
    let first = contents
        .lines()
        .enumerate()
        .find(|(_, line)| !line.trim().is_empty());
    match first {
        None => Ok(Vec::new()),
        Some((_, line)) if line.trim_start().starts_with('@') => parse_fastq(contents),
        Some((_, line)) if line.trim_start().starts_with('>') => parse_fasta(contents),
        Some((idx, line)) => Err(AssemblyError::MalformedRecord {
            line: idx + 1,
            reason: format!("expected '@' or '>' header, found {:?}", line.trim()),
        }),
    }
}

fn parse_fastq(contents: &str) -> Result<Vec<SequenceRecord>> {
    let mut records = Vec::new();
    let mut lines = contents
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()));

    while let Some((header_line, header)) = lines.next() {
        if header.is_empty() {
            continue;
        }
        let id = header
            .strip_prefix('@')
            .ok_or_else(|| AssemblyError::MalformedRecord {
                line: header_line,
                reason: format!("expected '@' header, found {:?}", header),
            })?
            .to_string();

        let mut seq = String::new();
        let mut separated = false;
        for (line_no, line) in lines.by_ref() {
            if line.starts_with('+') {
                separated = true;
                break;
            }
            push_bases(&mut seq, line, line_no)?;
        }
        if !separated {
            return Err(AssemblyError::MalformedRecord {
                line: header_line,
                reason: format!("record {:?} has no '+' separator", id),
            });
        }

        // Quality may wrap like the sequence does; consume lines until lengths agree.
        let mut quality_len = 0;
        while quality_len < seq.len() {
            match lines.next() {
                Some((_, quality)) => quality_len += quality.len(),
                None => {
                    return Err(AssemblyError::MalformedRecord {
                        line: header_line,
                        reason: format!("record {:?} is truncated before its quality ends", id),
                    })
                }
            }
        }
        if quality_len != seq.len() {
            return Err(AssemblyError::MalformedRecord {
                line: header_line,
                reason: format!(
                    "record {:?} has {} bases but {} quality values",
                    id,
                    seq.len(),
                    quality_len
                ),
            });
        }

        records.push(SequenceRecord { id, seq });
    }
    Ok(records)
}

fn parse_fasta(contents: &str) -> Result<Vec<SequenceRecord>> {
    let mut records = Vec::new();
    let mut current: Option<SequenceRecord> = None;
    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(id) = line.strip_prefix('>') {
            if let Some(record) = current.take() {
                records.push(record);
            }
            current = Some(SequenceRecord {
                id: id.to_string(),
                seq: String::new(),
            });
        } else {
            let record = current.as_mut().ok_or_else(|| AssemblyError::MalformedRecord {
                line: idx + 1,
                reason: "sequence data before the first '>' header".to_string(),
            })?;
            push_bases(&mut record.seq, line, idx + 1)?;
        }
    }
    records.extend(current);
    Ok(records)
}

fn push_bases(seq: &mut String, line: &str, line_no: usize) -> Result<()> {
    for base in line.chars() {
        let upper = base.to_ascii_uppercase();
        match upper {
            'A' | 'C' | 'G' | 'T' => seq.push(upper),
            _ => return Err(AssemblyError::InvalidBase { line: line_no, base }),
        }
    }
    Ok(())
}

/// Compute the reverse complement of a DNA sequence
pub fn reverse_complement(seq: &str) -> String {
    seq.chars()
        .rev()
        .map(|base| match base {
            'A' => 'T',
            'T' => 'A',
            'C' => 'G',
            'G' => 'C',
            _ => base,
        })
        .collect()
}

/// Reverse complement every read, keeping read order.
pub fn reverse_complements(reads: &[String]) -> Vec<String> {
    reads.par_iter().map(|read| reverse_complement(read)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement("ACTG"), "CAGT");
        assert_eq!(reverse_complement("ATACGC"), "GCGTAT");
        assert_eq!(reverse_complement("ACGTGCA"), "TGCACGT");
        assert_eq!(reverse_complement(""), "");
    }

    #[test]
    fn test_reverse_complement_involution() {
        for seq in ["A", "ACGCGTCG", "GGGTTTAAACCC", "TGCACGTATACGC"] {
            assert_eq!(reverse_complement(&reverse_complement(seq)), seq);
        }
    }

    #[test]
    fn test_reverse_complements_keep_order() {
        let reads = vec!["AAC".to_string(), "GTT".to_string(), "CGA".to_string()];
        assert_eq!(reverse_complements(&reads), vec!["GTT", "AAC", "TCG"]);
    }

    #[test]
    fn test_parse_fastq_records() {
        let input = "@r1\nACGC\n+\nIIII\n@r2\nGCG\nTC\n+r2\nIII\nII\n";
        let reads = parse_reads(input).unwrap();
        assert_eq!(reads.len(), 2);
        assert_eq!(reads[0].id, "r1");
        assert_eq!(reads[0].seq, "ACGC");
        assert_eq!(reads[1].seq, "GCGTC");
    }

    #[test]
    fn test_parse_fastq_quality_starting_with_at() {
        let input = "@r1\nACG\n+\n@II\n@r2\nTTT\n+\nIII\n";
        let reads = parse_reads(input).unwrap();
        assert_eq!(reads.len(), 2);
        assert_eq!(reads[1].id, "r2");
    }

    #[test]
    fn test_parse_fastq_lowercase_and_crlf() {
        let reads = parse_reads("@r\r\nacgt\r\n+\r\nIIII\r\n").unwrap();
        assert_eq!(reads[0].seq, "ACGT");
    }

    #[test]
    fn test_parse_fastq_truncated() {
        let err = parse_reads("@r1\nACGT\n+\nII\n").unwrap_err();
        assert!(matches!(err, AssemblyError::MalformedRecord { line: 1, .. }));
    }

    #[test]
    fn test_parse_fastq_missing_separator() {
        let err = parse_reads("@r1\nACGT\n").unwrap_err();
        assert!(matches!(err, AssemblyError::MalformedRecord { .. }));
    }

    #[test]
    fn test_parse_rejects_non_acgt() {
        let err = parse_reads("@r1\nACNT\n+\nIIII\n").unwrap_err();
        assert!(matches!(err, AssemblyError::InvalidBase { line: 2, base: 'N' }));
    }

    #[test]
    fn test_parse_fasta_multiline() {
        let reads = parse_reads(">a\nACG\nTGA\n>b\n\nTTTT\n").unwrap();
        assert_eq!(reads.len(), 2);
        assert_eq!(reads[0].seq, "ACGTGA");
        assert_eq!(reads[1].id, "b");
    }

    #[test]
    fn test_parse_fasta_data_before_header() {
        let err = parse_reads("ACGT\n>a\nACGT\n").unwrap_err();
        assert!(matches!(err, AssemblyError::MalformedRecord { line: 1, .. }));
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_reads("").unwrap().is_empty());
        assert!(parse_reads("\n\n").unwrap().is_empty());
    }
}
