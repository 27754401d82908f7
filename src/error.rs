use std::io;
use std::path::PathBuf;

/// Errors raised while reading input or assembling it.
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
    #[error("unsupported base {base:?} at line {line} (only A, C, G, T are accepted)")]
    InvalidBase { line: usize, base: char },
    #[error("k-mer length must be at least 2, got {l}")]
    InvalidKmerLength { l: usize },
    #[error("graph is not semi-Eulerian ({semi_balanced} semi-balanced nodes), no start node")]
    NoStartNode { semi_balanced: usize },
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

impl AssemblyError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AssemblyError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, AssemblyError>;
