// None of these ever escape the reader's worker loop; they exist so it
// can log each failure kind distinctly.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum HydrateError {
    #[error("path does not exist: {0}")]
    NotFound(PathBuf),

    #[error("path is not a regular file: {0}")]
    NotRegularFile(PathBuf),

    #[error("short read for {path}: expected {expected} bytes, got {got}")]
    ShortRead {
        path: PathBuf,
        expected: u64,
        got: usize,
    },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
