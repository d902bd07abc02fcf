//! Error types for ctxcat.

use std::path::PathBuf;

use crate::decode::DecodeError;
use crate::emitter::EmitError;
use crate::walker::WalkError;

/// Top-level error type for bundle runs.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("input directory not found: {0}")]
    RootNotFound(PathBuf),

    #[error("input path is not a directory: {0}")]
    RootNotADirectory(PathBuf),

    #[error("cannot open output file {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("walk error: {0}")]
    Walk(#[from] WalkError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("emit error: {0}")]
    Emit(#[from] EmitError),
}

/// Map an error to its exit code.
pub fn exit_code(error: &BundleError) -> i32 {
    match error {
        BundleError::RootNotFound(_) => 3,
        BundleError::RootNotADirectory(_) => 3,
        BundleError::Output { .. } => 4,
        BundleError::Io(_) => 1,
        BundleError::Walk(_) => 2,
        BundleError::Decode(_) => 1,
        BundleError::Emit(_) => 1,
    }
}
