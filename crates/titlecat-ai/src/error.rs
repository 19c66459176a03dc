use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("artifact not found: {0}")]
    NotFound(PathBuf),

    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("invalid classifier artifact: {0}")]
    Artifact(String),

    #[error("classifier json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("embedding table is empty")]
    EmptyVocabulary,

    #[error("classifier has no classes")]
    NoClasses,

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("tokenize: {0}")]
    Tokenize(String),

    #[error("unsupported classifier artifact: {0}")]
    Unsupported(String),

    #[cfg(feature = "onnx")]
    #[error("onnx runtime: {0}")]
    Onnx(#[from] ort::Error),

    #[error("{0}")]
    Other(String),
}

impl ModelError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Io { path, source }
        }
    }
}
