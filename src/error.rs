use std::path::PathBuf;
use thiserror::Error;

/// 生成编译数据库过程中可能出现的错误
#[derive(Error, Debug)]
pub enum CdbError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk project tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Source file limit must be at least 1")]
    ZeroFileLimit,

    #[error("Failed to serialize compilation database: {0}")]
    Json(#[from] serde_json::Error),
}

impl CdbError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CdbError::Io {
            path: path.into(),
            source,
        }
    }
}
