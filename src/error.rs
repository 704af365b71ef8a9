// ============================================================
// Error Types
// ============================================================
// One error enum for the whole library. The application and
// CLI layers wrap it in anyhow::Error with extra context.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, UtilError>;

#[derive(Debug, Error)]
pub enum UtilError {
    /// Unknown initialization strategy or invalid option value.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A checkpoint exists but cannot be read or applied.
    #[error("cannot load checkpoint '{}': {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    /// A parameter mapping does not line up with the model.
    #[error("parameter mismatch: {0}")]
    Mismatch(String),

    #[error("log file is not open; call open() before writing to the file sink")]
    LogFileNotOpen,

    #[error("shape error: {0}")]
    Shape(String),

    #[error("tensor data error: {0}")]
    Tensor(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl UtilError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Load {
            path:   path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }
}
