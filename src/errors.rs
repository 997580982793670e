use thiserror::Error;

/// Errors surfaced by processors and pipelines.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// A processor was handed input its contract rejects, e.g. `Join`
    /// over non-text elements or a malformed query path.
    #[error("usage error: {0}")]
    Usage(String),

    /// A caller-supplied stage failed. Pipelines propagate this
    /// unchanged; there is no retry and no partial result.
    #[error("stage failed: {0}")]
    Stage(String),
}

impl ProcessError {
    pub fn usage(msg: impl Into<String>) -> Self {
        ProcessError::Usage(msg.into())
    }

    pub fn stage(err: impl std::fmt::Display) -> Self {
        ProcessError::Stage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProcessError>;
