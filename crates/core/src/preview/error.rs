use thiserror::Error;

/// Failures surfaced by the code preview tool.
///
/// Every variant renders as its bare message: callers only ever see one
/// human-readable string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreviewError {
    /// A required argument was absent or empty.
    #[error("{0}")]
    MissingArgument(String),

    /// The task directory is outside the sandbox root or its parent is missing.
    #[error("{0}")]
    InvalidPath(String),

    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),

    /// Model call, normalization, or write failed.
    #[error("{0}")]
    GenerationFailed(String),

    #[error("{0}")]
    NotFound(String),
}

impl PreviewError {
    /// Wrap an arbitrary failure raised while generating or writing.
    ///
    /// Errors that already are `GenerationFailed` keep their message as is.
    pub fn generation(err: impl std::fmt::Display) -> Self {
        Self::GenerationFailed(format!("Code generation failed: {err}"))
    }

    /// Re-wrap a failure from the generate pipeline, leaving generation
    /// errors untouched.
    pub fn into_generation(self) -> Self {
        match self {
            Self::GenerationFailed(_) => self,
            other => Self::generation(other),
        }
    }
}
