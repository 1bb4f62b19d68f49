/// Result alias used throughout the crate.
pub type LoopResult<T> = Result<T, LoopError>;

/// Errors raised by loading, configuration and export.
///
/// Rendering itself never fails: presets are total over their numeric domain.
#[derive(thiserror::Error, Debug)]
pub enum LoopError {
    /// Invalid configuration or misuse of an API contract.
    #[error("validation error: {0}")]
    Validation(String),

    /// The supplied image could not be decoded.
    #[error("input error: {0}")]
    Input(String),

    /// No encoder or codec usable for the requested export.
    #[error("unsupported capability: {0}")]
    Unsupported(String),

    /// An export was requested while another one is still running.
    #[error("export rejected: an export is already in progress")]
    ExportBusy,

    /// The encoder failed while writing or finalizing output.
    #[error("encode error: {0}")]
    Encode(String),

    /// Any other error, usually IO with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LoopError {
    /// Build a [`LoopError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LoopError::Input`].
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Build a [`LoopError::Unsupported`].
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Build a [`LoopError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
