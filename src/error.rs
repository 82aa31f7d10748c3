//! Error types for nvbridge
//!
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Errors from the NVML bridge layers
#[derive(Error, Debug)]
pub enum NvmlError {
    /// NVML shared library could not be loaded
    #[error("NVML library not found. Is the NVIDIA driver installed?")]
    LibraryNotFound,

    /// nvmlInit_v2 (or nvmlShutdown) returned a non-success status
    #[error("Failed to initialize NVML: {0}")]
    InitializationFailed(String),

    /// Requested accessor symbol is not exported by the loaded library
    #[error("NVML symbol not available: {0}")]
    SymbolNotFound(String),

    /// The wrapped accessor returned any status other than NVML_SUCCESS.
    /// The bridge does not classify why; callers wanting diagnosis must
    /// query NVML themselves.
    #[error("NVML accessor returned a non-success status")]
    UnderlyingCallFailed,

    /// A text property call succeeded but wrote an empty string
    #[error("Text property returned an empty string")]
    EmptyProperty,
}

/// Result type alias using NvmlError
pub type Result<T> = std::result::Result<T, NvmlError>;
