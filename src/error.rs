//! Error types for Canopy
//!
//! Every variant carries a short, stable code (see [`CanopyError::code`]) that
//! becomes the `error` field of a failure envelope. The `Display` text becomes
//! its `message`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ports::EngineError;

/// Result type alias for Canopy operations
pub type CanopyResult<T> = Result<T, CanopyError>;

/// Which half of the invocation contract failed to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    Inputs,
    Params,
}

impl std::fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgumentKind::Inputs => write!(f, "inputs"),
            ArgumentKind::Params => write!(f, "params"),
        }
    }
}

/// Main error type for Canopy operations
#[derive(Error, Debug)]
pub enum CanopyError {
    /// Malformed invocation (wrong argument count, unknown primitive)
    #[error("{message}")]
    Usage { message: String },

    /// `inputs` or `params` is neither a JSON file nor inline JSON
    #[error("could not parse {which} as a JSON file or inline JSON: {message}")]
    ArgumentParse { which: ArgumentKind, message: String },

    /// Required input missing from the inputs mapping
    #[error("required input '{name}' was not supplied")]
    MissingInput { name: String },

    /// Input named a path that does not exist
    #[error("input '{name}' points to a missing file: {path}")]
    InputNotFound { name: String, path: PathBuf },

    /// A parameter was present but had the wrong shape
    #[error("invalid parameter '{name}': {message}")]
    InvalidParam { name: String, message: String },

    /// Reading or writing an artifact failed
    #[error("could not {operation} {path}: {message}")]
    ExternalIo {
        operation: &'static str,
        path: PathBuf,
        message: String,
    },

    /// The engine refused or failed an in-memory operation
    #[error("geospatial engine error: {0}")]
    Engine(EngineError),

    /// A critical domain condition (disjoint extents, undefined CRS, ...)
    #[error("{message}")]
    Validation { message: String },

    /// An artifact of the wrong kind reached a kind-specific operation
    #[error("expected a {expected} artifact, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Ledger entry with an unknown severity
    #[error("invalid warning level '{level}' (expected info, warning or critical)")]
    InvalidLevel { level: String },

    /// Overlap relative to a zero-area first extent is undefined
    #[error("first extent is degenerate (zero area) and not contained in the second extent")]
    DegenerateExtent,

    /// Metadata could not be turned into JSON
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A primitive panicked
    #[error("primitive aborted unexpectedly: {message}")]
    Internal { message: String },
}

impl CanopyError {
    /// Short error code used in failure envelopes
    pub fn code(&self) -> &'static str {
        match self {
            CanopyError::Usage { .. } => "UsageError",
            CanopyError::ArgumentParse { .. } => "ArgumentParseError",
            CanopyError::MissingInput { .. } => "MissingInput",
            CanopyError::InputNotFound { .. } => "InputNotFound",
            CanopyError::InvalidParam { .. } => "InvalidParameter",
            CanopyError::ExternalIo { .. } => "ExternalIOError",
            CanopyError::Engine(_) => "EngineError",
            CanopyError::Validation { .. } => "ValidationFailure",
            CanopyError::TypeMismatch { .. } => "TypeMismatch",
            CanopyError::InvalidLevel { .. } => "InvalidLevel",
            CanopyError::DegenerateExtent => "DegenerateExtentError",
            CanopyError::Serialization(_) => "SerializationError",
            CanopyError::Internal { .. } => "InternalError",
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        CanopyError::Usage {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CanopyError::Validation {
            message: message.into(),
        }
    }
}

impl From<EngineError> for CanopyError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Read { path, message } => CanopyError::ExternalIo {
                operation: "read",
                path,
                message,
            },
            EngineError::Write { path, message } => CanopyError::ExternalIo {
                operation: "write",
                path,
                message,
            },
            other => CanopyError::Engine(other),
        }
    }
}
