use thiserror::Error;

/// Errors that abort a feature finding run.
///
/// Problems with individual targets are not errors: they are logged and reported as
/// [`TargetDiagnostic`](crate::assay::library::TargetDiagnostic)s next to the library.
#[derive(Debug, Error)]
pub enum FinderError {
    /// The detector broke its contract, e.g. by emitting a feature without per-trace extents.
    #[error("Missing information for candidate {candidate}: {reason}")]
    MissingInformation { candidate: String, reason: String },

    #[error("Parse error in line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: &'static str, message: String },

    #[error("Detector failed: {0}")]
    Detector(String),

    #[error("Unsupported candidate file version {found} (expected {expected})")]
    FileVersion { found: u32, expected: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FinderError>;
