//! Error types for panel-method analysis.
//!
//! Every failure in the pipeline is a deterministic mathematical or input
//! failure, so nothing here is retried: errors propagate to the caller of
//! [`crate::analyze`] unchanged.

use thiserror::Error;

/// What made a boundary point sequence unusable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryDefect {
    /// Fewer points than the method needs.
    #[error("{points} boundary points supplied, at least {required} required")]
    TooFewPoints {
        /// Points supplied
        points: usize,
        /// Minimum accepted
        required: usize,
    },

    /// Two consecutive points coincide.
    #[error("panel {index} has zero length ({length:e})")]
    ZeroLengthPanel {
        /// Panel index in the supplied ordering
        index: usize,
        /// Measured length
        length: f64,
    },

    /// A coordinate is NaN or infinite.
    #[error("boundary point {index} is not finite")]
    NonFinitePoint {
        /// Point index
        index: usize,
    },

    /// The configured panel count disagrees with the point sequence.
    #[error("expected {expected} panels but {points} points describe {actual}")]
    PanelCountMismatch {
        /// Configured panel count
        expected: usize,
        /// Points supplied
        points: usize,
        /// Panels implied by the points
        actual: usize,
    },
}

/// Errors raised by geometry preprocessing, assembly, solve and I/O.
#[derive(Debug, Error)]
pub enum PanelError {
    /// The boundary cannot be discretised into valid panels.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(#[from] GeometryDefect),

    /// The closed linear system has no usable LU factorisation.
    #[error("singular system after closure `{closure}` (pivot ratio {pivot_ratio:e})")]
    SingularSystem {
        /// Closure policy that was applied before factorising
        closure: String,
        /// Smallest over largest |U_ii|
        pivot_ratio: f64,
    },

    /// An analysis parameter is out of range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// A coordinate record could not be parsed.
    #[error("malformed coordinate record at line {line}: {reason}")]
    MalformedRecord {
        /// 1-based line number
        line: usize,
        /// Parse failure
        reason: String,
    },

    /// Underlying file error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Configuration or summary (de)serialisation error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for panel-method operations.
pub type Result<T> = std::result::Result<T, PanelError>;

impl PanelError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        PanelError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Returns `true` if the input geometry was rejected.
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, PanelError::DegenerateGeometry(_))
    }

    /// Returns `true` if the linear solve failed.
    pub fn is_singular(&self) -> bool {
        matches!(self, PanelError::SingularSystem { .. })
    }

    /// Returns `true` if an analysis parameter was rejected.
    pub fn is_parameter_error(&self) -> bool {
        matches!(self, PanelError::InvalidParameter { .. })
    }
}
