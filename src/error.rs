//! Error handling for the voxelpipe engine
//!
//! One taxonomy covers the whole engine: path resolution, type and shape
//! checking, dispatch, allocation, parameter handling, and document I/O.
//! Every variant maps to a stable negative code via [`VoxelPipeError::code`];
//! the pipeline driver inspects only the code, the rendered message is
//! user-facing.
//!
//! Errors are plain `Result` values end to end. Expected invalid-input
//! conditions (missing array, wrong type, wrong geometry) never panic.

use crate::store::path::PathSegment;
use crate::types::ScalarType;
use thiserror::Error;

/// Main error type for voxelpipe operations
#[derive(Error, Debug)]
pub enum VoxelPipeError {
    /// A container, matrix, or array segment of a path failed to resolve
    #[error("{segment} '{name}' does not exist")]
    PathNotFound { segment: PathSegment, name: String },

    /// An array exists but holds a different element type than requested
    #[error("array '{name}' holds {actual}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: ScalarType,
        actual: ScalarType,
    },

    /// Tuple or component counts are incompatible
    #[error("array '{name}' has incompatible shape: {detail}")]
    ShapeMismatch { name: String, detail: String },

    /// The element type falls outside the closed numeric dispatch set
    #[error("array '{name}' has element type {scalar_type}, which is not numeric")]
    UnsupportedType { name: String, scalar_type: ScalarType },

    /// Storage for an array could not be allocated
    #[error("failed to allocate {bytes} bytes for array '{name}'")]
    AllocationFailure { name: String, bytes: usize },

    /// A container, matrix, or array with this name already exists
    #[error("{segment} '{name}' already exists")]
    NameCollision { segment: PathSegment, name: String },

    /// An operation required a geometry the container does not have
    #[error("data container '{container}' has no geometry")]
    GeometryMissing { container: String },

    /// A filter parameter is missing, malformed, or of the wrong kind
    #[error("invalid parameter '{name}': {detail}")]
    Parameter { name: String, detail: String },

    /// A called numeric algorithm reported a failure
    #[error("numeric algorithm failed: {0}")]
    External(String),

    /// Execution was canceled by the host
    #[error("execution canceled")]
    Canceled,

    /// No filter with this name is registered
    #[error("unknown filter '{0}'")]
    UnknownFilter(String),

    /// IO errors from document load/save
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors from document encode/decode
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl VoxelPipeError {
    /// Stable negative code for programmatic inspection.
    ///
    /// `0` means "no error" by convention; every failure is negative. The
    /// pipeline driver decides halt/continue from the code alone.
    pub fn code(&self) -> i32 {
        match self {
            VoxelPipeError::PathNotFound { .. } => -100,
            VoxelPipeError::TypeMismatch { .. } => -101,
            VoxelPipeError::ShapeMismatch { .. } => -102,
            VoxelPipeError::UnsupportedType { .. } => -103,
            VoxelPipeError::AllocationFailure { .. } => -104,
            VoxelPipeError::NameCollision { .. } => -105,
            VoxelPipeError::GeometryMissing { .. } => -106,
            VoxelPipeError::Parameter { .. } => -107,
            VoxelPipeError::External(_) => -108,
            VoxelPipeError::Canceled => -109,
            VoxelPipeError::UnknownFilter(_) => -110,
            VoxelPipeError::Io(_) => -111,
            VoxelPipeError::Serialization(_) => -112,
        }
    }

    /// Shorthand for a [`VoxelPipeError::Parameter`] error
    pub fn parameter(name: impl Into<String>, detail: impl Into<String>) -> Self {
        VoxelPipeError::Parameter {
            name: name.into(),
            detail: detail.into(),
        }
    }
}

/// Result type alias for voxelpipe operations
pub type Result<T> = std::result::Result<T, VoxelPipeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VoxelPipeError::PathNotFound {
            segment: PathSegment::Array,
            name: "Confidence".to_string(),
        };
        assert_eq!(err.to_string(), "data array 'Confidence' does not exist");
    }

    #[test]
    fn test_error_codes_are_negative_and_distinct() {
        let errors = [
            VoxelPipeError::PathNotFound {
                segment: PathSegment::Container,
                name: "a".into(),
            },
            VoxelPipeError::TypeMismatch {
                name: "a".into(),
                expected: ScalarType::Float32,
                actual: ScalarType::Uint8,
            },
            VoxelPipeError::ShapeMismatch {
                name: "a".into(),
                detail: "d".into(),
            },
            VoxelPipeError::UnsupportedType {
                name: "a".into(),
                scalar_type: ScalarType::Bool,
            },
            VoxelPipeError::AllocationFailure {
                name: "a".into(),
                bytes: 1,
            },
            VoxelPipeError::NameCollision {
                segment: PathSegment::Array,
                name: "a".into(),
            },
            VoxelPipeError::GeometryMissing {
                container: "a".into(),
            },
            VoxelPipeError::parameter("p", "bad"),
            VoxelPipeError::External("boom".into()),
            VoxelPipeError::Canceled,
            VoxelPipeError::UnknownFilter("f".into()),
        ];
        let mut codes: Vec<i32> = errors.iter().map(|e| e.code()).collect();
        assert!(codes.iter().all(|&c| c < 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
