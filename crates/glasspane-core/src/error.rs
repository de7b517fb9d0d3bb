//! Error types for glasspane-core.

use thiserror::Error;

/// The main error type for scene-side operations.
#[derive(Error, Debug)]
pub enum GlasspaneError {
    /// Mesh attribute arrays disagree in length.
    #[error("mesh attribute size mismatch: expected {expected}, got {actual} for {attribute}")]
    SizeMismatch {
        /// Name of the offending attribute.
        attribute: &'static str,
        /// Expected element count (from positions).
        expected: usize,
        /// Actual element count.
        actual: usize,
    },

    /// Mesh has no geometry to draw.
    #[error("mesh '{0}' has no vertices or indices")]
    EmptyMesh(String),

    /// A model transform contains NaN or infinity.
    #[error("drawable '{0}' has a non-finite model transform")]
    NonFiniteTransform(String),
}

/// A specialized Result type for glasspane-core operations.
pub type Result<T> = std::result::Result<T, GlasspaneError>;
