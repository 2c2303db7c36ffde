//! Crater generation error types.

use thiserror::Error;

/// Errors returned by crater generation and parameter resolution.
///
/// Both variants are raised before any mesh is handed back: callers never
/// receive partially built geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CraterError {
    /// A parameter is out of range or inconsistent with another parameter.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Field name as it appears in [`crate::CraterParameters`] or
        /// [`crate::GeneratorSettings`].
        name: &'static str,
        /// Human-readable description of the violated constraint.
        reason: String,
    },

    /// The resolved configuration produced no usable faces.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),
}

impl CraterError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
