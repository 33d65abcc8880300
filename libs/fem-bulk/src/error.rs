//! # Bulk Data Errors
//!
//! Error types for field encoding and card writing.

use fem_mesh::{ElementId, ElementType, MeshError, PropertyId};
use glam::DVec3;
use thiserror::Error;

/// Result alias for bulk-data operations.
pub type BulkResult<T> = Result<T, BulkError>;

/// Errors that can occur while encoding fields or writing cards.
#[derive(Debug, Error)]
pub enum BulkError {
    /// Encoded real did not come out at exactly one field width
    #[error("Encoding {value} produced {field:?} ({} characters)", field.len())]
    EncodingLength { value: f64, field: String },

    /// NaN or infinite real
    #[error("Cannot encode non-finite value {value}")]
    NonFiniteValue { value: f64 },

    /// Identifier or keyword wider than one field
    #[error("Field overflow: {text:?} does not fit in {width} characters")]
    FieldOverflow { text: String, width: usize },

    /// Element with no card in this writer
    #[error("Unsupported element type {element_type:?} on element {element}")]
    UnsupportedElementType {
        element: ElementId,
        element_type: ElementType,
    },

    /// Property shared by elements of different dimensions
    #[error("Property {property} is used by elements of more than one dimension")]
    MixedPropertyDimension { property: PropertyId },

    /// Card label that does not follow its abridged syntax
    #[error("Invalid label {label:?}: {reason}")]
    InvalidLabel { label: String, reason: String },

    /// No node inside the selection sphere
    #[error("No nodes within {radius} of {center}")]
    EmptySelection { center: DVec3, radius: f64 },

    /// Mesh stage error
    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    /// Output could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BulkError {
    /// Creates an invalid label error.
    pub fn invalid_label(label: &str, reason: impl Into<String>) -> Self {
        Self::InvalidLabel {
            label: label.to_string(),
            reason: reason.into(),
        }
    }
}
