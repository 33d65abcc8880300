//! # Mesh Errors
//!
//! Error types for mesh construction and transformation. Every variant names
//! the offending identifier so callers can locate the bad input.

use crate::element::ElementType;
use crate::ids::{ElementId, NodeId, PropertyId};
use thiserror::Error;

/// Result alias for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors that can occur while building or transforming mesh fragments.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Two point sequences that must pair up have different lengths
    #[error("Curve sample mismatch: {first} points against {second}")]
    CurveSampleMismatch { first: usize, second: usize },

    /// Element normal has zero magnitude
    #[error("Degenerate element {element}: corner cross products sum to zero")]
    DegenerateElement { element: ElementId },

    /// Incident element normals cancel at a node
    #[error("Misaligned normals at node {node}: incident element normals cancel")]
    MisalignedNormals { node: NodeId },

    /// Fragment uses more than one property
    #[error("Fragment {fragment} uses {count} properties, expected exactly one")]
    MultiProperty { fragment: usize, count: usize },

    /// Fragment property maps to more than one material
    #[error("Fragment {fragment} uses {count} materials, expected exactly one")]
    MultiMaterial { fragment: usize, count: usize },

    /// Equivalencing would merge geometry inside one fragment
    #[error("Tolerance {tolerance} collapses geometry in fragment {fragment}: {detail}")]
    ToleranceCollapse {
        fragment: usize,
        tolerance: f64,
        detail: String,
    },

    /// Node replacement would make two corners of an element coincide
    #[error("Element {element} would collapse: nodes {kept} and {replaced} are both corners")]
    ElementCollapse {
        element: ElementId,
        kept: NodeId,
        replaced: NodeId,
    },

    /// Element type not handled by the requesting stage
    #[error("Unsupported element type {element_type:?} on element {element} in {stage}")]
    UnsupportedElementType {
        element: ElementId,
        element_type: ElementType,
        stage: &'static str,
    },

    /// Element type code with no mesh representation
    #[error("Unsupported element code {code} with {nodes} nodes on element {element}")]
    UnsupportedElementCode {
        element: ElementId,
        code: u32,
        nodes: usize,
    },

    /// Element references a node that does not exist
    #[error("Element {element} references missing node {node}")]
    MissingNode { element: ElementId, node: NodeId },

    /// Element references a property that does not exist
    #[error("Element {element} references missing property {property}")]
    MissingProperty {
        element: ElementId,
        property: PropertyId,
    },

    /// Fragment failed structural validation
    #[error("Invalid fragment: {message}")]
    InvalidFragment { message: String },

    /// Parameter outside the accepted range
    #[error("Invalid parameter {name}: {message}")]
    InvalidParameter { name: &'static str, message: String },

    /// Operation needs at least one input
    #[error("Empty input: {message}")]
    EmptyInput { message: String },

    /// Identifier arithmetic overflowed the 32-bit ID space
    #[error("Identifier overflow while {message}")]
    IdOverflow { message: String },

    /// Fragment interchange document could not be parsed
    #[error("Fragment JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MeshError {
    /// Creates an invalid fragment error.
    pub fn invalid_fragment(message: impl Into<String>) -> Self {
        Self::InvalidFragment {
            message: message.into(),
        }
    }

    /// Creates an invalid parameter error.
    pub fn invalid_parameter(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }

    /// Creates an empty input error.
    pub fn empty_input(message: impl Into<String>) -> Self {
        Self::EmptyInput {
            message: message.into(),
        }
    }

    /// Creates an identifier overflow error.
    pub fn id_overflow(message: impl Into<String>) -> Self {
        Self::IdOverflow {
            message: message.into(),
        }
    }

    /// Creates an unsupported element type error for `stage`.
    pub fn unsupported(element: ElementId, element_type: ElementType, stage: &'static str) -> Self {
        Self::UnsupportedElementType {
            element,
            element_type,
            stage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_offending_id() {
        let err = MeshError::DegenerateElement {
            element: ElementId::new(42),
        };
        assert!(err.to_string().contains("42"));

        let err = MeshError::ElementCollapse {
            element: ElementId::new(7),
            kept: NodeId::new(1),
            replaced: NodeId::new(2),
        };
        let message = err.to_string();
        assert!(message.contains('7'));
        assert!(message.contains("collapse"));
    }

    #[test]
    fn test_helper_constructors() {
        let err = MeshError::invalid_parameter("ny", "must be at least 1");
        assert!(matches!(err, MeshError::InvalidParameter { name: "ny", .. }));

        let err = MeshError::unsupported(ElementId::new(3), ElementType::Tria3, "thicken");
        assert!(err.to_string().contains("thicken"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MeshError>();
    }
}
