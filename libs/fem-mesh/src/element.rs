//! # Element Types
//!
//! Element shapes known to the pipeline, their topological dimension and the
//! host's integer type codes.

use crate::error::{MeshError, MeshResult};
use crate::ids::{ElementId, NodeId, PropertyId};
use serde::{Deserialize, Serialize};

/// Topological dimension of an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Point,
    Line,
    Surface,
    Volume,
}

impl Dimension {
    /// Dimension for a host element-type code, if the code is known.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fem_mesh::Dimension;
    ///
    /// assert_eq!(Dimension::from_code(15), Some(Dimension::Surface));
    /// assert_eq!(Dimension::from_code(7), Some(Dimension::Volume));
    /// assert_eq!(Dimension::from_code(99), None);
    /// ```
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1..=6 | 13 | 17 => Some(Self::Line),
            8..=12 => Some(Self::Point),
            15 | 16 | 18 | 20 | 21 => Some(Self::Surface),
            7 | 14 | 19 => Some(Self::Volume),
            _ => None,
        }
    }
}

/// Element shapes with their corner counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Bar2,
    Tria3,
    Quad4,
    Tetra10,
    Penta6,
    Hex8,
}

impl ElementType {
    /// Number of nodes in the connectivity list.
    pub fn node_count(self) -> usize {
        match self {
            Self::Bar2 => 2,
            Self::Tria3 => 3,
            Self::Quad4 => 4,
            Self::Penta6 => 6,
            Self::Hex8 => 8,
            Self::Tetra10 => 10,
        }
    }

    /// Topological dimension.
    pub fn dimension(self) -> Dimension {
        match self {
            Self::Bar2 => Dimension::Line,
            Self::Tria3 | Self::Quad4 => Dimension::Surface,
            Self::Tetra10 | Self::Penta6 | Self::Hex8 => Dimension::Volume,
        }
    }

    /// Host element-type code.
    pub fn code(self) -> u32 {
        match self {
            Self::Bar2 => 1,
            Self::Hex8 => 7,
            Self::Penta6 => 14,
            Self::Quad4 => 15,
            Self::Tetra10 => 19,
            Self::Tria3 => 20,
        }
    }

    /// Resolves a host element-type code and node count.
    ///
    /// Codes describe a family (a 3D code 19 covers both 4 and 10 node
    /// tetrahedra); the node count picks the variant. Unknown pairs fail with
    /// [`MeshError::UnsupportedElementCode`].
    pub fn from_code(element: ElementId, code: u32, nodes: usize) -> MeshResult<Self> {
        let kind = match (code, nodes) {
            (1, 2) => Some(Self::Bar2),
            (7, 8) => Some(Self::Hex8),
            (14, 6) => Some(Self::Penta6),
            (15, 4) => Some(Self::Quad4),
            (19, 10) => Some(Self::Tetra10),
            (20, 3) => Some(Self::Tria3),
            _ => None,
        };
        kind.ok_or(MeshError::UnsupportedElementCode {
            element,
            code,
            nodes,
        })
    }
}

/// One element: its shape, ordered connectivity and property.
///
/// Connectivity order defines face and volume orientation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub kind: ElementType,
    pub nodes: Vec<NodeId>,
    pub property: PropertyId,
}

impl Element {
    /// Creates an element, checking the connectivity length against the type.
    pub fn new(
        id: ElementId,
        kind: ElementType,
        nodes: Vec<NodeId>,
        property: PropertyId,
    ) -> MeshResult<Self> {
        if nodes.len() != kind.node_count() {
            return Err(MeshError::invalid_fragment(format!(
                "element {id} of type {kind:?} has {} nodes, expected {}",
                nodes.len(),
                kind.node_count()
            )));
        }
        Ok(Self {
            kind,
            nodes,
            property,
        })
    }

    /// Four-node quad on `property`.
    pub fn quad(nodes: [NodeId; 4], property: PropertyId) -> Self {
        Self {
            kind: ElementType::Quad4,
            nodes: nodes.to_vec(),
            property,
        }
    }

    /// Eight-node hexahedron on `property`.
    pub fn hex(nodes: [NodeId; 8], property: PropertyId) -> Self {
        Self {
            kind: ElementType::Hex8,
            nodes: nodes.to_vec(),
            property,
        }
    }

    /// Returns true when two connectivity slots hold the same node.
    pub fn has_repeated_node(&self) -> bool {
        self.nodes
            .iter()
            .enumerate()
            .any(|(i, node)| self.nodes[i + 1..].contains(node))
    }
}
