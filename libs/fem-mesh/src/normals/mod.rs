//! # Normal Field
//!
//! Per-element and per-node unit normals of a quad surface mesh.
//!
//! An element normal is the normalized sum of the cross products of its four
//! consecutive edge pairs, which stays well defined for warped quads. A node
//! normal is the normalized sum of the normals of its incident elements.

use crate::element::ElementType;
use crate::error::{MeshError, MeshResult};
use crate::fragment::MeshFragment;
use crate::ids::{ElementId, NodeId};
use config::constants::NORMAL_EPSILON;
use glam::DVec3;
use std::collections::BTreeMap;

/// Element and node normals of one fragment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalField {
    pub elements: BTreeMap<ElementId, DVec3>,
    pub nodes: BTreeMap<NodeId, DVec3>,
}

impl NormalField {
    /// Computes both normal sets. Fails on the first degenerate element or
    /// cancelling node.
    pub fn compute(fragment: &MeshFragment) -> MeshResult<Self> {
        let elements = element_normals(fragment)?;
        let nodes = node_normals_from(fragment, &elements)?;
        Ok(Self { elements, nodes })
    }
}

/// Unit normal of a quad from its corner positions.
///
/// Returns `None` when the summed cross products vanish.
pub fn quad_normal(corners: [DVec3; 4]) -> Option<DVec3> {
    let edges = [
        corners[1] - corners[0],
        corners[2] - corners[1],
        corners[3] - corners[2],
        corners[0] - corners[3],
    ];
    let sum: DVec3 = (0..4).map(|k| edges[k].cross(edges[(k + 1) % 4])).sum();
    let scale: f64 = edges.iter().map(|e| e.length_squared()).sum();
    if sum.length_squared() <= NORMAL_EPSILON * scale * scale {
        return None;
    }
    Some(sum.normalize())
}

/// Unit normal of one quad element.
pub fn element_normal(fragment: &MeshFragment, id: ElementId) -> MeshResult<DVec3> {
    let element = fragment
        .element(id)
        .ok_or_else(|| MeshError::invalid_fragment(format!("element {id} does not exist")))?;
    if element.kind != ElementType::Quad4 {
        return Err(MeshError::unsupported(id, element.kind, "normal computation"));
    }
    let positions = fragment
        .element_positions(id)
        .ok_or_else(|| MeshError::invalid_fragment(format!("element {id} has missing nodes")))?;
    let corners = [positions[0], positions[1], positions[2], positions[3]];
    quad_normal(corners).ok_or(MeshError::DegenerateElement { element: id })
}

/// Unit normals of every element.
pub fn element_normals(fragment: &MeshFragment) -> MeshResult<BTreeMap<ElementId, DVec3>> {
    fragment
        .elements()
        .keys()
        .map(|&id| element_normal(fragment, id).map(|n| (id, n)))
        .collect()
}

/// Unit normals of every node used by an element.
pub fn node_normals(fragment: &MeshFragment) -> MeshResult<BTreeMap<NodeId, DVec3>> {
    let elements = element_normals(fragment)?;
    node_normals_from(fragment, &elements)
}

fn node_normals_from(
    fragment: &MeshFragment,
    element_normals: &BTreeMap<ElementId, DVec3>,
) -> MeshResult<BTreeMap<NodeId, DVec3>> {
    let mut normals = BTreeMap::new();
    for (node, incident) in fragment.node_to_elements() {
        let sum: DVec3 = incident
            .iter()
            .filter_map(|e| element_normals.get(e))
            .copied()
            .sum();
        let count = incident.len() as f64;
        if sum.length_squared() <= NORMAL_EPSILON * count * count {
            return Err(MeshError::MisalignedNormals { node });
        }
        normals.insert(node, sum.normalize());
    }
    log::debug!("computed {} node normals", normals.len());
    Ok(normals)
}
