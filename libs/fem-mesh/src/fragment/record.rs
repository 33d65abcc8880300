//! Serde records for the fragment interchange document.
//!
//! Elements carry the host's integer type code rather than
//! [`ElementType`](crate::element::ElementType) so documents written by other
//! tools load without translation.

use super::{FragmentBuilder, MeshFragment};
use crate::element::{Element, ElementType};
use crate::error::{MeshError, MeshResult};
use crate::ids::{ElementId, MaterialId, NodeId, PropertyId};
use glam::DVec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub xyz: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub code: u32,
    pub nodes: Vec<NodeId>,
    pub property: PropertyId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub id: PropertyId,
    pub material: MaterialId,
}

/// Flat, list-based form of a fragment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FragmentRecord {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub elements: Vec<ElementRecord>,
    #[serde(default)]
    pub properties: Vec<PropertyRecord>,
}

impl TryFrom<FragmentRecord> for MeshFragment {
    type Error = MeshError;

    fn try_from(record: FragmentRecord) -> MeshResult<Self> {
        let mut builder = FragmentBuilder::new();
        for node in record.nodes {
            builder.node(node.id, DVec3::from_array(node.xyz));
        }
        for property in record.properties {
            builder.property(property.id, property.material);
        }
        for element in record.elements {
            let kind = ElementType::from_code(element.id, element.code, element.nodes.len())?;
            let body = Element::new(element.id, kind, element.nodes, element.property)?;
            builder.element(element.id, body);
        }
        builder.build()
    }
}

impl From<&MeshFragment> for FragmentRecord {
    fn from(fragment: &MeshFragment) -> Self {
        Self {
            nodes: fragment
                .nodes()
                .iter()
                .map(|(&id, p)| NodeRecord {
                    id,
                    xyz: p.to_array(),
                })
                .collect(),
            elements: fragment
                .elements()
                .iter()
                .map(|(&id, e)| ElementRecord {
                    id,
                    code: e.kind.code(),
                    nodes: e.nodes.clone(),
                    property: e.property,
                })
                .collect(),
            properties: fragment
                .properties()
                .iter()
                .map(|(&id, &material)| PropertyRecord { id, material })
                .collect(),
        }
    }
}
