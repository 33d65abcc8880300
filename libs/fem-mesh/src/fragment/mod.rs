//! # Mesh Fragment
//!
//! The immutable bundle of nodes, elements and property/material assignments
//! produced by one pipeline stage.
//!
//! Fragments are validated on construction: every node an element references
//! exists, every element's property exists and coordinates are finite. Stages
//! never mutate a fragment; they build a new one.

mod record;

pub use record::{ElementRecord, FragmentRecord, NodeRecord, PropertyRecord};

use crate::element::{Dimension, Element, ElementType};
use crate::error::{MeshError, MeshResult};
use crate::ids::{ElementId, MaterialId, NodeId, PropertyId};
use crate::spatial::PointIndex;
use config::constants::MIN_CELL_SIZE;
use glam::DVec3;
use std::collections::{BTreeMap, BTreeSet};

/// A validated finite-element mesh fragment.
///
/// # Example
///
/// ```rust
/// use fem_mesh::{Element, FragmentBuilder, MaterialId, NodeId, PropertyId};
/// use glam::DVec3;
///
/// let mut builder = FragmentBuilder::new();
/// builder
///     .node(NodeId::new(1), DVec3::new(0.0, 0.0, 0.0))
///     .node(NodeId::new(2), DVec3::new(1.0, 0.0, 0.0))
///     .node(NodeId::new(3), DVec3::new(1.0, 1.0, 0.0))
///     .node(NodeId::new(4), DVec3::new(0.0, 1.0, 0.0))
///     .property(PropertyId::new(1), MaterialId::new(1))
///     .element(
///         fem_mesh::ElementId::new(1),
///         Element::quad([1, 2, 3, 4].map(NodeId::new), PropertyId::new(1)),
///     );
/// let fragment = builder.build().unwrap();
/// assert_eq!(fragment.node_count(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshFragment {
    nodes: BTreeMap<NodeId, DVec3>,
    elements: BTreeMap<ElementId, Element>,
    properties: BTreeMap<PropertyId, MaterialId>,
}

impl MeshFragment {
    /// Creates a fragment from its maps after checking every cross-reference.
    pub fn new(
        nodes: BTreeMap<NodeId, DVec3>,
        elements: BTreeMap<ElementId, Element>,
        properties: BTreeMap<PropertyId, MaterialId>,
    ) -> MeshResult<Self> {
        let fragment = Self {
            nodes,
            elements,
            properties,
        };
        fragment.validate()?;
        Ok(fragment)
    }

    /// Creates an empty fragment.
    pub fn empty() -> Self {
        Self::default()
    }

    fn validate(&self) -> MeshResult<()> {
        if self.nodes.contains_key(&NodeId::new(0)) {
            return Err(MeshError::invalid_fragment("node id 0 is not allowed"));
        }
        if self.elements.contains_key(&ElementId::new(0)) {
            return Err(MeshError::invalid_fragment("element id 0 is not allowed"));
        }
        for (id, position) in &self.nodes {
            if !position.is_finite() {
                return Err(MeshError::invalid_fragment(format!(
                    "node {id} has non-finite coordinates {position}"
                )));
            }
        }
        for (&id, element) in &self.elements {
            if element.nodes.len() != element.kind.node_count() {
                return Err(MeshError::invalid_fragment(format!(
                    "element {id} of type {:?} has {} nodes",
                    element.kind,
                    element.nodes.len()
                )));
            }
            for &node in &element.nodes {
                if !self.nodes.contains_key(&node) {
                    return Err(MeshError::MissingNode { element: id, node });
                }
            }
            if !self.properties.contains_key(&element.property) {
                return Err(MeshError::MissingProperty {
                    element: id,
                    property: element.property,
                });
            }
        }
        Ok(())
    }

    /// Splits the fragment back into its maps.
    pub fn into_parts(
        self,
    ) -> (
        BTreeMap<NodeId, DVec3>,
        BTreeMap<ElementId, Element>,
        BTreeMap<PropertyId, MaterialId>,
    ) {
        (self.nodes, self.elements, self.properties)
    }

    #[inline]
    pub fn nodes(&self) -> &BTreeMap<NodeId, DVec3> {
        &self.nodes
    }

    #[inline]
    pub fn elements(&self) -> &BTreeMap<ElementId, Element> {
        &self.elements
    }

    /// Property to material assignments.
    #[inline]
    pub fn properties(&self) -> &BTreeMap<PropertyId, MaterialId> {
        &self.properties
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<DVec3> {
        self.nodes.get(&id).copied()
    }

    #[inline]
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the fragment has neither nodes nor elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.elements.is_empty()
    }

    pub fn max_node_id(&self) -> Option<NodeId> {
        self.nodes.keys().next_back().copied()
    }

    pub fn max_element_id(&self) -> Option<ElementId> {
        self.elements.keys().next_back().copied()
    }

    pub fn max_property_id(&self) -> Option<PropertyId> {
        self.properties.keys().next_back().copied()
    }

    pub fn max_material_id(&self) -> Option<MaterialId> {
        self.properties.values().max().copied()
    }

    /// Material assigned to `property`.
    pub fn material_of(&self, property: PropertyId) -> Option<MaterialId> {
        self.properties.get(&property).copied()
    }

    /// Distinct materials referenced by the property table.
    pub fn material_ids(&self) -> BTreeSet<MaterialId> {
        self.properties.values().copied().collect()
    }

    /// Distinct properties referenced by at least one element.
    pub fn used_property_ids(&self) -> BTreeSet<PropertyId> {
        self.elements.values().map(|e| e.property).collect()
    }

    /// Number of elements of each type.
    pub fn element_type_counts(&self) -> BTreeMap<ElementType, usize> {
        let mut counts = BTreeMap::new();
        for element in self.elements.values() {
            *counts.entry(element.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Dimensions of the elements assigned to each property.
    pub fn property_dimensions(&self) -> BTreeMap<PropertyId, BTreeSet<Dimension>> {
        let mut dims: BTreeMap<PropertyId, BTreeSet<Dimension>> = BTreeMap::new();
        for element in self.elements.values() {
            dims.entry(element.property)
                .or_default()
                .insert(element.kind.dimension());
        }
        dims
    }

    /// Inverse connectivity: for each node, the elements that use it, in
    /// ascending element order.
    pub fn node_to_elements(&self) -> BTreeMap<NodeId, Vec<ElementId>> {
        let mut index: BTreeMap<NodeId, Vec<ElementId>> = BTreeMap::new();
        for (&id, element) in &self.elements {
            for &node in &element.nodes {
                let incident = index.entry(node).or_default();
                if incident.last() != Some(&id) {
                    incident.push(id);
                }
            }
        }
        index
    }

    /// Corner positions of an element in connectivity order.
    pub fn element_positions(&self, id: ElementId) -> Option<Vec<DVec3>> {
        let element = self.elements.get(&id)?;
        element.nodes.iter().map(|n| self.node(*n)).collect()
    }

    /// Returns a copy with every node moved by `offset`.
    pub fn translated(&self, offset: DVec3) -> Self {
        Self {
            nodes: self
                .nodes
                .iter()
                .map(|(&id, &p)| (id, p + offset))
                .collect(),
            elements: self.elements.clone(),
            properties: self.properties.clone(),
        }
    }

    /// Returns a copy with the connectivity of every surface element reversed,
    /// which flips its normal. Line and volume elements are unchanged.
    pub fn flipped_normals(&self) -> Self {
        let elements = self
            .elements
            .iter()
            .map(|(&id, element)| {
                let mut element = element.clone();
                if element.kind.dimension() == Dimension::Surface {
                    element.nodes.reverse();
                }
                (id, element)
            })
            .collect();
        Self {
            nodes: self.nodes.clone(),
            elements,
            properties: self.properties.clone(),
        }
    }

    /// Nodes within `radius` of `center`, in ascending ID order.
    pub fn nodes_within(&self, center: DVec3, radius: f64) -> Vec<NodeId> {
        if radius.is_nan() || radius < 0.0 || self.nodes.is_empty() {
            return Vec::new();
        }
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        let points: Vec<DVec3> = self.nodes.values().copied().collect();
        let index = PointIndex::new(&points, radius.max(MIN_CELL_SIZE));
        index
            .query_ball(center, radius)
            .into_iter()
            .map(|i| ids[i])
            .collect()
    }

    /// Parses a fragment from its JSON interchange form.
    pub fn from_json(text: &str) -> MeshResult<Self> {
        let record: FragmentRecord = serde_json::from_str(text)?;
        Self::try_from(record)
    }

    /// Renders the fragment in its JSON interchange form.
    pub fn to_json(&self) -> MeshResult<String> {
        Ok(serde_json::to_string_pretty(&FragmentRecord::from(self))?)
    }
}

/// Incremental construction of a [`MeshFragment`].
///
/// Duplicate IDs are remembered and reported by [`FragmentBuilder::build`].
#[derive(Debug, Default)]
pub struct FragmentBuilder {
    nodes: BTreeMap<NodeId, DVec3>,
    elements: BTreeMap<ElementId, Element>,
    properties: BTreeMap<PropertyId, MaterialId>,
    duplicates: Vec<String>,
}

impl FragmentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node.
    pub fn node(&mut self, id: NodeId, position: DVec3) -> &mut Self {
        if self.nodes.insert(id, position).is_some() {
            self.duplicates.push(format!("node {id}"));
        }
        self
    }

    /// Adds an element.
    pub fn element(&mut self, id: ElementId, element: Element) -> &mut Self {
        if self.elements.insert(id, element).is_some() {
            self.duplicates.push(format!("element {id}"));
        }
        self
    }

    /// Assigns `material` to `property`.
    pub fn property(&mut self, property: PropertyId, material: MaterialId) -> &mut Self {
        if self.properties.insert(property, material).is_some() {
            self.duplicates.push(format!("property {property}"));
        }
        self
    }

    /// Validates and produces the fragment.
    pub fn build(self) -> MeshResult<MeshFragment> {
        if !self.duplicates.is_empty() {
            return Err(MeshError::invalid_fragment(format!(
                "duplicate ids: {}",
                self.duplicates.join(", ")
            )));
        }
        MeshFragment::new(self.nodes, self.elements, self.properties)
    }
}
