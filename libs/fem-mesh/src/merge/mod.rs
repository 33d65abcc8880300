//! # Fragment Merging
//!
//! Combines independently numbered fragments into one ID space.
//!
//! The first fragment seeds the result unchanged. Each later fragment must
//! reference exactly one property from its elements, mapped to exactly one
//! material; that property and material get fresh IDs (`max + 1`) and
//! declared but unreferenced properties are dropped. Node and element IDs that
//! collide with IDs already merged are reassigned to `max + 1` in ascending
//! order, and connectivity is patched through the fragment's node to element
//! back references.
//!
//! All fragments are checked before anything is combined and the result is
//! built in a local accumulator, so a failure leaves no partial merge.

use crate::element::Element;
use crate::error::{MeshError, MeshResult};
use crate::fragment::MeshFragment;
use crate::ids::{ElementId, MaterialId, NodeId, PropertyId};
use glam::DVec3;
use std::collections::{BTreeMap, BTreeSet};

/// Old to new identifiers for one input fragment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Renumbering {
    pub nodes: BTreeMap<NodeId, NodeId>,
    pub elements: BTreeMap<ElementId, ElementId>,
    pub properties: BTreeMap<PropertyId, PropertyId>,
    pub materials: BTreeMap<MaterialId, MaterialId>,
}

impl Renumbering {
    /// New ID of `node`.
    pub fn node(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).copied()
    }

    /// New ID of `element`.
    pub fn element(&self, element: ElementId) -> Option<ElementId> {
        self.elements.get(&element).copied()
    }

    /// Number of nodes whose ID changed.
    pub fn renumbered_nodes(&self) -> usize {
        self.nodes.iter().filter(|(old, new)| old != new).count()
    }

    /// Number of elements whose ID changed.
    pub fn renumbered_elements(&self) -> usize {
        self.elements.iter().filter(|(old, new)| old != new).count()
    }
}

/// The merged fragment and one [`Renumbering`] per input, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedMesh {
    pub fragment: MeshFragment,
    pub renumberings: Vec<Renumbering>,
}

/// The single property of a fragment being merged in, and its material.
fn single_assignment(index: usize, fragment: &MeshFragment) -> MeshResult<(PropertyId, MaterialId)> {
    let used = fragment.used_property_ids();
    if used.len() != 1 {
        return Err(MeshError::MultiProperty {
            fragment: index,
            count: used.len(),
        });
    }
    let materials: BTreeSet<MaterialId> = used
        .iter()
        .filter_map(|&property| fragment.material_of(property))
        .collect();
    if materials.len() != 1 {
        return Err(MeshError::MultiMaterial {
            fragment: index,
            count: materials.len(),
        });
    }
    let property = used
        .into_iter()
        .next()
        .ok_or_else(|| MeshError::invalid_fragment("fragment has no property"))?;
    let material = fragment
        .material_of(property)
        .ok_or_else(|| MeshError::invalid_fragment(format!("property {property} has no material")))?;
    Ok((property, material))
}

/// Identifier following `max`, or 1 for an empty ID space.
fn after(max: Option<u32>, what: &str) -> MeshResult<u32> {
    match max {
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| MeshError::id_overflow(format!("allocating a new {what} id"))),
        None => Ok(1),
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    nodes: BTreeMap<NodeId, DVec3>,
    elements: BTreeMap<ElementId, Element>,
    properties: BTreeMap<PropertyId, MaterialId>,
    materials: BTreeSet<MaterialId>,
}

impl Accumulator {
    fn seed(fragment: &MeshFragment) -> (Self, Renumbering) {
        let acc = Self {
            nodes: fragment.nodes().clone(),
            elements: fragment.elements().clone(),
            properties: fragment.properties().clone(),
            materials: fragment.material_ids(),
        };
        let identity = Renumbering {
            nodes: fragment.nodes().keys().map(|&n| (n, n)).collect(),
            elements: fragment.elements().keys().map(|&e| (e, e)).collect(),
            properties: fragment.properties().keys().map(|&p| (p, p)).collect(),
            materials: acc.materials.iter().map(|&m| (m, m)).collect(),
        };
        (acc, identity)
    }

    fn absorb(
        &mut self,
        fragment: &MeshFragment,
        (property, material): (PropertyId, MaterialId),
    ) -> MeshResult<Renumbering> {
        let mut table = Renumbering::default();

        let max_property = self.properties.keys().next_back().map(|p| p.get());
        let max_material = self.materials.iter().next_back().map(|m| m.get());
        let new_property = PropertyId::new(after(max_property, "property")?);
        let new_material = MaterialId::new(after(max_material, "material")?);
        self.properties.insert(new_property, new_material);
        self.materials.insert(new_material);
        table.properties.insert(property, new_property);
        table.materials.insert(material, new_material);

        for (&old, &position) in fragment.nodes() {
            let new = if self.nodes.contains_key(&old) {
                NodeId::new(after(self.nodes.keys().next_back().map(|n| n.get()), "node")?)
            } else {
                old
            };
            self.nodes.insert(new, position);
            table.nodes.insert(old, new);
        }

        let mut patched: BTreeMap<ElementId, Element> = fragment.elements().clone();
        for (old, incident) in fragment.node_to_elements() {
            let new = table.nodes.get(&old).copied().unwrap_or(old);
            if new == old {
                continue;
            }
            for element_id in incident {
                let original = &fragment.elements()[&element_id];
                if let Some(element) = patched.get_mut(&element_id) {
                    for (slot, &was) in element.nodes.iter_mut().zip(&original.nodes) {
                        if was == old {
                            *slot = new;
                        }
                    }
                }
            }
        }

        for (old, mut element) in patched {
            let new = if self.elements.contains_key(&old) {
                ElementId::new(after(
                    self.elements.keys().next_back().map(|e| e.get()),
                    "element",
                )?)
            } else {
                old
            };
            element.property = new_property;
            self.elements.insert(new, element);
            table.elements.insert(old, new);
        }

        Ok(table)
    }
}

/// Merges `fragments` in order into one consistently numbered fragment.
pub fn merge_fragments(fragments: &[MeshFragment]) -> MeshResult<MergedMesh> {
    let Some((seed, rest)) = fragments.split_first() else {
        return Err(MeshError::empty_input("no fragments to merge"));
    };

    let assignments = rest
        .iter()
        .enumerate()
        .map(|(i, fragment)| single_assignment(i + 1, fragment))
        .collect::<MeshResult<Vec<_>>>()?;

    let (mut acc, identity) = Accumulator::seed(seed);
    let mut renumberings = vec![identity];
    for (fragment, assignment) in rest.iter().zip(assignments) {
        let table = acc.absorb(fragment, assignment)?;
        log::debug!(
            "merged fragment: {} nodes and {} elements renumbered",
            table.renumbered_nodes(),
            table.renumbered_elements()
        );
        renumberings.push(table);
    }

    let fragment = MeshFragment::new(acc.nodes, acc.elements, acc.properties)?;
    log::info!(
        "merged {} fragments into {} nodes and {} elements",
        fragments.len(),
        fragment.node_count(),
        fragment.element_count()
    );
    Ok(MergedMesh {
        fragment,
        renumberings,
    })
}
