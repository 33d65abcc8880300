//! # Node Equivalencing
//!
//! Merges nodes of different fragments that lie within a tolerance of each
//! other.
//!
//! Each fragment is first shifted into its own ID range (offset by the summed
//! maximum IDs of the fragments before it), so the union has no collisions.
//! Coincident pairs come from a [`PointIndex`] pair query and are grouped into
//! clusters; each cluster collapses onto its smallest node ID. The pass is
//! rejected without producing anything when:
//!
//! - two nodes of the same fragment are within tolerance, or end up in one
//!   cluster through a chain of pairs ([`MeshError::ToleranceCollapse`]);
//! - a replacement makes two corners of one element coincide
//!   ([`MeshError::ElementCollapse`]);
//! - elements of different fragments end up on the same node set, as happens
//!   when a fragment is equivalenced against a copy of itself
//!   ([`MeshError::ToleranceCollapse`]).
//!
//! Nodes no element references are dropped afterwards.

use crate::element::{Element, ElementType};
use crate::error::{MeshError, MeshResult};
use crate::fragment::MeshFragment;
use crate::ids::{ElementId, MaterialId, NodeId, PropertyId};
use crate::spatial::PointIndex;
use config::constants::MIN_CELL_SIZE;
use glam::DVec3;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// ID offsets applied to one input fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FragmentOffsets {
    pub node: u32,
    pub element: u32,
    pub property: u32,
    pub material: u32,
}

/// Result of an equivalencing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Equivalenced {
    pub fragment: MeshFragment,
    /// Replaced node to surviving node, both in offset numbering.
    pub replaced: BTreeMap<NodeId, NodeId>,
    /// Offsets applied to each input fragment, in input order.
    pub offsets: Vec<FragmentOffsets>,
    /// Nodes dropped because no element referenced them any more.
    pub removed_nodes: usize,
}

/// Node of the combined point set.
#[derive(Debug, Clone, Copy)]
struct Entry {
    id: NodeId,
    local: NodeId,
    fragment: usize,
}

/// Disjoint-set forest whose representative is always the smallest index.
struct Clusters {
    parent: Vec<usize>,
}

impl Clusters {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra < rb {
            self.parent[rb] = ra;
        } else if rb < ra {
            self.parent[ra] = rb;
        }
    }
}

fn offsets_for(fragments: &[MeshFragment]) -> MeshResult<Vec<FragmentOffsets>> {
    let overflow = || MeshError::id_overflow("offsetting fragments for equivalencing");
    let mut running = FragmentOffsets::default();
    let mut offsets = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        offsets.push(running);
        running.node = running
            .node
            .checked_add(fragment.max_node_id().map_or(0, NodeId::get))
            .ok_or_else(overflow)?;
        running.element = running
            .element
            .checked_add(fragment.max_element_id().map_or(0, ElementId::get))
            .ok_or_else(overflow)?;
        running.property = running
            .property
            .checked_add(fragment.max_property_id().map_or(0, PropertyId::get))
            .ok_or_else(overflow)?;
        running.material = running
            .material
            .checked_add(fragment.max_material_id().map_or(0, MaterialId::get))
            .ok_or_else(overflow)?;
    }
    Ok(offsets)
}

/// Equivalences nodes of `fragments` that lie within `tolerance`.
///
/// # Example
///
/// ```rust
/// use fem_mesh::curve::LineCurve;
/// use fem_mesh::equivalence::equivalence;
/// use fem_mesh::ruled::{build_ruled_mesh, RuledMeshParams};
/// use glam::DVec3;
///
/// let strip = |y0: f64, y1: f64| {
///     let a = LineCurve::new(DVec3::new(0.0, y0, 0.0), DVec3::new(1.0, y0, 0.0));
///     let b = LineCurve::new(DVec3::new(0.0, y1, 0.0), DVec3::new(1.0, y1, 0.0));
///     build_ruled_mesh(&a, &b, &RuledMeshParams::new(1, 1)).unwrap().fragment
/// };
/// let result = equivalence(&[strip(0.0, 1.0), strip(1.0, 2.0)], 1e-4).unwrap();
/// assert_eq!(result.fragment.node_count(), 6);
/// ```
pub fn equivalence(fragments: &[MeshFragment], tolerance: f64) -> MeshResult<Equivalenced> {
    if fragments.is_empty() {
        return Err(MeshError::empty_input("no fragments to equivalence"));
    }
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(MeshError::invalid_parameter(
            "tolerance",
            format!("must be finite and non-negative, got {tolerance}"),
        ));
    }

    let offsets = offsets_for(fragments)?;
    let overflow = || MeshError::id_overflow("offsetting fragment ids");

    // Combined numbering. Offsets keep every fragment's IDs above the previous
    // fragment's, so the entries are in ascending ID order.
    let mut entries = Vec::new();
    let mut points = Vec::new();
    let mut elements: BTreeMap<ElementId, (usize, Element)> = BTreeMap::new();
    let mut properties = BTreeMap::new();
    for (index, (fragment, offset)) in fragments.iter().zip(&offsets).enumerate() {
        for (&local, &position) in fragment.nodes() {
            let id = local.checked_add(offset.node).ok_or_else(overflow)?;
            entries.push(Entry {
                id,
                local,
                fragment: index,
            });
            points.push(position);
        }
        for (&id, element) in fragment.elements() {
            let nodes = element
                .nodes
                .iter()
                .map(|n| n.checked_add(offset.node).ok_or_else(overflow))
                .collect::<MeshResult<Vec<_>>>()?;
            let property = element.property.checked_add(offset.property).ok_or_else(overflow)?;
            let id = id.checked_add(offset.element).ok_or_else(overflow)?;
            elements.insert(
                id,
                (
                    index,
                    Element {
                        kind: element.kind,
                        nodes,
                        property,
                    },
                ),
            );
        }
        for (&property, &material) in fragment.properties() {
            properties.insert(
                property.checked_add(offset.property).ok_or_else(overflow)?,
                material.checked_add(offset.material).ok_or_else(overflow)?,
            );
        }
    }

    let index = PointIndex::new(&points, tolerance.max(MIN_CELL_SIZE));
    let pairs = index.query_pairs(tolerance);
    let mut clusters = Clusters::new(entries.len());
    for &(a, b) in &pairs {
        let (first, second) = (entries[a], entries[b]);
        if first.fragment == second.fragment {
            return Err(MeshError::ToleranceCollapse {
                fragment: first.fragment,
                tolerance,
                detail: format!(
                    "nodes {} and {} are {:.3e} apart",
                    first.local,
                    second.local,
                    points[a].distance(points[b])
                ),
            });
        }
        clusters.union(a, b);
    }

    let mut replaced = BTreeMap::new();
    let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for i in 0..entries.len() {
        let root = clusters.find(i);
        if root != i {
            replaced.insert(entries[i].id, entries[root].id);
            members.entry(root).or_default().push(i);
        }
    }

    let mut merged_elements = BTreeMap::new();
    let mut shapes: HashMap<(ElementType, Vec<NodeId>), (ElementId, usize)> = HashMap::new();
    for (id, (fragment, element)) in elements {
        let mapped: Vec<NodeId> = element
            .nodes
            .iter()
            .map(|n| replaced.get(n).copied().unwrap_or(*n))
            .collect();
        // Corners already shared in the input are left as they are.
        for (k, node) in mapped.iter().enumerate() {
            let collapsed = mapped[..k]
                .iter()
                .zip(&element.nodes)
                .find(|&(m, original)| m == node && *original != element.nodes[k]);
            if let Some((_, &original)) = collapsed {
                let replaced_node = if element.nodes[k] != *node {
                    element.nodes[k]
                } else {
                    original
                };
                return Err(MeshError::ElementCollapse {
                    element: id,
                    kept: *node,
                    replaced: replaced_node,
                });
            }
        }

        let mut key = mapped.clone();
        key.sort_unstable();
        if let Some(&(other, other_fragment)) = shapes.get(&(element.kind, key.clone())) {
            if other_fragment != fragment {
                return Err(MeshError::ToleranceCollapse {
                    fragment,
                    tolerance,
                    detail: format!(
                        "element {id} would coincide with element {other} of fragment {other_fragment}"
                    ),
                });
            }
        }
        shapes.insert((element.kind, key), (id, fragment));
        merged_elements.insert(
            id,
            Element {
                nodes: mapped,
                ..element
            },
        );
    }

    for (&root, cluster) in &members {
        let mut seen = BTreeMap::from([(entries[root].fragment, root)]);
        for &i in cluster {
            if let Some(&other) = seen.get(&entries[i].fragment) {
                return Err(MeshError::ToleranceCollapse {
                    fragment: entries[i].fragment,
                    tolerance,
                    detail: format!(
                        "nodes {} and {} merge through a chain of coincident nodes",
                        entries[other].local, entries[i].local
                    ),
                });
            }
            seen.insert(entries[i].fragment, i);
        }
    }

    let referenced: BTreeSet<NodeId> = merged_elements
        .values()
        .flat_map(|e: &Element| e.nodes.iter().copied())
        .collect();
    let nodes: BTreeMap<NodeId, DVec3> = entries
        .iter()
        .zip(&points)
        .filter(|(entry, _)| referenced.contains(&entry.id))
        .map(|(entry, &p)| (entry.id, p))
        .collect();
    let removed_nodes = entries.len() - nodes.len();

    if pairs.is_empty() {
        log::warn!("no coincident nodes within tolerance {tolerance}");
    }
    log::info!(
        "equivalenced {} fragments: {} nodes replaced, {} nodes removed",
        fragments.len(),
        replaced.len(),
        removed_nodes
    );

    let fragment = MeshFragment::new(nodes, merged_elements, properties)?;
    Ok(Equivalenced {
        fragment,
        replaced,
        offsets,
        removed_nodes,
    })
}

#[cfg(test)]
mod tests;
