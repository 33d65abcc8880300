//! # Shell Thickening
//!
//! Extrudes a quad surface mesh into layered hex solids along its nodal
//! normals.
//!
//! Layer `ℓ` (`0..=layers`) holds a copy of every surface node moved by
//! `ℓ · thickness / layers` along the node normal, numbered
//! `id + ℓ · node_stride`. Each quad becomes one hex per layer, numbered
//! `id + ℓ · element_stride`, with the layer-`ℓ` face first and the
//! layer-`ℓ + 1` face second.
//!
//! The strides are `max(count, max_id)`, which equals the count for the
//! compactly numbered meshes the ruled builder produces and keeps sparse
//! numbering collision free.

use crate::element::{Element, ElementType};
use crate::error::{MeshError, MeshResult};
use crate::fragment::MeshFragment;
use crate::ids::{ElementId, NodeId};
use crate::normals::node_normals;
use config::constants::{DEFAULT_LAYERS, DEFAULT_THICKNESS};
use glam::DVec3;
use std::collections::BTreeMap;

/// Layer count and total thickness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThickenParams {
    pub layers: u32,
    /// Total thickness; negative values extrude against the normals.
    pub thickness: f64,
}

impl ThickenParams {
    pub fn new(layers: u32, thickness: f64) -> Self {
        Self { layers, thickness }
    }

    fn validate(&self) -> MeshResult<()> {
        if self.layers == 0 {
            return Err(MeshError::invalid_parameter("layers", "must be at least 1"));
        }
        if !self.thickness.is_finite() || self.thickness == 0.0 {
            return Err(MeshError::invalid_parameter(
                "thickness",
                format!("must be finite and non-zero, got {}", self.thickness),
            ));
        }
        Ok(())
    }
}

impl Default for ThickenParams {
    fn default() -> Self {
        Self::new(DEFAULT_LAYERS, DEFAULT_THICKNESS)
    }
}

/// Computes nodal normals and thickens along them.
pub fn thicken_shell(fragment: &MeshFragment, params: &ThickenParams) -> MeshResult<MeshFragment> {
    params.validate()?;
    check_quads(fragment)?;
    let normals = node_normals(fragment)?;
    thicken(fragment, &normals, params)
}

/// Thickens `fragment` along the supplied node normals.
///
/// Nodes no element uses are not carried into the solid. Every used node
/// must have a normal.
pub fn thicken(
    fragment: &MeshFragment,
    normals: &BTreeMap<NodeId, DVec3>,
    params: &ThickenParams,
) -> MeshResult<MeshFragment> {
    params.validate()?;
    check_quads(fragment)?;
    if fragment.element_count() == 0 {
        return Err(MeshError::empty_input("no elements to thicken"));
    }

    let node_stride = stride(
        fragment.node_count(),
        fragment.max_node_id().map(NodeId::get),
        "node stride",
    )?;
    let element_stride = stride(
        fragment.element_count(),
        fragment.max_element_id().map(ElementId::get),
        "element stride",
    )?;
    let layer_node = |node: NodeId, layer: u32| -> MeshResult<NodeId> {
        layer
            .checked_mul(node_stride)
            .and_then(|offset| node.checked_add(offset))
            .ok_or_else(|| MeshError::id_overflow(format!("offsetting node {node} to layer {layer}")))
    };

    let step = params.thickness / params.layers as f64;
    let mut nodes = BTreeMap::new();
    for node in fragment.node_to_elements().into_keys() {
        let base = fragment
            .node(node)
            .ok_or_else(|| MeshError::invalid_fragment(format!("node {node} does not exist")))?;
        let normal = normals.get(&node).copied().ok_or_else(|| {
            MeshError::invalid_parameter("normals", format!("no normal for node {node}"))
        })?;
        for layer in 0..=params.layers {
            nodes.insert(layer_node(node, layer)?, base + normal * (step * layer as f64));
        }
    }

    let mut elements = BTreeMap::new();
    for (&id, element) in fragment.elements() {
        let quad = &element.nodes;
        for layer in 0..params.layers {
            let hex_id = layer
                .checked_mul(element_stride)
                .and_then(|offset| id.checked_add(offset))
                .ok_or_else(|| MeshError::id_overflow(format!("offsetting element {id}")))?;
            let mut corners = [NodeId::new(0); 8];
            for k in 0..4 {
                corners[k] = layer_node(quad[k], layer)?;
                corners[k + 4] = layer_node(quad[k], layer + 1)?;
            }
            elements.insert(hex_id, Element::hex(corners, element.property));
        }
    }

    let solid = MeshFragment::new(nodes, elements, fragment.properties().clone())?;
    log::info!(
        "thickened {} quads into {} hexes over {} layers",
        fragment.element_count(),
        solid.element_count(),
        params.layers
    );
    Ok(solid)
}

fn check_quads(fragment: &MeshFragment) -> MeshResult<()> {
    match fragment
        .elements()
        .iter()
        .find(|(_, e)| e.kind != ElementType::Quad4)
    {
        Some((&id, element)) => Err(MeshError::unsupported(id, element.kind, "thickening")),
        None => Ok(()),
    }
}

fn stride(count: usize, max_id: Option<u32>, what: &str) -> MeshResult<u32> {
    let count = u32::try_from(count).map_err(|_| MeshError::id_overflow(what.to_string()))?;
    Ok(count.max(max_id.unwrap_or(0)))
}
