//! # Include Cards
//!
//! Constraint, load and spider cards for a set of nodes, written as a
//! separate include file next to the main bulk data.
//!
//! ## Node set labels
//!
//! | Label | Cards |
//! |-------|-------|
//! | `[name]SPC1_SID_C` | one `SPC1` per node, components `C` from `1..=6` |
//! | `[name]FORCE_SID_SCALE_VX_VY_VZ` | one `FORCE` per node, basic system |
//!
//! Anything before the keyword is ignored, so `root:SPC1_1_123` works.
//!
//! ## Spider
//!
//! [`rbe3_within_sphere`] averages every node inside a sphere onto a new
//! reference grid at the centre with one `RBE3`.

use crate::error::{BulkError, BulkResult};
use crate::field::{is_valid_real, parse_real};
use crate::writer::{grid_card, Card};
use fem_mesh::{ElementId, MeshError, MeshFragment, NodeId};
use glam::DVec3;

/// Components the `RBE3` reference grid carries.
const REFERENCE_COMPONENTS: &str = "123456";

/// Translational components averaged from each spider node.
const SPIDER_COMPONENTS: &str = "123";

/// Weight of every spider node.
const SPIDER_WEIGHT: f64 = 1.0;

// =============================================================================
// Node sets
// =============================================================================

/// Card family selected by a node set label.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeSetCard {
    /// Single-point constraint of `components` in set `set`
    Spc1 { set: u32, components: String },
    /// Nodal force `scale * direction` in load set `set`
    Force {
        set: u32,
        scale: f64,
        direction: DVec3,
    },
}

fn set_id(label: &str, text: &str) -> BulkResult<u32> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(BulkError::invalid_label(label, "set ID must be an integer"));
    }
    text.parse()
        .map_err(|_| BulkError::invalid_label(label, "set ID out of range"))
}

fn label_real(label: &str, text: &str, what: &str) -> BulkResult<f64> {
    if !is_valid_real(text) {
        return Err(BulkError::invalid_label(label, format!("{what} is not a real")));
    }
    parse_real(text).ok_or_else(|| BulkError::invalid_label(label, format!("{what} is not a real")))
}

impl NodeSetCard {
    /// Parses a node set label.
    ///
    /// ```rust
    /// use fem_bulk::include::NodeSetCard;
    ///
    /// let card = NodeSetCard::from_label("root:SPC1_1_123").unwrap();
    /// assert_eq!(card, NodeSetCard::Spc1 { set: 1, components: "123".into() });
    /// ```
    pub fn from_label(label: &str) -> BulkResult<Self> {
        if let Some(at) = label.find("SPC1") {
            let fields: Vec<&str> = label[at..].split('_').collect();
            let [_, set, components] = fields[..] else {
                return Err(BulkError::invalid_label(label, "expected SPC1_SID_C"));
            };
            if components.is_empty() || !components.chars().all(|c| ('1'..='6').contains(&c)) {
                return Err(BulkError::invalid_label(
                    label,
                    "components must be digits 1 to 6",
                ));
            }
            let repeated = components
                .char_indices()
                .any(|(i, c)| components[i + 1..].contains(c));
            if repeated {
                return Err(BulkError::invalid_label(label, "repeated component"));
            }
            return Ok(Self::Spc1 {
                set: set_id(label, set)?,
                components: components.to_string(),
            });
        }

        if let Some(at) = label.find("FORCE") {
            let fields: Vec<&str> = label[at..].split('_').collect();
            let [_, set, scale, x, y, z] = fields[..] else {
                return Err(BulkError::invalid_label(
                    label,
                    "expected FORCE_SID_SCALE_VX_VY_VZ",
                ));
            };
            return Ok(Self::Force {
                set: set_id(label, set)?,
                scale: label_real(label, scale, "scale")?,
                direction: DVec3::new(
                    label_real(label, x, "x component")?,
                    label_real(label, y, "y component")?,
                    label_real(label, z, "z component")?,
                ),
            });
        }

        Err(BulkError::invalid_label(
            label,
            "only SPC1 and FORCE node sets are supported",
        ))
    }

    /// One card per node, in the order given.
    pub fn lines(&self, nodes: &[NodeId]) -> BulkResult<Vec<String>> {
        let mut lines = Vec::with_capacity(nodes.len());
        for &node in nodes {
            let card = match self {
                Self::Spc1 { set, components } => {
                    let mut card = Card::new("SPC1")?;
                    card.id(*set)?.text(components)?.id(node)?;
                    card
                }
                Self::Force {
                    set,
                    scale,
                    direction,
                } => {
                    let mut card = Card::new("FORCE")?;
                    card.id(*set)?
                        .id(node)?
                        .blank()
                        .real(*scale)?
                        .real(direction.x)?
                        .real(direction.y)?
                        .real(direction.z)?;
                    card
                }
            };
            lines.extend(card.lines());
        }
        Ok(lines)
    }
}

/// Cards of `label` for every node of `fragment` within `radius` of `center`.
pub fn node_set_within(
    fragment: &MeshFragment,
    label: &str,
    center: DVec3,
    radius: f64,
) -> BulkResult<Vec<String>> {
    let card = NodeSetCard::from_label(label)?;
    let nodes = fragment.nodes_within(center, radius);
    if nodes.is_empty() {
        return Err(BulkError::EmptySelection { center, radius });
    }
    log::info!("Node set {label}: {} nodes", nodes.len());
    card.lines(&nodes)
}

// =============================================================================
// Spider
// =============================================================================

/// `RBE3` spider tying a set of nodes to a new reference grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Rbe3Spider {
    pub element: ElementId,
    pub reference: NodeId,
    pub center: DVec3,
    pub nodes: Vec<NodeId>,
}

impl Rbe3Spider {
    /// Reference `GRID` followed by the `RBE3` card.
    pub fn lines(&self) -> BulkResult<Vec<String>> {
        let mut lines = grid_card(self.reference.get(), self.center)?;
        let mut card = Card::new("RBE3")?;
        card.id(self.element)?
            .blank()
            .id(self.reference)?
            .text(REFERENCE_COMPONENTS)?
            .real(SPIDER_WEIGHT)?
            .text(SPIDER_COMPONENTS)?;
        for &node in &self.nodes {
            card.id(node)?;
        }
        lines.extend(card.lines());
        Ok(lines)
    }
}

/// Spider over the nodes of `fragment` within `radius` of `center`.
///
/// The reference grid and the element take the next free node and element
/// IDs of `fragment`.
pub fn rbe3_within_sphere(
    fragment: &MeshFragment,
    center: DVec3,
    radius: f64,
) -> BulkResult<Rbe3Spider> {
    let nodes = fragment.nodes_within(center, radius);
    if nodes.is_empty() {
        return Err(BulkError::EmptySelection { center, radius });
    }
    let reference = match fragment.nodes().keys().next_back() {
        Some(max) => max.next(),
        None => Some(NodeId::new(1)),
    }
    .ok_or_else(|| MeshError::id_overflow("allocating the spider reference grid"))?;
    let element = match fragment.elements().keys().next_back() {
        Some(max) => max.next(),
        None => Some(ElementId::new(1)),
    }
    .ok_or_else(|| MeshError::id_overflow("allocating the spider element"))?;

    log::info!(
        "RBE3 {element}: {} nodes onto reference grid {reference}",
        nodes.len()
    );
    Ok(Rbe3Spider {
        element,
        reference,
        center,
        nodes,
    })
}
