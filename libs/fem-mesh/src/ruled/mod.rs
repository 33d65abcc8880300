//! # Ruled Mesh Builder
//!
//! Structured quad mesh between two sampled boundary curves.
//!
//! ## Numbering
//!
//! With `nx` longitudinal and `ny` transverse elements, the node at
//! transverse step `i` and longitudinal index `j` is
//! `1 + (nx + 1)·i + j` and sits at fraction `i / ny` between the two
//! boundaries. The element of cell `(i, j)` is `1 + nx·i + j` with corners
//! `N1 = 1 + (nx + 1)·i + j`, `N2 = N1 + nx + 1`, `N3 = N2 + 1`, `N4 = N1 + 1`.
//!
//! ## Orientation
//!
//! Boundary samples from independent curves may run in opposite directions,
//! which twists every quad. Two checks pick whether the second boundary is
//! reversed:
//!
//! - **Distance**: compare the summed lengths of the straight endpoint pairing
//!   (start to start, end to end) and the crossing pairing. Only meaningful
//!   for open curves.
//! - **Warp**: compare the summed warping coefficient of the mesh built with
//!   the second boundary as given and reversed.
//!
//! The distance check decides for open curves; the warp check refines it and a
//! disagreement is reported, never silently resolved.

use crate::curve::{is_closed, CurveSampler};
use crate::element::Element;
use crate::error::{MeshError, MeshResult};
use crate::fragment::MeshFragment;
use crate::ids::{ElementId, MaterialId, NodeId, PropertyId};
use glam::DVec3;
use std::collections::BTreeMap;

/// How the second boundary's direction is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Use both boundaries as sampled.
    AsGiven,
    /// Endpoint distance check only.
    Distance,
    /// Warp minimization only.
    Warp,
    /// Distance check for open curves, warp as refinement and for closed ones.
    #[default]
    DistanceThenWarp,
}

/// Parameters for [`build_ruled_mesh`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuledMeshParams {
    /// Elements along the boundaries.
    pub nx: usize,
    /// Elements between the boundaries.
    pub ny: usize,
    pub orientation: Orientation,
    /// Reverse the second boundary after the automatic decision.
    pub force_flip: bool,
    pub property: PropertyId,
    pub material: MaterialId,
}

impl RuledMeshParams {
    /// Default orientation handling on property 1 and material 1.
    pub fn new(nx: usize, ny: usize) -> Self {
        Self {
            nx,
            ny,
            orientation: Orientation::default(),
            force_flip: false,
            property: PropertyId::new(1),
            material: MaterialId::new(1),
        }
    }
}

/// Outcome of the orientation checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrientationReport {
    /// Distance check verdict; `None` when not evaluated or a curve is closed.
    pub distance_flip: Option<bool>,
    /// Warp check verdict; `None` when not evaluated.
    pub warp_flip: Option<bool>,
    /// Whether the second boundary was reversed.
    pub flipped: bool,
    /// Both checks ran and disagreed.
    pub conflict: bool,
}

/// A ruled fragment together with how it was oriented.
#[derive(Debug, Clone, PartialEq)]
pub struct RuledMesh {
    pub fragment: MeshFragment,
    pub report: OrientationReport,
}

/// Samples both curves with `params.nx` elements and meshes between them.
pub fn build_ruled_mesh<A, B>(first: &A, second: &B, params: &RuledMeshParams) -> MeshResult<RuledMesh>
where
    A: CurveSampler + ?Sized,
    B: CurveSampler + ?Sized,
{
    if params.nx == 0 {
        return Err(MeshError::invalid_parameter("nx", "must be at least 1"));
    }
    let first = first.sample(params.nx)?;
    let second = second.sample(params.nx)?;
    mesh_between(&first, &second, params)
}

/// Meshes between two sampled boundaries, choosing the second boundary's
/// direction per `params.orientation`. `params.nx` is taken from the samples.
pub fn mesh_between(
    first: &[DVec3],
    second: &[DVec3],
    params: &RuledMeshParams,
) -> MeshResult<RuledMesh> {
    check_boundaries(first, second, params.ny)?;

    let report = choose_orientation(first, second, params.ny, params.orientation, params.force_flip);
    let fragment = if report.flipped {
        let reversed: Vec<DVec3> = second.iter().rev().copied().collect();
        ruled_fragment(first, &reversed, params.ny, params.property, params.material)?
    } else {
        ruled_fragment(first, second, params.ny, params.property, params.material)?
    };

    log::debug!(
        "ruled mesh: {} nodes, {} elements, flipped = {}",
        fragment.node_count(),
        fragment.element_count(),
        report.flipped
    );
    Ok(RuledMesh { fragment, report })
}

fn check_boundaries(first: &[DVec3], second: &[DVec3], ny: usize) -> MeshResult<()> {
    if first.len() != second.len() {
        return Err(MeshError::CurveSampleMismatch {
            first: first.len(),
            second: second.len(),
        });
    }
    if first.len() < 2 {
        return Err(MeshError::invalid_parameter(
            "boundary",
            format!("need at least 2 samples per boundary, got {}", first.len()),
        ));
    }
    if ny == 0 {
        return Err(MeshError::invalid_parameter("ny", "must be at least 1"));
    }
    Ok(())
}

/// Builds the quad grid with both boundaries used as given.
pub fn ruled_fragment(
    first: &[DVec3],
    second: &[DVec3],
    ny: usize,
    property: PropertyId,
    material: MaterialId,
) -> MeshResult<MeshFragment> {
    check_boundaries(first, second, ny)?;
    let nx = first.len() - 1;
    let row = nx + 1;

    let node_id = |i: usize, j: usize| -> MeshResult<NodeId> {
        u32::try_from(1 + row * i + j)
            .map(NodeId::new)
            .map_err(|_| MeshError::id_overflow("numbering ruled mesh nodes"))
    };

    let grid = node_grid(first, second, ny);
    let mut nodes = BTreeMap::new();
    for i in 0..=ny {
        for j in 0..row {
            nodes.insert(node_id(i, j)?, grid[row * i + j]);
        }
    }

    let mut elements = BTreeMap::new();
    for i in 0..ny {
        for j in 0..nx {
            let id = u32::try_from(1 + nx * i + j)
                .map(ElementId::new)
                .map_err(|_| MeshError::id_overflow("numbering ruled mesh elements"))?;
            let n1 = node_id(i, j)?;
            let n2 = node_id(i + 1, j)?;
            let n3 = node_id(i + 1, j + 1)?;
            let n4 = node_id(i, j + 1)?;
            elements.insert(id, Element::quad([n1, n2, n3, n4], property));
        }
    }

    MeshFragment::new(nodes, elements, BTreeMap::from([(property, material)]))
}

/// Node positions in row-major order, row `i` at fraction `i / ny`.
fn node_grid(first: &[DVec3], second: &[DVec3], ny: usize) -> Vec<DVec3> {
    let mut grid = Vec::with_capacity(first.len() * (ny + 1));
    for i in 0..=ny {
        let fraction = i as f64 / ny as f64;
        grid.extend(
            first
                .iter()
                .zip(second)
                .map(|(a, b)| a.lerp(*b, fraction)),
        );
    }
    grid
}

/// Warping coefficient of a quad: `H/2 · (D1 + D2)` where `D1`, `D2` are the
/// diagonal lengths and `H` is half the distance between the diagonal
/// midpoints.
///
/// # Example
///
/// ```rust
/// use fem_mesh::ruled::warp_coefficient;
/// use glam::DVec3;
///
/// let flat = [DVec3::ZERO, DVec3::X, DVec3::new(1.0, 1.0, 0.0), DVec3::Y];
/// assert_eq!(warp_coefficient(flat), 0.0);
/// ```
pub fn warp_coefficient(corners: [DVec3; 4]) -> f64 {
    let [p1, p2, p3, p4] = corners;
    let d1 = p1.distance(p3);
    let d2 = p2.distance(p4);
    let h = 0.5 * ((p1 + p3) * 0.5).distance((p2 + p4) * 0.5);
    h / 2.0 * (d1 + d2)
}

/// Summed warping coefficient of the ruled mesh between two boundaries.
pub fn total_warp(first: &[DVec3], second: &[DVec3], ny: usize) -> f64 {
    if first.len() != second.len() || first.len() < 2 || ny == 0 {
        return 0.0;
    }
    let row = first.len();
    let grid = node_grid(first, second, ny);
    let mut total = 0.0;
    for i in 0..ny {
        for j in 0..row - 1 {
            let n1 = row * i + j;
            let n2 = n1 + row;
            total += warp_coefficient([grid[n1], grid[n2], grid[n2 + 1], grid[n1 + 1]]);
        }
    }
    total
}

/// Endpoint distance check: true when the crossing pairing is shorter than
/// the straight one. `None` when either boundary is closed.
pub fn distance_check(first: &[DVec3], second: &[DVec3]) -> Option<bool> {
    if is_closed(first) || is_closed(second) {
        return None;
    }
    let (a0, a1) = (*first.first()?, *first.last()?);
    let (b0, b1) = (*second.first()?, *second.last()?);
    let straight = a0.distance(b0) + a1.distance(b1);
    let crossing = a0.distance(b1) + a1.distance(b0);
    Some(crossing < straight)
}

/// Warp check: true when reversing the second boundary lowers total warp.
pub fn warp_check(first: &[DVec3], second: &[DVec3], ny: usize) -> bool {
    let reversed: Vec<DVec3> = second.iter().rev().copied().collect();
    total_warp(first, &reversed, ny) < total_warp(first, second, ny)
}

/// Runs the checks selected by `orientation`.
pub fn choose_orientation(
    first: &[DVec3],
    second: &[DVec3],
    ny: usize,
    orientation: Orientation,
    force_flip: bool,
) -> OrientationReport {
    let mut report = OrientationReport::default();
    match orientation {
        Orientation::AsGiven => {}
        Orientation::Distance => {
            report.distance_flip = distance_check(first, second);
            report.flipped = report.distance_flip.unwrap_or(false);
        }
        Orientation::Warp => {
            let warp = warp_check(first, second, ny);
            report.warp_flip = Some(warp);
            report.flipped = warp;
        }
        Orientation::DistanceThenWarp => {
            let warp = warp_check(first, second, ny);
            report.warp_flip = Some(warp);
            report.distance_flip = distance_check(first, second);
            match report.distance_flip {
                Some(distance) => {
                    report.flipped = distance;
                    report.conflict = distance != warp;
                    if report.conflict {
                        log::warn!(
                            "orientation checks disagree: distance says flip = {distance}, \
                             warp says flip = {warp}; keeping the distance verdict"
                        );
                    }
                }
                None => report.flipped = warp,
            }
        }
    }
    if force_flip {
        report.flipped = !report.flipped;
    }
    report
}

#[cfg(test)]
mod tests;
