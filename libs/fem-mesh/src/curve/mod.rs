//! # Boundary Curves
//!
//! Curves are only ever seen through their samples: given an element count
//! `n`, a [`CurveSampler`] returns `n + 1` ordered points whose first and last
//! entries are the curve's endpoints.
//!
//! [`QuadraticCurve`] fits `f(t) = a·t² + b·t + c` through three points at
//! `t = 0, 0.5, 1`, for boundaries with no external discretizer.

use crate::error::{MeshError, MeshResult};
use config::constants::CURVE_CLOSURE_TOLERANCE;
use glam::{DMat3, DVec3};

/// Source of ordered boundary samples.
pub trait CurveSampler {
    /// Returns `n_elements + 1` points from the start to the end of the curve.
    fn sample(&self, n_elements: usize) -> MeshResult<Vec<DVec3>>;
}

/// Returns true when the first and last samples coincide.
pub fn is_closed(points: &[DVec3]) -> bool {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 1 => {
            first.distance(*last) <= CURVE_CLOSURE_TOLERANCE
        }
        _ => true,
    }
}

fn check_elements(n_elements: usize) -> MeshResult<()> {
    if n_elements == 0 {
        return Err(MeshError::invalid_parameter(
            "n_elements",
            "a curve needs at least one element",
        ));
    }
    Ok(())
}

/// Per-axis coefficients `[a, b, c]` of the quadratic through `p0`, `p1`,
/// `p2` at `t = 0, 0.5, 1`, solved with Cramer's rule.
///
/// # Example
///
/// ```rust
/// use fem_mesh::curve::coefficients;
/// use glam::DVec3;
///
/// let [a, b, c] = coefficients(DVec3::ZERO, DVec3::new(0.5, 0.25, 0.0), DVec3::new(1.0, 1.0, 0.0));
/// assert!((a.y - 1.0).abs() < 1e-12);
/// assert!(b.y.abs() < 1e-12);
/// assert!(c.length() < 1e-12);
/// ```
pub fn coefficients(p0: DVec3, p1: DVec3, p2: DVec3) -> [DVec3; 3] {
    // Columns multiply a, b and c at the three parameter stations.
    let t2 = DVec3::new(0.0, 0.25, 1.0);
    let t1 = DVec3::new(0.0, 0.5, 1.0);
    let t0 = DVec3::ONE;
    let det = DMat3::from_cols(t2, t1, t0).determinant();

    let solve = |values: DVec3| -> DVec3 {
        DVec3::new(
            DMat3::from_cols(values, t1, t0).determinant() / det,
            DMat3::from_cols(t2, values, t0).determinant() / det,
            DMat3::from_cols(t2, t1, values).determinant() / det,
        )
    };

    let [ax, bx, cx] = solve(DVec3::new(p0.x, p1.x, p2.x)).to_array();
    let [ay, by, cy] = solve(DVec3::new(p0.y, p1.y, p2.y)).to_array();
    let [az, bz, cz] = solve(DVec3::new(p0.z, p1.z, p2.z)).to_array();
    [
        DVec3::new(ax, ay, az),
        DVec3::new(bx, by, bz),
        DVec3::new(cx, cy, cz),
    ]
}

/// Quadratic space curve through three points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticCurve {
    a: DVec3,
    b: DVec3,
    c: DVec3,
}

impl QuadraticCurve {
    /// Fits the curve through start, middle and end points.
    pub fn fit(start: DVec3, middle: DVec3, end: DVec3) -> Self {
        let [a, b, c] = coefficients(start, middle, end);
        Self { a, b, c }
    }

    /// Coefficients `[a, b, c]`.
    pub fn coefficients(&self) -> [DVec3; 3] {
        [self.a, self.b, self.c]
    }

    /// Point at parameter `t`.
    #[inline]
    pub fn evaluate(&self, t: f64) -> DVec3 {
        self.a * (t * t) + self.b * t + self.c
    }
}

impl CurveSampler for QuadraticCurve {
    fn sample(&self, n_elements: usize) -> MeshResult<Vec<DVec3>> {
        check_elements(n_elements)?;
        Ok((0..=n_elements)
            .map(|i| self.evaluate(i as f64 / n_elements as f64))
            .collect())
    }
}

/// Straight segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineCurve {
    pub start: DVec3,
    pub end: DVec3,
}

impl LineCurve {
    pub fn new(start: DVec3, end: DVec3) -> Self {
        Self { start, end }
    }
}

impl CurveSampler for LineCurve {
    fn sample(&self, n_elements: usize) -> MeshResult<Vec<DVec3>> {
        check_elements(n_elements)?;
        Ok((0..=n_elements)
            .map(|i| self.start.lerp(self.end, i as f64 / n_elements as f64))
            .collect())
    }
}

/// Points already sampled by an external discretizer.
///
/// Sampling only succeeds for the element count the points were produced for.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<DVec3>,
}

impl Polyline {
    pub fn new(points: Vec<DVec3>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// Element count the samples correspond to.
    pub fn element_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }
}

impl CurveSampler for Polyline {
    fn sample(&self, n_elements: usize) -> MeshResult<Vec<DVec3>> {
        check_elements(n_elements)?;
        if self.points.len() != n_elements + 1 {
            return Err(MeshError::CurveSampleMismatch {
                first: self.points.len(),
                second: n_elements + 1,
            });
        }
        Ok(self.points.clone())
    }
}
