//! # Ruled Mesh Jobs
//!
//! A job file lists ruled meshes as `[[ruled]]` tables:
//!
//! ```toml
//! [[ruled]]
//! curve1 = [[0.0, 0.0, 0.0], [4.0, 0.0, 0.0]]
//! curve2 = [[0.0, 2.0, 0.0], [2.0, 2.5, 0.0], [4.0, 2.0, 0.0]]
//! nx = 8
//! ny = 3
//! orientation = "distance-then-warp"   # as-given | distance | warp
//! force_flip = false
//! ```
//!
//! Two points make a straight line, three a quadratic through them, more a
//! pre-sampled polyline. `nx` may be left out when either curve is a
//! polyline; it then follows the polyline's point count.

use crate::error::{CliError, CliResult};
use fem_mesh::curve::{CurveSampler, LineCurve, Polyline, QuadraticCurve};
use fem_mesh::ruled::{build_ruled_mesh, Orientation, RuledMesh, RuledMeshParams};
use glam::DVec3;
use serde::Deserialize;

/// Top level of a job file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobFile {
    #[serde(default)]
    pub ruled: Vec<RuledJob>,
}

impl JobFile {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Orientation names accepted in job files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrientationSetting {
    AsGiven,
    Distance,
    Warp,
    #[default]
    DistanceThenWarp,
}

impl From<OrientationSetting> for Orientation {
    fn from(setting: OrientationSetting) -> Self {
        match setting {
            OrientationSetting::AsGiven => Orientation::AsGiven,
            OrientationSetting::Distance => Orientation::Distance,
            OrientationSetting::Warp => Orientation::Warp,
            OrientationSetting::DistanceThenWarp => Orientation::DistanceThenWarp,
        }
    }
}

/// One ruled mesh between two boundaries.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuledJob {
    pub curve1: Vec<[f64; 3]>,
    pub curve2: Vec<[f64; 3]>,
    pub nx: Option<usize>,
    pub ny: usize,
    #[serde(default)]
    pub orientation: OrientationSetting,
    #[serde(default)]
    pub force_flip: bool,
}

fn to_points(raw: &[[f64; 3]]) -> Vec<DVec3> {
    raw.iter().map(|&p| DVec3::from_array(p)).collect()
}

/// Curve for a point list, by its length.
pub fn curve_from_points(points: &[DVec3]) -> Option<Box<dyn CurveSampler>> {
    let curve: Box<dyn CurveSampler> = match *points {
        [] | [_] => return None,
        [start, end] => Box::new(LineCurve::new(start, end)),
        [start, middle, end] => Box::new(QuadraticCurve::fit(start, middle, end)),
        _ => Box::new(Polyline::new(points.to_vec())),
    };
    Some(curve)
}

impl RuledJob {
    /// Elements along the boundaries: `nx` when given, else from a polyline.
    pub fn element_count(&self) -> Option<usize> {
        self.nx.or_else(|| {
            [&self.curve1, &self.curve2]
                .into_iter()
                .find(|c| c.len() > 3)
                .map(|c| c.len() - 1)
        })
    }

    /// Builds the ruled mesh; `job` is the 1-based position used in errors.
    pub fn build(&self, job: usize) -> CliResult<RuledMesh> {
        let first = curve_from_points(&to_points(&self.curve1))
            .ok_or_else(|| CliError::invalid_job(job, "curve1 needs at least two points"))?;
        let second = curve_from_points(&to_points(&self.curve2))
            .ok_or_else(|| CliError::invalid_job(job, "curve2 needs at least two points"))?;
        let nx = self.element_count().ok_or_else(|| {
            CliError::invalid_job(job, "nx is required unless a curve is a polyline")
        })?;

        let params = RuledMeshParams {
            orientation: self.orientation.into(),
            force_flip: self.force_flip,
            ..RuledMeshParams::new(nx, self.ny)
        };
        let ruled = build_ruled_mesh(&*first, &*second, &params)?;
        log::info!(
            "Ruled job {job}: {} quads, curve 2 {}",
            ruled.fragment.element_count(),
            if ruled.report.flipped { "reversed" } else { "as given" }
        );
        Ok(ruled)
    }
}
