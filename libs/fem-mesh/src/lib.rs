//! # FEM Mesh
//!
//! Finite-element mesh fragments and the pipeline stages that produce and
//! consume them.
//!
//! ## Architecture
//!
//! ```text
//! curve samples → ruled (Quad4) → normals → thicken (Hex8)
//!                               ↘ merge / equivalence → fem-bulk
//! ```
//!
//! Every stage takes fragments by reference and returns a new
//! [`MeshFragment`]; nothing is mutated in place.
//!
//! ## Usage
//!
//! ```rust
//! use fem_mesh::curve::LineCurve;
//! use fem_mesh::ruled::{build_ruled_mesh, RuledMeshParams};
//! use glam::DVec3;
//!
//! let lower = LineCurve::new(DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0));
//! let upper = LineCurve::new(DVec3::new(0.0, 1.0, 0.0), DVec3::new(2.0, 1.0, 0.0));
//! let ruled = build_ruled_mesh(&lower, &upper, &RuledMeshParams::new(2, 2)).unwrap();
//! assert_eq!(ruled.fragment.node_count(), 9);
//! assert_eq!(ruled.fragment.element_count(), 4);
//! ```

pub mod curve;
pub mod element;
pub mod equivalence;
pub mod error;
pub mod fragment;
pub mod ids;
pub mod merge;
pub mod normals;
pub mod ruled;
pub mod spatial;
pub mod thicken;

pub use element::{Dimension, Element, ElementType};
pub use error::{MeshError, MeshResult};
pub use fragment::{FragmentBuilder, MeshFragment};
pub use ids::{ElementId, MaterialId, NodeId, PropertyId};
