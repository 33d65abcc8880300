//! # Config Crate
//!
//! Centralized configuration constants for the finite-element mesh pipeline.
//! Field widths, numeric encoder thresholds, meshing defaults and material
//! defaults live here so the mesh and bulk-data crates agree on them.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{DEFAULT_EQUIVALENCE_TOLERANCE, FIELD_WIDTH};
//!
//! let field = format!("{:<width$}", "GRID", width = FIELD_WIDTH);
//! assert_eq!(field.len(), 8);
//! assert!(DEFAULT_EQUIVALENCE_TOLERANCE > 0.0);
//! ```

pub mod constants;
