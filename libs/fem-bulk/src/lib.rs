//! # FEM Bulk Data
//!
//! Serializes a finished mesh fragment into short-field structural bulk data.
//!
//! ## Architecture
//!
//! ```text
//! fem-mesh (MeshFragment) → field (8-character reals) → writer (cards)
//!                                                     → include (SPC1, FORCE, RBE3)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use fem_bulk::field::encode_real;
//!
//! assert_eq!(encode_real(1.0).unwrap(), "1.+0    ");
//! assert_eq!(encode_real(-0.0042).unwrap(), "-.004200");
//! ```

pub mod error;
pub mod field;
pub mod include;
pub mod writer;

pub use error::{BulkError, BulkResult};
pub use writer::{BulkDataWriter, BulkOptions, Mat1};
