//! # FEM Mesher CLI
//!
//! Drives the pipeline from the command line:
//!
//! ```text
//! fem-mesher ruled job.toml -o shell.json
//! fem-mesher thicken shell.json --layers 3 --thickness 0.5 -o solid.json
//! fem-mesher equivalence a.json b.json --tolerance 1e-4 -o joined.json
//! fem-mesher export joined.json solid.json -o model.bdf
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod job;

pub use cli::{Cli, Command};
pub use commands::run;
pub use error::{CliError, CliResult};
