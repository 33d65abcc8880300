//! Command-line arguments.

use clap::{Parser, Subcommand};
use glam::DVec3;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "fem-mesher", version, about = "Ruled meshing, thickening and bulk-data export")]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the ruled meshes of a TOML job file and merge them
    Ruled {
        job: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Extrude a quad shell into hexahedral layers along its node normals
    Thicken {
        input: PathBuf,
        #[arg(long)]
        layers: Option<u32>,
        /// Total thickness; negative extrudes against the normals
        #[arg(long, allow_negative_numbers = true)]
        thickness: Option<f64>,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Reverse the node order of every shell element
    Flip {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Merge coincident nodes of different fragments
    Equivalence {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(long)]
        tolerance: Option<f64>,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Merge fragments and write short-field bulk data
    Export {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// PSHELL membrane thickness
        #[arg(long)]
        shell_thickness: Option<f64>,
        /// MAT1 values for one material, e.g. `2=MAT1_2.1E11__.3_7850.`
        #[arg(long = "material", value_name = "MID=LABEL", value_parser = parse_material)]
        materials: Vec<(u32, String)>,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write SPC1 or FORCE include cards for the nodes inside a sphere
    NodeSet {
        input: PathBuf,
        /// `SPC1_SID_C` or `FORCE_SID_SCALE_VX_VY_VZ`
        #[arg(long)]
        label: String,
        #[arg(
            long,
            value_name = "X,Y,Z",
            value_parser = parse_point,
            allow_hyphen_values = true
        )]
        center: DVec3,
        #[arg(long)]
        radius: f64,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write an RBE3 spider from a new centre grid to the nodes inside a sphere
    Spider {
        input: PathBuf,
        #[arg(
            long,
            value_name = "X,Y,Z",
            value_parser = parse_point,
            allow_hyphen_values = true
        )]
        center: DVec3,
        #[arg(long)]
        radius: f64,
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Parses `x,y,z`.
fn parse_point(text: &str) -> Result<DVec3, String> {
    let values = text
        .split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("{v:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match values[..] {
        [x, y, z] => Ok(DVec3::new(x, y, z)),
        _ => Err(format!("expected three comma-separated values, got {}", values.len())),
    }
}

/// Parses `MID=LABEL`.
fn parse_material(text: &str) -> Result<(u32, String), String> {
    let (id, label) = text
        .split_once('=')
        .ok_or_else(|| format!("expected MID=LABEL, got {text:?}"))?;
    let id: u32 = id.trim().parse().map_err(|e| format!("material ID {id:?}: {e}"))?;
    Ok((id, label.to_string()))
}

impl Cli {
    /// Log filter used when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
