//! # Subcommands
//!
//! Each command reads its inputs, runs one pipeline stage and writes the
//! result. Fragments travel between commands as JSON.

use crate::cli::{Cli, Command};
use crate::error::{CliError, CliResult};
use crate::job::JobFile;
use config::constants::MesherConfig;
use fem_bulk::include::{node_set_within, rbe3_within_sphere};
use fem_bulk::writer::{save_lines, write_bulk_file, BulkOptions};
use fem_bulk::Mat1;
use fem_mesh::equivalence::equivalence;
use fem_mesh::merge::merge_fragments;
use fem_mesh::thicken::{thicken_shell, ThickenParams};
use fem_mesh::{MaterialId, MeshError, MeshFragment};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub fn read_fragment(path: &Path) -> CliResult<MeshFragment> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(MeshFragment::from_json(&text)?)
}

pub fn write_fragment(path: &Path, fragment: &MeshFragment) -> CliResult<()> {
    let text = fragment.to_json()?;
    fs::write(path, text).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!(
        "Wrote {} nodes and {} elements to {}",
        fragment.node_count(),
        fragment.element_count(),
        path.display()
    );
    Ok(())
}

fn read_fragments(paths: &[PathBuf]) -> CliResult<Vec<MeshFragment>> {
    paths.iter().map(|p| read_fragment(p)).collect()
}

/// Builds every job of a job file and merges the results.
pub fn ruled(job: &Path) -> CliResult<MeshFragment> {
    let text = fs::read_to_string(job).map_err(|source| CliError::Read {
        path: job.to_path_buf(),
        source,
    })?;
    let jobs = JobFile::from_toml_str(&text).map_err(|source| CliError::JobFile {
        path: job.to_path_buf(),
        source,
    })?;
    if jobs.ruled.is_empty() {
        return Err(MeshError::empty_input("job file has no [[ruled]] entries").into());
    }
    let fragments = jobs
        .ruled
        .iter()
        .enumerate()
        .map(|(i, job)| job.build(i + 1).map(|ruled| ruled.fragment))
        .collect::<CliResult<Vec<_>>>()?;
    Ok(merge_fragments(&fragments)?.fragment)
}

/// Command-line overrides applied on top of the defaults.
pub fn mesher_config(
    tolerance: Option<f64>,
    layers: Option<u32>,
    thickness: Option<f64>,
) -> CliResult<MesherConfig> {
    let defaults = MesherConfig::default();
    Ok(MesherConfig::new(
        tolerance.unwrap_or(defaults.tolerance),
        layers.unwrap_or(defaults.layers),
        thickness.unwrap_or(defaults.thickness),
    )?)
}

/// Export options with per-material `MAT1` labels applied.
pub fn bulk_options(
    shell_thickness: Option<f64>,
    materials: &[(u32, String)],
) -> CliResult<BulkOptions> {
    let materials = materials
        .iter()
        .map(|(id, label)| Mat1::from_label(label).map(|mat| (MaterialId::new(*id), mat)))
        .collect::<Result<BTreeMap<_, _>, _>>()?;
    Ok(BulkOptions {
        shell_thickness,
        materials,
        ..BulkOptions::default()
    })
}

/// Runs one parsed command line.
pub fn run(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Command::Ruled { job, output } => write_fragment(output, &ruled(job)?),
        Command::Thicken {
            input,
            layers,
            thickness,
            output,
        } => {
            let config = mesher_config(None, *layers, *thickness)?;
            let params = ThickenParams::new(config.layers, config.thickness);
            let solid = thicken_shell(&read_fragment(input)?, &params)?;
            write_fragment(output, &solid)
        }
        Command::Flip { input, output } => {
            write_fragment(output, &read_fragment(input)?.flipped_normals())
        }
        Command::Equivalence {
            inputs,
            tolerance,
            output,
        } => {
            let config = mesher_config(*tolerance, None, None)?;
            let joined = equivalence(&read_fragments(inputs)?, config.tolerance)?;
            log::info!(
                "Equivalenced {} node pairs, removed {} nodes",
                joined.replaced.len(),
                joined.removed_nodes
            );
            write_fragment(output, &joined.fragment)
        }
        Command::Export {
            inputs,
            shell_thickness,
            materials,
            output,
        } => {
            let options = bulk_options(*shell_thickness, materials)?;
            let merged = merge_fragments(&read_fragments(inputs)?)?;
            write_bulk_file(output, &merged.fragment, &options)?;
            log::info!("Wrote bulk data to {}", output.display());
            Ok(())
        }
        Command::NodeSet {
            input,
            label,
            center,
            radius,
            output,
        } => {
            let lines = node_set_within(&read_fragment(input)?, label, *center, *radius)?;
            save_lines(&lines, output)?;
            log::info!("Wrote {} cards to {}", lines.len(), output.display());
            Ok(())
        }
        Command::Spider {
            input,
            center,
            radius,
            output,
        } => {
            let spider = rbe3_within_sphere(&read_fragment(input)?, *center, *radius)?;
            save_lines(&spider.lines()?, output)?;
            log::info!(
                "Wrote RBE3 {} over {} nodes to {}",
                spider.element,
                spider.nodes.len(),
                output.display()
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    struct Scratch(PathBuf);

    impl Scratch {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir().join(format!("fem-cli-{}-{name}", std::process::id()));
            fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }

        fn path(&self, file: &str) -> PathBuf {
            self.0.join(file)
        }

        fn arg(&self, file: &str) -> String {
            self.path(file).display().to_string()
        }
    }

    impl Drop for Scratch {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    const STRIPS: &str = r#"
[[ruled]]
curve1 = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]
curve2 = [[0.0, 1.0, 0.0], [1.0, 1.0, 0.0]]
nx = 2
ny = 1

[[ruled]]
curve1 = [[1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]
curve2 = [[1.0, 1.0, 0.0], [2.0, 1.0, 0.0]]
nx = 2
ny = 1
"#;

    fn invoke(args: &[&str]) -> CliResult<()> {
        let cli = Cli::try_parse_from(std::iter::once("fem-mesher").chain(args.iter().copied()))
            .unwrap();
        run(&cli)
    }

    #[test]
    fn test_ruled_then_export() {
        let scratch = Scratch::new("ruled-export");
        fs::write(scratch.path("job.toml"), STRIPS).unwrap();

        invoke(&["ruled", &scratch.arg("job.toml"), "-o", &scratch.arg("shell.json")]).unwrap();
        let shell = read_fragment(&scratch.path("shell.json")).unwrap();
        assert_eq!(shell.element_count(), 4);
        assert_eq!(shell.node_count(), 12);

        invoke(&["export", &scratch.arg("shell.json"), "-o", &scratch.arg("shell.bdf")]).unwrap();
        let bulk = fs::read_to_string(scratch.path("shell.bdf")).unwrap();
        assert!(bulk.starts_with("BEGIN BULK\n"));
        assert!(bulk.ends_with("ENDDATA\n"));
        assert_eq!(bulk.lines().filter(|l| l.starts_with("PSHELL")).count(), 2);
    }

    #[test]
    fn test_thicken_flip_and_equivalence() {
        let scratch = Scratch::new("thicken");
        fs::write(scratch.path("job.toml"), STRIPS).unwrap();
        invoke(&["ruled", &scratch.arg("job.toml"), "-o", &scratch.arg("shell.json")]).unwrap();

        invoke(&[
            "thicken",
            &scratch.arg("shell.json"),
            "--layers",
            "2",
            "--thickness",
            "0.5",
            "-o",
            &scratch.arg("solid.json"),
        ])
        .unwrap();
        let solid = read_fragment(&scratch.path("solid.json")).unwrap();
        assert_eq!(solid.element_count(), 8);
        assert_eq!(solid.node_count(), 36);

        invoke(&["flip", &scratch.arg("shell.json"), "-o", &scratch.arg("flipped.json")]).unwrap();
        let shell = read_fragment(&scratch.path("shell.json")).unwrap();
        let flipped = read_fragment(&scratch.path("flipped.json")).unwrap();
        assert_eq!(flipped, shell.flipped_normals());

        let err = invoke(&[
            "equivalence",
            &scratch.arg("shell.json"),
            &scratch.arg("flipped.json"),
            "--tolerance",
            "1e-6",
            "-o",
            &scratch.arg("joined.json"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            CliError::Mesh(MeshError::ToleranceCollapse { .. })
        ));
        assert!(!scratch.path("joined.json").exists());
    }

    #[test]
    fn test_export_with_material_label() {
        let scratch = Scratch::new("material");
        fs::write(scratch.path("job.toml"), STRIPS).unwrap();
        invoke(&["ruled", &scratch.arg("job.toml"), "-o", &scratch.arg("shell.json")]).unwrap();

        invoke(&[
            "export",
            &scratch.arg("shell.json"),
            "--material",
            "2=MAT1_2.1E11__.3_7850.",
            "-o",
            &scratch.arg("shell.bdf"),
        ])
        .unwrap();
        let bulk = fs::read_to_string(scratch.path("shell.bdf")).unwrap();
        assert!(bulk.contains("MAT1    1       1.+7    "));
        assert!(bulk.contains("MAT1    2       2.100+11        .30000007850.000"));

        let err = bulk_options(None, &[(1, "MAT1_steel".to_string())]).unwrap_err();
        assert!(matches!(
            err,
            CliError::Bulk(fem_bulk::BulkError::InvalidLabel { .. })
        ));
    }

    #[test]
    fn test_node_set_and_spider_includes() {
        let scratch = Scratch::new("include");
        fs::write(scratch.path("job.toml"), STRIPS).unwrap();
        invoke(&["ruled", &scratch.arg("job.toml"), "-o", &scratch.arg("shell.json")]).unwrap();

        invoke(&[
            "node-set",
            &scratch.arg("shell.json"),
            "--label",
            "root:SPC1_1_123456",
            "--center",
            "0,0,0",
            "--radius",
            "0.1",
            "-o",
            &scratch.arg("spc.bdf"),
        ])
        .unwrap();
        let spc = fs::read_to_string(scratch.path("spc.bdf")).unwrap();
        assert_eq!(spc, "SPC1    1       123456  1       \n");

        invoke(&[
            "spider",
            &scratch.arg("shell.json"),
            "--center",
            "1,0.5,0",
            "--radius",
            "0.6",
            "-o",
            &scratch.arg("spider.bdf"),
        ])
        .unwrap();
        let spider = fs::read_to_string(scratch.path("spider.bdf")).unwrap();
        let lines: Vec<&str> = spider.lines().collect();
        assert_eq!(
            lines,
            vec![
                "GRID    13              1.+0    .5000000 0.0    ",
                "RBE3    5               13      123456  1.+0    123     3       6       ",
                "        7       10      ",
            ]
        );

        let err = invoke(&[
            "spider",
            &scratch.arg("shell.json"),
            "--center",
            "9,9,9",
            "--radius",
            "0.5",
            "-o",
            &scratch.arg("none.bdf"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            CliError::Bulk(fem_bulk::BulkError::EmptySelection { .. })
        ));
        assert!(!scratch.path("none.bdf").exists());
    }

    #[test]
    fn test_invalid_overrides() {
        assert!(matches!(
            mesher_config(None, Some(0), None),
            Err(CliError::Config(_))
        ));
        assert!(matches!(
            mesher_config(Some(-1.0), None, None),
            Err(CliError::Config(_))
        ));
        let config = mesher_config(None, Some(4), Some(-2.0)).unwrap();
        assert_eq!((config.layers, config.thickness), (4, -2.0));
    }

    #[test]
    fn test_missing_input_names_the_path() {
        let err = read_fragment(Path::new("/nonexistent/fragment.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/fragment.json"));
    }

    #[test]
    fn test_empty_job_file() {
        let scratch = Scratch::new("empty-job");
        fs::write(scratch.path("job.toml"), "").unwrap();
        assert!(matches!(
            ruled(&scratch.path("job.toml")),
            Err(CliError::Mesh(MeshError::EmptyInput { .. }))
        ));
    }
}
