//! # Bulk Data Writer
//!
//! Serializes a [`MeshFragment`] into short-field cards.
//!
//! ## Layout
//!
//! ```text
//! BEGIN BULK
//!
//! PSHELL / PSOLID   one per property used by an element
//!
//! MAT1              one per material of those properties
//!
//! CQUAD4 / CHEXA / CPENTA / CTETRA   ascending element ID
//!
//! GRID              ascending node ID
//! ENDDATA
//! ```
//!
//! A card carries its keyword plus up to [`FIELDS_PER_LINE`] data fields per
//! line. Further fields go on continuation lines whose first field is blank,
//! so `CHEXA` and `CTETRA` take two lines.

use crate::error::{BulkError, BulkResult};
use crate::field::{blank, encode_real, id_field, is_valid_real, parse_real, text_field};
use config::constants::{
    DEFAULT_DENSITY, DEFAULT_POISSON_RATIO, DEFAULT_YOUNGS_MODULUS, FIELDS_PER_LINE,
};
use fem_mesh::merge::merge_fragments;
use fem_mesh::{Dimension, ElementType, MaterialId, MeshError, MeshFragment, PropertyId};
use glam::DVec3;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Header sentinel.
pub const BEGIN_BULK: &str = "BEGIN BULK";

/// Trailer sentinel.
pub const ENDDATA: &str = "ENDDATA";

// =============================================================================
// Options
// =============================================================================

/// Isotropic material values of one `MAT1` card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat1 {
    pub youngs_modulus: f64,
    /// Left blank when `None`; the solver derives it from E and NU.
    pub shear_modulus: Option<f64>,
    pub poisson_ratio: f64,
    pub density: f64,
}

impl Default for Mat1 {
    fn default() -> Self {
        Self {
            youngs_modulus: DEFAULT_YOUNGS_MODULUS,
            shear_modulus: None,
            poisson_ratio: DEFAULT_POISSON_RATIO,
            density: DEFAULT_DENSITY,
        }
    }
}

impl Mat1 {
    /// Parses an abridged material label `[name]MAT1_E_G_NU_RHO`.
    ///
    /// G may be empty; every other value must be a short-format real.
    ///
    /// ```rust
    /// use fem_bulk::Mat1;
    ///
    /// let steel = Mat1::from_label("steel MAT1_2.1E11__.3_7850.").unwrap();
    /// assert_eq!(steel.shear_modulus, None);
    /// assert_eq!(steel.poisson_ratio, 0.3);
    /// ```
    pub fn from_label(label: &str) -> BulkResult<Self> {
        let fields: Vec<&str> = label.split('_').collect();
        let [head, e, g, nu, rho] = fields[..] else {
            return Err(BulkError::invalid_label(label, "expected MAT1_E_G_NU_RHO"));
        };
        if !head.contains("MAT1") {
            return Err(BulkError::invalid_label(label, "first field must contain MAT1"));
        }
        let real = |text: &str, what: &str| {
            if is_valid_real(text) {
                parse_real(text).ok_or_else(|| BulkError::invalid_label(label, what))
            } else {
                Err(BulkError::invalid_label(label, what))
            }
        };
        let shear_modulus = if g.is_empty() {
            None
        } else {
            Some(real(g, "shear modulus is not a real")?)
        };
        Ok(Self {
            youngs_modulus: real(e, "Young's modulus is not a real")?,
            shear_modulus,
            poisson_ratio: real(nu, "Poisson's ratio is not a real")?,
            density: real(rho, "density is not a real")?,
        })
    }
}

/// Writer options.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BulkOptions {
    /// Values for materials without an entry in `materials`.
    pub material: Mat1,
    pub materials: BTreeMap<MaterialId, Mat1>,
    /// Membrane thickness for `PSHELL` cards. Without it the card carries
    /// only the property and material IDs.
    pub shell_thickness: Option<f64>,
}

impl BulkOptions {
    /// Values written on the `MAT1` card of `material`.
    pub fn material(&self, material: MaterialId) -> &Mat1 {
        self.materials.get(&material).unwrap_or(&self.material)
    }
}

// =============================================================================
// Cards
// =============================================================================

/// One card under construction.
#[derive(Debug, Clone)]
pub(crate) struct Card {
    keyword: String,
    fields: Vec<String>,
}

impl Card {
    pub(crate) fn new(keyword: &str) -> BulkResult<Self> {
        Ok(Self {
            keyword: text_field(keyword)?,
            fields: Vec::new(),
        })
    }

    pub(crate) fn id(&mut self, id: impl Into<u32>) -> BulkResult<&mut Self> {
        self.fields.push(id_field(id)?);
        Ok(self)
    }

    pub(crate) fn real(&mut self, value: f64) -> BulkResult<&mut Self> {
        self.fields.push(encode_real(value)?);
        Ok(self)
    }

    pub(crate) fn text(&mut self, text: &str) -> BulkResult<&mut Self> {
        self.fields.push(text_field(text)?);
        Ok(self)
    }

    pub(crate) fn blank(&mut self) -> &mut Self {
        self.fields.push(blank());
        self
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        let mut chunks = self.fields.chunks(FIELDS_PER_LINE);
        let mut lines = Vec::new();
        let first = chunks.next().map(|c| c.concat()).unwrap_or_default();
        lines.push(format!("{}{first}", self.keyword));
        for chunk in chunks {
            lines.push(format!("{}{}", blank(), chunk.concat()));
        }
        lines
    }
}

pub(crate) fn grid_card(id: u32, position: DVec3) -> BulkResult<Vec<String>> {
    let mut card = Card::new("GRID")?;
    card.id(id)?
        .blank()
        .real(position.x)?
        .real(position.y)?
        .real(position.z)?;
    Ok(card.lines())
}

fn keyword(kind: ElementType) -> Option<&'static str> {
    match kind {
        ElementType::Quad4 => Some("CQUAD4"),
        ElementType::Hex8 => Some("CHEXA"),
        ElementType::Penta6 => Some("CPENTA"),
        ElementType::Tetra10 => Some("CTETRA"),
        ElementType::Bar2 | ElementType::Tria3 => None,
    }
}

/// Property card keyword for the dimension of its elements.
fn property_keyword(dimension: Dimension) -> Option<&'static str> {
    match dimension {
        Dimension::Surface => Some("PSHELL"),
        Dimension::Volume => Some("PSOLID"),
        Dimension::Point | Dimension::Line => None,
    }
}

// =============================================================================
// Writer
// =============================================================================

/// Writes fragments as short-field bulk data.
#[derive(Debug, Clone, Default)]
pub struct BulkDataWriter {
    options: BulkOptions,
}

impl BulkDataWriter {
    pub fn new(options: BulkOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BulkOptions {
        &self.options
    }

    /// Renders the complete line sequence for `fragment`.
    ///
    /// Fails before producing any line when an element has no card or a
    /// property mixes element dimensions.
    pub fn lines(&self, fragment: &MeshFragment) -> BulkResult<Vec<String>> {
        let properties = Self::property_table(fragment)?;

        let mut lines = vec![BEGIN_BULK.to_string(), String::new()];

        for (&property, &(dimension, material)) in &properties {
            let Some(name) = property_keyword(dimension) else {
                continue;
            };
            let mut card = Card::new(name)?;
            card.id(property)?.id(material)?;
            if dimension == Dimension::Surface {
                if let Some(thickness) = self.options.shell_thickness {
                    card.real(thickness)?.id(material)?;
                }
            }
            lines.extend(card.lines());
        }
        lines.push(String::new());

        let materials: BTreeSet<MaterialId> = properties.values().map(|&(_, m)| m).collect();
        for material in materials {
            let mat = self.options.material(material);
            let mut card = Card::new("MAT1")?;
            card.id(material)?.real(mat.youngs_modulus)?;
            match mat.shear_modulus {
                Some(g) => card.real(g)?,
                None => card.blank(),
            };
            card.real(mat.poisson_ratio)?.real(mat.density)?;
            lines.extend(card.lines());
        }
        lines.push(String::new());

        for (&id, element) in fragment.elements() {
            let name = keyword(element.kind).ok_or(BulkError::UnsupportedElementType {
                element: id,
                element_type: element.kind,
            })?;
            let mut card = Card::new(name)?;
            card.id(id)?.id(element.property)?;
            for &node in &element.nodes {
                card.id(node)?;
            }
            lines.extend(card.lines());
        }
        lines.push(String::new());

        for (&id, &position) in fragment.nodes() {
            lines.extend(grid_card(id.get(), position)?);
        }
        lines.push(ENDDATA.to_string());

        log::info!(
            "Bulk data: {} properties, {} elements, {} grids, {} lines",
            properties.len(),
            fragment.element_count(),
            fragment.node_count(),
            lines.len()
        );
        Ok(lines)
    }

    /// Dimension and material of every property used by an element.
    fn property_table(
        fragment: &MeshFragment,
    ) -> BulkResult<BTreeMap<PropertyId, (Dimension, MaterialId)>> {
        let mut table: BTreeMap<PropertyId, (Dimension, MaterialId)> = BTreeMap::new();
        for (&id, element) in fragment.elements() {
            if keyword(element.kind).is_none() {
                return Err(BulkError::UnsupportedElementType {
                    element: id,
                    element_type: element.kind,
                });
            }
            let dimension = element.kind.dimension();
            let material =
                fragment
                    .material_of(element.property)
                    .ok_or(MeshError::MissingProperty {
                        element: id,
                        property: element.property,
                    })?;
            match table.get(&element.property) {
                Some(&(seen, _)) if seen != dimension => {
                    return Err(BulkError::MixedPropertyDimension {
                        property: element.property,
                    });
                }
                Some(_) => {}
                None => {
                    table.insert(element.property, (dimension, material));
                }
            }
        }
        Ok(table)
    }

    /// Writes every line of `fragment` to `out`, newline terminated.
    pub fn write<W: Write>(&self, fragment: &MeshFragment, out: W) -> BulkResult<()> {
        write_lines(&self.lines(fragment)?, out)
    }

    /// Writes `fragment` to a file at `path`, replacing it.
    ///
    /// The lines are rendered before the file is created, so a rejected
    /// fragment leaves no partial file behind.
    pub fn save(&self, fragment: &MeshFragment, path: impl AsRef<Path>) -> BulkResult<()> {
        save_lines(&self.lines(fragment)?, path)
    }
}

/// Writes `lines` to `out`, newline terminated.
pub fn write_lines<W: Write>(lines: &[String], mut out: W) -> BulkResult<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}

/// Writes `lines` to a file at `path`, replacing it.
pub fn save_lines(lines: &[String], path: impl AsRef<Path>) -> BulkResult<()> {
    let path = path.as_ref();
    write_lines(lines, BufWriter::new(File::create(path)?))?;
    log::debug!("Wrote {} lines to {}", lines.len(), path.display());
    Ok(())
}

/// Writes `fragment` to any writer.
pub fn write_bulk<W: Write>(out: W, fragment: &MeshFragment, options: &BulkOptions) -> BulkResult<()> {
    BulkDataWriter::new(options.clone()).write(fragment, out)
}

/// Writes `fragment` to a file.
pub fn write_bulk_file(
    path: impl AsRef<Path>,
    fragment: &MeshFragment,
    options: &BulkOptions,
) -> BulkResult<()> {
    BulkDataWriter::new(options.clone()).save(fragment, path)
}

/// Merges `fragments` and renders the result.
pub fn export(fragments: &[MeshFragment], options: &BulkOptions) -> BulkResult<Vec<String>> {
    let merged = merge_fragments(fragments)?;
    BulkDataWriter::new(options.clone()).lines(&merged.fragment)
}
