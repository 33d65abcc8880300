//! # Configuration Constants
//!
//! Shared literals for the mesh pipeline, grouped by the stage that consumes
//! them.
//!
//! ## Categories
//!
//! - **Fields**: Short-field bulk-data layout and the real-number encoder
//! - **Geometry**: Degeneracy and closure tolerances
//! - **Meshing**: Equivalencing and thickening defaults
//! - **Materials**: Default linear-elastic card values

use std::fmt;

// =============================================================================
// FIELD CONSTANTS
// =============================================================================

/// Width of one short-format bulk-data field.
///
/// # Examples
/// ```
/// use config::constants::FIELD_WIDTH;
/// assert_eq!(FIELD_WIDTH, 8);
/// ```
pub const FIELD_WIDTH: usize = 8;

/// Number of data fields that follow the keyword on one short-format line.
pub const FIELDS_PER_LINE: usize = 8;

/// Decimal digits kept before a real is rendered in fixed-point form.
///
/// # Examples
/// ```
/// use config::constants::FIXED_POINT_DECIMALS;
/// let rounded = format!("{:.*}", FIXED_POINT_DECIMALS, 0.123456789);
/// assert_eq!(rounded, "0.1234568");
/// ```
pub const FIXED_POINT_DECIMALS: usize = 7;

/// Smallest decimal order (`ceil(log10(|x|))`) at which a positive real
/// switches to exponential form.
pub const POSITIVE_EXPONENT_ORDER: i32 = 7;

/// Smallest decimal order at which a negative real switches to exponential
/// form. One lower than the positive threshold because the sign takes a column.
pub const NEGATIVE_EXPONENT_ORDER: i32 = 6;

/// Orders below this value are rendered in exponential form.
///
/// # Examples
/// ```
/// use config::constants::SMALL_EXPONENT_ORDER;
/// let order = (0.0001_f64).log10().ceil() as i32;
/// assert!(order < SMALL_EXPONENT_ORDER);
/// ```
pub const SMALL_EXPONENT_ORDER: i32 = -2;

/// Magnitude above which rounding to [`FIXED_POINT_DECIMALS`] is skipped; the
/// scaled value would exceed the exactly representable integer range.
pub const ROUNDING_LIMIT: f64 = 1.0e8;

// =============================================================================
// GEOMETRY CONSTANTS
// =============================================================================

/// Squared-length threshold below which a summed normal vector is treated as
/// zero.
///
/// # Examples
/// ```
/// use config::constants::NORMAL_EPSILON;
/// assert!(NORMAL_EPSILON < 1.0e-12);
/// ```
pub const NORMAL_EPSILON: f64 = 1.0e-20;

/// Distance under which the first and last sample of a curve are the same
/// point, making the curve closed.
pub const CURVE_CLOSURE_TOLERANCE: f64 = 1.0e-9;

/// Lower bound for spatial hash cell edges so that a zero tolerance still
/// yields a usable grid.
pub const MIN_CELL_SIZE: f64 = 1.0e-9;

// =============================================================================
// MESHING DEFAULTS
// =============================================================================

/// Default node equivalencing distance.
///
/// # Examples
/// ```
/// use config::constants::DEFAULT_EQUIVALENCE_TOLERANCE;
/// assert_eq!(DEFAULT_EQUIVALENCE_TOLERANCE, 1.0e-4);
/// ```
pub const DEFAULT_EQUIVALENCE_TOLERANCE: f64 = 1.0e-4;

/// Default number of solid layers produced by shell thickening.
pub const DEFAULT_LAYERS: u32 = 3;

/// Default total thickness for shell thickening.
pub const DEFAULT_THICKNESS: f64 = 1.0;

// =============================================================================
// MATERIAL DEFAULTS
// =============================================================================

/// Default Young's modulus written on MAT1 cards.
pub const DEFAULT_YOUNGS_MODULUS: f64 = 10.0e6;

/// Default Poisson's ratio written on MAT1 cards.
pub const DEFAULT_POISSON_RATIO: f64 = 0.33;

/// Default mass density written on MAT1 cards.
pub const DEFAULT_DENSITY: f64 = 0.1;

/// Run-time meshing parameters shared by the command line and library callers.
///
/// # Examples
/// ```
/// use config::constants::MesherConfig;
/// let config = MesherConfig::default();
/// assert_eq!(config.layers, 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MesherConfig {
    /// Distance under which nodes of different fragments are merged.
    pub tolerance: f64,
    /// Number of solid layers produced by thickening.
    pub layers: u32,
    /// Total thickness produced by thickening.
    pub thickness: f64,
}

impl MesherConfig {
    /// Builds a configuration, rejecting values no pipeline stage accepts.
    ///
    /// # Examples
    /// ```
    /// use config::constants::MesherConfig;
    /// let cfg = MesherConfig::new(0.01, 2, 0.5).expect("valid config");
    /// assert_eq!(cfg.layers, 2);
    /// assert!(MesherConfig::new(0.01, 0, 0.5).is_err());
    /// ```
    pub fn new(tolerance: f64, layers: u32, thickness: f64) -> Result<Self, ConfigError> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance(tolerance));
        }
        if layers == 0 {
            return Err(ConfigError::InvalidLayers(layers));
        }
        if !thickness.is_finite() || thickness == 0.0 {
            return Err(ConfigError::InvalidThickness(thickness));
        }
        Ok(Self {
            tolerance,
            layers,
            thickness,
        })
    }
}

impl Default for MesherConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_EQUIVALENCE_TOLERANCE,
            layers: DEFAULT_LAYERS,
            thickness: DEFAULT_THICKNESS,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Tolerance is negative or not a finite number.
    InvalidTolerance(f64),
    /// Thickening needs at least one layer.
    InvalidLayers(u32),
    /// Thickness is zero or not a finite number.
    InvalidThickness(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTolerance(value) => {
                write!(f, "tolerance must be a finite non-negative number: {value}")
            }
            ConfigError::InvalidLayers(value) => {
                write!(f, "layers must be >= 1: {value}")
            }
            ConfigError::InvalidThickness(value) => {
                write!(f, "thickness must be finite and non-zero: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
