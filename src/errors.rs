//! Centralized error handling for the synthetic dataset generator
//!
//! Every failure aborts the current generation run. Errors fall into three
//! groups: usage errors (bad names, ranges, or missing inputs), shape and
//! consistency errors (level counts, dimension lengths), and I/O errors from
//! the NetCDF library or the filesystem.

use std::fmt;

/// Main error type for synthetic dataset generation
#[derive(Debug)]
pub enum SyntheticError {
    /// NetCDF file operation errors
    NetCDFError(netcdf::Error),

    /// I/O operation errors
    IoError(std::io::Error),

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),

    /// YAML parsing errors
    YamlError(serde_yaml::Error),

    /// Convention tag is not one of ncar, gfdl, cmip
    UnknownConvention { name: String },

    /// Horizontal grid kind or point type is not recognized
    UnknownGrid { name: String },

    /// Requested field generator is not registered
    UnknownGenerator { name: String },

    /// Time resolution keyword is not recognized
    UnknownTimeResolution { name: String },

    /// Vertical coordinate table name is not recognized
    UnknownVerticalCoordinate { name: String },

    /// Generator output name is not valid for the kernel
    InvalidOutputName { generator: String, name: String },

    /// Grid spacing or time step outside the usable range
    InvalidSpacing { message: String },

    /// Command line value outside its allowed range
    InvalidArgument { message: String },

    /// Static reference file could not be found
    StaticFileNotFound { path: String },

    /// Tripolar grid requested without a reference static file
    StaticFileRequired,

    /// Variable not found in a dataset or NetCDF file
    VariableNotFound { var: String },

    /// Field level axis does not match the vertical coordinate
    LevelMismatch { expected: usize, found: usize },

    /// Two variables disagree about the length of a shared dimension
    DimensionMismatch {
        dim: String,
        expected: usize,
        found: usize,
    },

    /// Values cannot be represented with the requested encoding
    EncodingError(String),

    /// Configuration file is missing entries or malformed
    ConfigError(String),

    /// Thread pool setup errors
    ThreadPoolError(String),
}

impl fmt::Display for SyntheticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntheticError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            SyntheticError::IoError(e) => write!(f, "I/O error: {}", e),
            SyntheticError::ArrayError(e) => write!(f, "Array error: {}", e),
            SyntheticError::YamlError(e) => write!(f, "YAML error: {}", e),
            SyntheticError::UnknownConvention { name } => {
                write!(f, "Unknown model attribute format '{}'", name)
            }
            SyntheticError::UnknownGrid { name } => write!(f, "Unknown grid type '{}'", name),
            SyntheticError::UnknownGenerator { name } => {
                write!(
                    f,
                    "Unknown generator method: {} (available: {})",
                    name,
                    crate::generators::kernel_names().join(", ")
                )
            }
            SyntheticError::UnknownTimeResolution { name } => {
                write!(f, "Unknown time resolution requested: '{}'", name)
            }
            SyntheticError::UnknownVerticalCoordinate { name } => {
                write!(f, "Unknown vertical coordinate '{}'", name)
            }
            SyntheticError::InvalidOutputName { generator, name } => write!(
                f,
                "Variable '{}' is not valid for the {} generator",
                name, generator
            ),
            SyntheticError::InvalidSpacing { message } => {
                write!(f, "Invalid spacing: {}", message)
            }
            SyntheticError::InvalidArgument { message } => write!(f, "Error: {}", message),
            SyntheticError::StaticFileNotFound { path } => {
                write!(f, "Reference static file '{}' not found", path)
            }
            SyntheticError::StaticFileRequired => write!(
                f,
                "Tripolar grids need a reference ocean static file: pass --ocean-static or set MDTF_OCEAN_STATIC"
            ),
            SyntheticError::VariableNotFound { var } => {
                write!(f, "Variable '{}' not found", var)
            }
            SyntheticError::LevelMismatch { expected, found } => write!(
                f,
                "Length of stats must match number of levels: got {} profiles for {} levels",
                found, expected
            ),
            SyntheticError::DimensionMismatch {
                dim,
                expected,
                found,
            } => write!(
                f,
                "Conflicting sizes for dimension '{}': {} vs {}",
                dim, expected, found
            ),
            SyntheticError::EncodingError(msg) => write!(f, "Encoding error: {}", msg),
            SyntheticError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            SyntheticError::ThreadPoolError(msg) => write!(f, "Thread pool error: {}", msg),
        }
    }
}

impl std::error::Error for SyntheticError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyntheticError::NetCDFError(e) => Some(e),
            SyntheticError::IoError(e) => Some(e),
            SyntheticError::ArrayError(e) => Some(e),
            SyntheticError::YamlError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<netcdf::Error> for SyntheticError {
    fn from(error: netcdf::Error) -> Self {
        SyntheticError::NetCDFError(error)
    }
}

impl From<std::io::Error> for SyntheticError {
    fn from(error: std::io::Error) -> Self {
        SyntheticError::IoError(error)
    }
}

impl From<ndarray::ShapeError> for SyntheticError {
    fn from(error: ndarray::ShapeError) -> Self {
        SyntheticError::ArrayError(error)
    }
}

impl From<serde_yaml::Error> for SyntheticError {
    fn from(error: serde_yaml::Error) -> Self {
        SyntheticError::YamlError(error)
    }
}

/// Result type alias for generator operations
pub type Result<T> = std::result::Result<T, SyntheticError>;
