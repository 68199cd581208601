//! Horizontal grid builders
//!
//! Two grid families are supported: a regular latitude/longitude grid built
//! from spacings, and a tripolar ocean grid read from a reference static file.

pub mod rectilinear;
pub mod tripolar;

pub use rectilinear::{adjust_spacing, construct_rect_grid, SpacingAdjustment};
pub use tripolar::{construct_tripolar_grid, resolve_static_path, OCEAN_STATIC_ENV};

use crate::errors::{Result, SyntheticError};
use std::fmt;
use std::str::FromStr;

/// Horizontal grid family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridKind {
    #[default]
    Rectilinear,
    Tripolar,
}

impl FromStr for GridKind {
    type Err = SyntheticError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rectilinear" | "standard" | "regular" => Ok(Self::Rectilinear),
            "tripolar" => Ok(Self::Tripolar),
            _ => Err(SyntheticError::UnknownGrid {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for GridKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rectilinear => f.write_str("rectilinear"),
            Self::Tripolar => f.write_str("tripolar"),
        }
    }
}

/// Staggered location on a tripolar grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointType {
    /// Tracer (cell centre)
    #[default]
    T,
    /// Zonal velocity
    U,
    /// Meridional velocity
    V,
    /// Cell corner
    C,
}

impl PointType {
    /// Suffix on the reference file's `geolat`, `geolon` and `wet` names
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::T => "",
            Self::U => "_u",
            Self::V => "_v",
            Self::C => "_c",
        }
    }
}

impl FromStr for PointType {
    type Err = SyntheticError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "t" => Ok(Self::T),
            "u" => Ok(Self::U),
            "v" => Ok(Self::V),
            "c" => Ok(Self::C),
            _ => Err(SyntheticError::UnknownGrid {
                name: format!("point type '{}'", s),
            }),
        }
    }
}
