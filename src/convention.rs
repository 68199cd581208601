//! Modeling-center conventions and their attribute tables.
//!
//! Each convention fixes dimension names, attribute sets and a few layout
//! rules. All convention-specific literals live here so that auditing one
//! dialect means reading one `match` arm per table.

use crate::dataset::{str_attrs, Attributes};
use crate::errors::{Result, SyntheticError};
use serde_json::json;
use std::fmt;
use std::str::FromStr;

/// Metadata dialect of the generated output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Convention {
    /// NCAR/CESM
    Ncar,
    /// GFDL
    Gfdl,
    /// CMIP6
    Cmip,
}

/// Global attributes every CMIP6 file is required to carry
pub const CMIP6_GLOBAL_ATTRIBUTES: &[&str] = &[
    "Conventions",
    "activity_id",
    "branch_method",
    "branch_time_in_child",
    "branch_time_in_parent",
    "creation_date",
    "data_specs_version",
    "experiment",
    "experiment_id",
    "forcing_index",
    "frequency",
    "further_info_url",
    "grid",
    "grid_label",
    "initialization_index",
    "institution",
    "institution_id",
    "license",
    "mip_era",
    "nominal_resolution",
    "parent_activity_id",
    "parent_experiment_id",
    "parent_mip_era",
    "parent_source_id",
    "parent_time_units",
    "parent_variant_label",
    "physics_index",
    "product",
    "realization_index",
    "realm",
    "source",
    "source_id",
    "source_type",
    "sub_experiment",
    "sub_experiment_id",
    "table_id",
    "tracking_id",
    "variable_id",
    "variant_label",
];

impl Convention {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ncar => "ncar",
            Self::Gfdl => "gfdl",
            Self::Cmip => "cmip",
        }
    }

    /// Name of the size-2 dimension indexing time bounds
    pub const fn time_bounds_dim(self) -> &'static str {
        match self {
            Self::Gfdl | Self::Cmip => "bnds",
            Self::Ncar => "nbnds",
        }
    }

    /// Monthly samples sit on this day of the month
    pub const fn monthly_sample_day(self) -> u32 {
        match self {
            Self::Ncar => 1,
            Self::Gfdl | Self::Cmip => 15,
        }
    }

    /// Hour of day for daily samples
    pub const fn daily_sample_hour(self) -> u32 {
        match self {
            Self::Gfdl => 12,
            Self::Ncar | Self::Cmip => 0,
        }
    }

    /// Tripolar grids are rendered with the CESM layout for CMIP output
    pub const fn tripolar_style(self) -> Convention {
        match self {
            Self::Gfdl => Self::Gfdl,
            Self::Ncar | Self::Cmip => Self::Ncar,
        }
    }

    pub fn time_attrs(self) -> Attributes {
        match self {
            Self::Gfdl => str_attrs(&[
                ("long_name", "time"),
                ("cartesian_axis", "T"),
                ("calendar_type", "noleap"),
                ("bounds", "time_bnds"),
            ]),
            Self::Cmip => str_attrs(&[
                ("long_name", "time"),
                ("axis", "T"),
                ("calendar_type", "noleap"),
                ("bounds", "time_bnds"),
                ("standard_name", "time"),
                ("description", "Temporal mean"),
            ]),
            Self::Ncar => str_attrs(&[("long_name", "time"), ("bounds", "time_bnds")]),
        }
    }

    pub fn time_bounds_attrs(self) -> Attributes {
        match self {
            Self::Gfdl | Self::Cmip => str_attrs(&[("long_name", "time axis boundaries")]),
            Self::Ncar => str_attrs(&[("long_name", "time interval endpoints")]),
        }
    }

    /// `(lat, lon)` attribute tables for rectilinear grids
    pub fn rect_axis_attrs(self) -> (Attributes, Attributes) {
        match self {
            Self::Ncar => (
                str_attrs(&[("long_name", "latitude"), ("units", "degrees_north")]),
                str_attrs(&[("long_name", "longitude"), ("units", "degrees_east")]),
            ),
            Self::Gfdl => (
                str_attrs(&[
                    ("long_name", "latitude"),
                    ("units", "degrees_N"),
                    ("cartesian_axis", "Y"),
                ]),
                str_attrs(&[
                    ("long_name", "longitude"),
                    ("units", "degrees_E"),
                    ("cartesian_axis", "X"),
                ]),
            ),
            Self::Cmip => (
                str_attrs(&[
                    ("long_name", "latitude"),
                    ("units", "degrees_north"),
                    ("axis", "Y"),
                    ("standard_name", "latitude"),
                    ("cell_methods", "time: point"),
                ]),
                str_attrs(&[
                    ("long_name", "longitude"),
                    ("units", "degrees_east"),
                    ("axis", "X"),
                    ("standard_name", "longitude"),
                    ("cell_methods", "time: point"),
                ]),
            ),
        }
    }

    /// `(lat_bnds, lon_bnds)` attribute tables; ncar carries none
    pub fn rect_bounds_attrs(self) -> Option<(Attributes, Attributes)> {
        match self {
            Self::Ncar => None,
            Self::Gfdl => Some((
                str_attrs(&[("long_name", "latitude bounds"), ("cartesian_axis", "Y")]),
                str_attrs(&[("long_name", "longitude bounds"), ("cartesian_axis", "X")]),
            )),
            Self::Cmip => Some((
                str_attrs(&[
                    ("long_name", "latitude bounds"),
                    ("axis", "Y"),
                    ("units", "degrees_north"),
                ]),
                str_attrs(&[
                    ("long_name", "longitude bounds"),
                    ("axis", "X"),
                    ("units", "degrees_east"),
                ]),
            )),
        }
    }

    /// `(lat, lon)` attribute tables for retained tripolar coordinates
    pub fn tripolar_axis_attrs(self) -> (Attributes, Attributes) {
        match self.tripolar_style() {
            Self::Ncar => {
                let mut lat = str_attrs(&[
                    ("axis", "Y"),
                    ("standard_name", "latitude"),
                    ("title", "Latitude"),
                    ("type", "double"),
                    ("units", "degrees_north"),
                ]);
                lat.insert("valid_max".into(), json!(90.0));
                lat.insert("valid_min".into(), json!(-90.0));
                let mut lon = str_attrs(&[
                    ("axis", "X"),
                    ("standard_name", "longitude"),
                    ("title", "Longitude"),
                    ("type", "double"),
                    ("units", "degrees_east"),
                ]);
                lon.insert("valid_max".into(), json!(360.0));
                lon.insert("valid_min".into(), json!(0.0));
                (lat, lon)
            }
            _ => (Attributes::new(), Attributes::new()),
        }
    }
}

impl FromStr for Convention {
    type Err = SyntheticError;

    /// Accepts the convention tags plus the `cesm` alias, case-insensitively
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ncar" | "cesm" => Ok(Self::Ncar),
            "gfdl" => Ok(Self::Gfdl),
            "cmip" => Ok(Self::Cmip),
            _ => Err(SyntheticError::UnknownConvention {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
