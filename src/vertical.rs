//! Fixed vertical coordinate tables.
//!
//! Each table is a constant set of level values with the metadata of the
//! model output it imitates. [`select_vertical`] picks a table from the
//! convention, grid family and number of statistical profiles.

use crate::convention::Convention;
use crate::dataset::{str_attrs, SyntheticDataset, Variable};
use crate::errors::{Result, SyntheticError};
use crate::horizontal::GridKind;
use std::fmt;
use std::str::FromStr;

/// NCAR CAM hybrid level midpoints, `1000 * (A + B)`
pub const NCAR_LEV: [f64; 60] = [
    2.501651, 4.187496, 6.66766, 10.099201, 14.551163, 19.943806, 26.002806, 32.250471,
    38.050216, 42.70557, 46.240154, 49.511782, 53.014888, 56.765857, 60.782212, 65.082732,
    69.687527, 74.618127, 79.897583, 85.550576, 91.603545, 98.084766, 105.024556, 112.455371,
    120.411924, 128.931421, 138.053706, 147.821421, 158.280234, 169.479033, 181.470176,
    194.309746, 208.057754, 222.778457, 238.540693, 255.418164, 273.489746, 292.839941,
    313.559268, 335.744541, 359.499453, 384.935117, 412.17043, 441.332715, 472.55834,
    505.993262, 541.793789, 580.127324, 621.173066, 665.12291, 712.182383, 762.571445,
    816.525625, 858.699883, 886.368125, 912.162773, 935.873203, 957.301758, 976.266953,
    992.556094,
];

/// Hybrid A coefficients at layer midpoints
pub const NCAR_HYAM: [f64; 60] = [
    2.501651e-03, 4.187496e-03, 6.667660e-03, 1.009920e-02, 1.455116e-02, 1.994381e-02,
    2.600281e-02, 3.225047e-02, 3.805022e-02, 4.270557e-02, 4.624015e-02, 4.951178e-02,
    5.301489e-02, 5.676586e-02, 6.078221e-02, 6.508273e-02, 6.968753e-02, 7.461813e-02,
    7.989758e-02, 8.555058e-02, 9.160354e-02, 9.808477e-02, 1.050246e-01, 1.124554e-01,
    1.204119e-01, 1.289314e-01, 1.380537e-01, 1.478214e-01, 1.582802e-01, 1.694790e-01,
    1.746796e-01, 1.726401e-01, 1.696388e-01, 1.664251e-01, 1.629841e-01, 1.592996e-01,
    1.553543e-01, 1.511300e-01, 1.466068e-01, 1.417635e-01, 1.365776e-01, 1.310247e-01,
    1.250790e-01, 1.187125e-01, 1.118957e-01, 1.045965e-01, 9.678086e-02, 8.841227e-02,
    7.945159e-02, 6.985690e-02, 5.958334e-02, 4.858288e-02, 3.680412e-02, 2.759706e-02,
    2.155681e-02, 1.592557e-02, 1.074934e-02, 6.071232e-03, 1.930966e-03, -1.648308e-09,
];

/// Hybrid B coefficients at layer midpoints
pub const NCAR_HYBM: [f64; 60] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.006791, 0.02167, 0.038419,
    0.056353, 0.075557, 0.096119, 0.118135, 0.14171, 0.166953, 0.193981, 0.222922, 0.25391,
    0.287091, 0.32262, 0.360663, 0.401397, 0.445013, 0.491715, 0.541721, 0.595266, 0.652599,
    0.713989, 0.779722, 0.831103, 0.864811, 0.896237, 0.925124, 0.951231, 0.974336, 0.992556,
];

/// GFDL AM4 reference full pressure levels (mb)
pub const GFDL_PFULL: [f64; 32] = [
    2.164043, 5.845308, 10.74508, 17.106537, 25.113805, 35.221197, 48.137904, 64.560184,
    85.114482, 110.419627, 141.09261, 177.729388, 220.892397, 271.066624, 328.516337,
    392.785273, 461.947262, 532.465907, 600.430867, 663.107383, 719.307118, 768.814284,
    811.846869, 848.836021, 880.346139, 906.995722, 929.394583, 948.128523, 963.73257,
    976.687397, 987.392458, 996.109949,
];

/// GFDL AM4 reference half pressure levels (mb)
pub const GFDL_PHALF: [f64; 33] = [
    1.0, 4.0, 8.186021, 13.788865, 20.917952, 29.836408, 41.217896, 55.792215, 74.201906,
    97.047864, 124.966648, 158.549553, 198.396959, 245.027221, 298.888576, 360.040179,
    427.458025, 498.243573, 568.220535, 633.836047, 693.266329, 745.991986, 792.097373,
    831.921945, 865.977814, 894.872525, 919.22792, 939.635932, 956.672132, 970.827661,
    982.570665, 992.23, 1000.0,
];

/// Standard 19-level CMIP pressure levels (Pa)
pub const PLEV19: [f64; 19] = [
    100000.0, 92500.0, 85000.0, 70000.0, 60000.0, 50000.0, 40000.0, 30000.0, 25000.0, 20000.0,
    15000.0, 10000.0, 7000.0, 5000.0, 3000.0, 2000.0, 1000.0, 500.0, 100.0,
];

/// Generic CMIP6 pressure levels (hPa)
pub const CMIP_PLEV: [f64; 32] = [
    10.0, 20.0, 30.0, 50.0, 70.0, 100.0, 125.0, 150.0, 175.0, 200.0, 225.0, 250.0, 275.0, 300.0,
    350.0, 400.0, 450.0, 500.0, 550.0, 600.0, 650.0, 700.0, 750.0, 800.0, 825.0, 850.0, 875.0,
    900.0, 925.0, 950.0, 975.0, 1000.0,
];

/// MOM6 depth at cell centre (m)
pub const MOM6_Z_L: [f64; 35] = [
    2.5, 10.0, 20.0, 32.5, 51.25, 75.0, 100.0, 125.0, 156.25, 200.0, 250.0, 312.5, 400.0, 500.0,
    600.0, 700.0, 800.0, 900.0, 1000.0, 1100.0, 1200.0, 1300.0, 1400.0, 1537.5, 1750.0, 2062.5,
    2500.0, 3000.0, 3500.0, 4000.0, 4500.0, 5000.0, 5500.0, 6000.0, 6500.0,
];

/// MOM6 depth at cell interface (m)
pub const MOM6_Z_I: [f64; 36] = [
    0.0, 5.0, 15.0, 25.0, 40.0, 62.5, 87.5, 112.5, 137.5, 175.0, 225.0, 275.0, 350.0, 450.0,
    550.0, 650.0, 750.0, 850.0, 950.0, 1050.0, 1150.0, 1250.0, 1350.0, 1450.0, 1625.0, 1875.0,
    2250.0, 2750.0, 3250.0, 3750.0, 4250.0, 4750.0, 5250.0, 5750.0, 6250.0, 6750.0,
];

/// MOM6 target potential density at cell centre (kg m-3)
pub const MOM6_RHO2_L: [f64; 35] = [
    1013.75, 1028.5, 1029.2421875, 1029.71875, 1030.1796875, 1030.625, 1031.0546875, 1031.46875,
    1031.8671875, 1032.25, 1032.6171875, 1032.96875, 1033.3046875, 1033.625, 1033.9296875,
    1034.21875, 1034.4921875, 1034.75, 1034.9921875, 1035.21875, 1035.4296875, 1035.625,
    1035.8046875, 1035.96875, 1036.1171875, 1036.25, 1036.375, 1036.5, 1036.625, 1036.75,
    1036.875, 1037.0, 1037.125, 1037.25, 1037.65625,
];

/// MOM6 target potential density at cell interface (kg m-3)
pub const MOM6_RHO2_I: [f64; 36] = [
    999.5, 1028.0, 1029.0, 1029.484375, 1029.953125, 1030.40625, 1030.84375, 1031.265625,
    1031.671875, 1032.0625, 1032.4375, 1032.796875, 1033.140625, 1033.46875, 1033.78125,
    1034.078125, 1034.359375, 1034.625, 1034.875, 1035.109375, 1035.328125, 1035.53125,
    1035.71875, 1035.890625, 1036.046875, 1036.1875, 1036.3125, 1036.4375, 1036.5625,
    1036.6875, 1036.8125, 1036.9375, 1037.0625, 1037.1875, 1037.3125, 1038.0,
];

/// Available vertical coordinate tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalKind {
    /// NCAR CAM 60-level hybrid sigma-pressure (`lev`, `hyam`, `hybm`)
    NcarHybrid,
    /// GFDL AM4 32-level pressure (`pfull`, `phalf`)
    GfdlPressure,
    /// 19-level pressure (`plev19`)
    Plev19,
    /// Generic CMIP6 32-level pressure (`plev`)
    CmipPressure,
    /// MOM6 35-level depth (`z_l`, `z_i`, `lev`)
    Mom6Depth,
    /// MOM6 35-level isopycnal (`rho2_l`, `rho2_i`)
    Mom6Density,
}

impl VerticalKind {
    pub const ALL: [VerticalKind; 6] = [
        Self::NcarHybrid,
        Self::GfdlPressure,
        Self::Plev19,
        Self::CmipPressure,
        Self::Mom6Depth,
        Self::Mom6Density,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::NcarHybrid => "ncar_hybrid",
            Self::GfdlPressure => "pfull",
            Self::Plev19 => "plev19",
            Self::CmipPressure => "plev",
            Self::Mom6Depth => "z_l",
            Self::Mom6Density => "rho2_l",
        }
    }

    /// Number of levels a field on this coordinate carries
    pub const fn levels(self) -> usize {
        match self {
            Self::NcarHybrid => NCAR_LEV.len(),
            Self::GfdlPressure => GFDL_PFULL.len(),
            Self::Plev19 => PLEV19.len(),
            Self::CmipPressure => CMIP_PLEV.len(),
            Self::Mom6Depth => MOM6_Z_L.len(),
            Self::Mom6Density => MOM6_RHO2_L.len(),
        }
    }

    /// Dimension a field's level axis is attached to
    pub const fn level_dim(self, convention: Convention) -> &'static str {
        match (self, convention) {
            (Self::NcarHybrid, _) => "lev",
            (Self::GfdlPressure, _) => "pfull",
            (Self::Plev19, _) => "plev19",
            (Self::CmipPressure, _) => "plev",
            (Self::Mom6Depth, Convention::Cmip) => "lev",
            (Self::Mom6Depth, _) => "z_l",
            (Self::Mom6Density, _) => "rho2_l",
        }
    }

    /// Build the coordinate variables for this table
    pub fn build(self) -> Result<SyntheticDataset> {
        let mut dset = SyntheticDataset::new();
        match self {
            Self::NcarHybrid => {
                dset.insert(
                    "lev",
                    Variable::coordinate(
                        "lev",
                        NCAR_LEV.to_vec(),
                        str_attrs(&[
                            ("long_name", "hybrid level at midpoints (1000*(A+B))"),
                            ("units", "level"),
                            ("positive", "down"),
                            ("standard_name", "atmosphere_hybrid_sigma_pressure_coordinate"),
                            ("formula_terms", "a: hyam b: hybm p0: P0 ps: PS"),
                        ]),
                    ),
                )?;
                dset.insert(
                    "hyam",
                    Variable::coordinate(
                        "lev",
                        NCAR_HYAM.to_vec(),
                        str_attrs(&[("long_name", "hybrid A coefficient at layer midpoints")]),
                    ),
                )?;
                dset.insert(
                    "hybm",
                    Variable::coordinate(
                        "lev",
                        NCAR_HYBM.to_vec(),
                        str_attrs(&[("long_name", "hybrid B coefficient at layer midpoints")]),
                    ),
                )?;
            }
            Self::GfdlPressure => {
                dset.insert(
                    "pfull",
                    Variable::coordinate(
                        "pfull",
                        GFDL_PFULL.to_vec(),
                        str_attrs(&[
                            ("long_name", "ref full pressure level"),
                            ("units", "mb"),
                            ("cartesian_axis", "Z"),
                            ("positive", "down"),
                            ("edges", "phalf"),
                        ]),
                    ),
                )?;
                dset.insert(
                    "phalf",
                    Variable::coordinate(
                        "phalf",
                        GFDL_PHALF.to_vec(),
                        str_attrs(&[
                            ("long_name", "ref half pressure level"),
                            ("units", "mb"),
                            ("cartesian_axis", "Z"),
                            ("positive", "down"),
                        ]),
                    ),
                )?;
            }
            Self::Plev19 => {
                dset.insert(
                    "plev19",
                    Variable::coordinate(
                        "plev19",
                        PLEV19.to_vec(),
                        str_attrs(&[
                            ("long_name", "pressure"),
                            ("units", "Pa"),
                            ("axis", "Z"),
                            ("positive", "down"),
                        ]),
                    ),
                )?;
            }
            Self::CmipPressure => {
                dset.insert(
                    "plev",
                    Variable::coordinate(
                        "plev",
                        CMIP_PLEV.to_vec(),
                        str_attrs(&[
                            ("long_name", "air_pressure"),
                            ("units", "hPa"),
                            ("cartesian_axis", "Z"),
                            ("positive", "down"),
                        ]),
                    ),
                )?;
            }
            Self::Mom6Depth => {
                dset.insert(
                    "z_l",
                    Variable::coordinate(
                        "z_l",
                        MOM6_Z_L.to_vec(),
                        str_attrs(&[
                            ("standard_name", "depth_at_cell_center"),
                            ("long_name", "Depth at cell center"),
                            ("units", "meters"),
                            ("axis", "Z"),
                            ("positive", "down"),
                            ("edges", "z_i"),
                        ]),
                    ),
                )?;
                dset.insert(
                    "z_i",
                    Variable::coordinate(
                        "z_i",
                        MOM6_Z_I.to_vec(),
                        str_attrs(&[
                            ("standard_name", "depth_at_cell_interface"),
                            ("long_name", "Depth at interface"),
                            ("units", "meters"),
                            ("axis", "Z"),
                            ("positive", "down"),
                        ]),
                    ),
                )?;
                // same levels as z_l, carrying CMIP attributes
                dset.insert(
                    "lev",
                    Variable::coordinate(
                        "lev",
                        MOM6_Z_L.to_vec(),
                        str_attrs(&[
                            ("standard_name", "depth"),
                            ("long_name", "depth"),
                            ("units", "meters"),
                            ("axis", "Z"),
                            ("positive", "down"),
                        ]),
                    ),
                )?;
            }
            Self::Mom6Density => {
                dset.insert(
                    "rho2_l",
                    Variable::coordinate(
                        "rho2_l",
                        MOM6_RHO2_L.to_vec(),
                        str_attrs(&[
                            ("long_name", "Target Potential Density at cell center"),
                            ("units", "kg m-3"),
                            ("axis", "Z"),
                            ("positive", "down"),
                            ("edges", "rho2_i"),
                        ]),
                    ),
                )?;
                dset.insert(
                    "rho2_i",
                    Variable::coordinate(
                        "rho2_i",
                        MOM6_RHO2_I.to_vec(),
                        str_attrs(&[
                            ("long_name", "Target Potential Density at interface"),
                            ("units", "kg m-3"),
                            ("axis", "Z"),
                            ("positive", "down"),
                        ]),
                    ),
                )?;
            }
        }
        Ok(dset)
    }
}

impl FromStr for VerticalKind {
    type Err = SyntheticError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ncar_hybrid" | "hybrid" | "lev" => Ok(Self::NcarHybrid),
            "pfull" | "gfdl" => Ok(Self::GfdlPressure),
            "plev19" => Ok(Self::Plev19),
            "plev" | "cmip" => Ok(Self::CmipPressure),
            "z_l" | "z" | "mom6_z" => Ok(Self::Mom6Depth),
            "rho2_l" | "rho2" | "mom6_rho2" => Ok(Self::Mom6Density),
            _ => Err(SyntheticError::UnknownVerticalCoordinate {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for VerticalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Default table for a field with `nprofiles` statistical profiles.
///
/// Single-profile fields have no vertical axis and get `None`.
pub fn select_vertical(convention: Convention, grid: GridKind, nprofiles: usize) -> Option<VerticalKind> {
    if nprofiles <= 1 {
        return None;
    }
    let kind = match convention {
        Convention::Ncar => VerticalKind::NcarHybrid,
        Convention::Gfdl if nprofiles == PLEV19.len() => VerticalKind::Plev19,
        Convention::Gfdl => VerticalKind::GfdlPressure,
        Convention::Cmip if grid == GridKind::Tripolar => VerticalKind::Mom6Depth,
        Convention::Cmip if nprofiles == PLEV19.len() => VerticalKind::Plev19,
        Convention::Cmip => VerticalKind::CmipPressure,
    };
    Some(kind)
}
