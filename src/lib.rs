//! mdtf_synthetic: synthetic climate-model NetCDF fixtures
//!
//! Generates small gridded datasets that look like real GFDL, NCAR/CESM and
//! CMIP6 model output: the same dimension names, coordinate tables, time
//! conventions and attribute sets, filled with reproducible random fields.
//! The output is meant as test input for diagnostics packages that expect
//! real model files.
//!
//! ## Key Features
//!
//! - **No-leap time axes**: monthly, daily and `<n>hr` sampling with contiguous bounds
//! - **Grids**: rectilinear lat/lon from spacings, tripolar ocean from a reference file
//! - **Vertical tables**: NCAR hybrid, GFDL pressure, plev19, CMIP pressure, MOM6 depth/density
//! - **Reproducible fields**: seeded kernels matching numpy's legacy `RandomState`
//! - **Convention-exact encoding**: fill values, time units and calendars per variable
//!
//! ## Module Organization
//!
//! - [`time_axis`], [`calendar`]: time samples and bounds
//! - [`horizontal`]: rectilinear and tripolar grid builders
//! - [`vertical`]: vertical coordinate tables and their selection
//! - [`generators`]: kernel registry and random streams
//! - [`synthetic`]: the dataset assembler
//! - [`netcdf_io`]: encoding rules and the NetCDF writer
//! - [`config`], [`setup`]: YAML variable records, output layout, run loop
//! - [`metadata`], [`parallel`]: the per-level statistics query
//! - [`errors`]: centralized error handling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mdtf_synthetic::prelude::*;
//! use std::path::Path;
//!
//! let spec = DatasetSpec::new("tas")
//!     .with_convention(Convention::Gfdl)
//!     .with_time_resolution(TimeResolution::Daily)
//!     .with_years(1, 2)
//!     .with_stats(vec![(280.0, 5.0)]);
//! let dset = generate_synthetic_dataset(&spec).unwrap();
//! write_to_netcdf(&dset, Path::new("tas.nc"), TimeDtype::Float).unwrap();
//!
//! let stats = mdtf_synthetic::metadata::dataset_stats(Path::new("tas.nc"), "tas", None).unwrap();
//! println!("{:?}", stats);
//! ```

pub mod calendar;
pub mod cli;
pub mod config;
pub mod convention;
pub mod dataset;
pub mod errors;
pub mod generators;
pub mod horizontal;
pub mod metadata;
pub mod netcdf_io;
pub mod parallel;
pub mod setup;
pub mod synthetic;
pub mod time_axis;
pub mod vertical;

pub use errors::*;

pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::config::ConfigFile;
    pub use crate::convention::Convention;
    pub use crate::dataset::{ArrayData, Attributes, SyntheticDataset, Variable};
    pub use crate::errors::{Result, SyntheticError};
    pub use crate::generators::KernelArgs;
    pub use crate::horizontal::{GridKind, PointType};
    pub use crate::netcdf_io::{write_to_netcdf, NetCDFWriter, TimeDtype};
    pub use crate::synthetic::{
        generate_synthetic_dataset, AuxCoordinate, AuxSource, DatasetSpec, FieldSource,
    };
    pub use crate::time_axis::TimeResolution;
    pub use crate::vertical::VerticalKind;
}
