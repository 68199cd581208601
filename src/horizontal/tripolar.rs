//! Tripolar ocean grid loaded from a reference static file
//!
//! The reference file is a MOM6 ocean static file providing `geolat`,
//! `geolon` and `wet` at each staggered point type, plus `depth_ocean` on
//! tracer points and the `xh`/`xq`/`yh`/`yq` index coordinates.

use super::PointType;
use crate::convention::Convention;
use crate::dataset::{str_attrs, ArrayData, Attributes, SyntheticDataset, Variable};
use crate::errors::{Result, SyntheticError};
use crate::netcdf_io::read_variable;
use ndarray::Array1;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the reference static file location
pub const OCEAN_STATIC_ENV: &str = "MDTF_OCEAN_STATIC";

/// Locate the reference static file.
///
/// An explicit path wins over [`OCEAN_STATIC_ENV`]; with neither set there
/// is no grid to read. The chosen file must exist.
pub fn resolve_static_path(explicit: Option<&Path>) -> Result<PathBuf> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => env::var_os(OCEAN_STATIC_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .ok_or(SyntheticError::StaticFileRequired)?,
    };
    if !path.is_file() {
        return Err(SyntheticError::StaticFileNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(path)
}

fn index_coordinate(dim: &str, len: usize, long_name: &str) -> Variable {
    let values: Vec<i32> = (1..=len as i32).collect();
    Variable {
        dims: vec![dim.to_string()],
        data: ArrayData::Int32(Array1::from(values).into_dyn()),
        attrs: str_attrs(&[("long_name", long_name), ("units", "1")]),
    }
}

/// Build a tripolar grid shell for one point type.
///
/// The result always holds `mask` (1.0 over ocean, NaN over land) and, for
/// tracer points, `depth`. With `retain_coords` the raw latitude, longitude
/// and wet arrays are kept as well. NCAR and CMIP output renames the
/// horizontal dimensions to `nlat`/`nlon` with 1-based index coordinates and
/// the retained coordinates to `lat`/`lon`.
pub fn construct_tripolar_grid(
    point_type: PointType,
    add_attrs: bool,
    convention: Convention,
    retain_coords: bool,
    static_file: Option<&Path>,
) -> Result<SyntheticDataset> {
    let path = resolve_static_path(static_file)?;
    debug!("Reading tripolar reference grid from {}", path.display());
    let file = netcdf::open(&path)?;

    let sfx = point_type.suffix();
    let lat_name = format!("geolat{}", sfx);
    let lon_name = format!("geolon{}", sfx);
    let wet_name = format!("wet{}", sfx);

    let lat = read_variable(&file, &lat_name)?;
    let lon = read_variable(&file, &lon_name)?;
    let wet = read_variable(&file, &wet_name)?;

    let mut dset = SyntheticDataset::new();

    // Horizontal index coordinates travel with the grid arrays
    for dim in &wet.dims {
        if file.variable(dim).is_some() {
            dset.insert(dim, read_variable(&file, dim)?)?;
        }
    }

    let wet_values = wet.data.to_f64().ok_or_else(|| {
        SyntheticError::EncodingError(format!("'{}' is not numeric", wet_name))
    })?;
    let mask = wet_values.mapv(|w| if w == 0.0 { f64::NAN } else { 1.0 });
    dset.insert(
        "mask",
        Variable {
            dims: wet.dims.clone(),
            data: ArrayData::Float64(mask),
            attrs: Attributes::new(),
        },
    )?;

    if point_type == PointType::T {
        let mut depth = read_variable(&file, "depth_ocean")?;
        depth.attrs = Attributes::new();
        dset.insert("depth", depth)?;
    }

    let style = convention.tripolar_style();
    if retain_coords {
        let (lat_attrs, lon_attrs) = if add_attrs {
            convention.tripolar_axis_attrs()
        } else {
            (Attributes::new(), Attributes::new())
        };
        dset.insert(&lat_name, lat.with_attrs(lat_attrs))?;
        dset.insert(&lon_name, lon.with_attrs(lon_attrs))?;
        dset.insert(&wet_name, wet.with_attrs(Attributes::new()))?;
    }

    if style == Convention::Ncar {
        for (old, new, long_name) in [
            ("xh", "nlon", "cell index along first dimension"),
            ("xq", "nlon", "cell index along first dimension"),
            ("yh", "nlat", "cell index along second dimension"),
            ("yq", "nlat", "cell index along second dimension"),
        ] {
            let Some(len) = dset.dim_len(old) else {
                continue;
            };
            dset.remove(old);
            dset.rename_dim(old, new);
            dset.insert(new, index_coordinate(new, len, long_name))?;
        }
        dset.rename_var(&lat_name, "lat");
        dset.rename_var(&lon_name, "lon");
    }

    Ok(dset)
}
