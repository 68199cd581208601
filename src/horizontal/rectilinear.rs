//! Regular latitude/longitude grids

use crate::convention::Convention;
use crate::dataset::{pairwise_bounds, str_attrs, ArrayData, Attributes, SyntheticDataset, Variable};
use crate::errors::{Result, SyntheticError};
use ndarray::Array1;
use std::fmt;
use tracing::warn;

/// Record of a spacing that was rounded to divide its axis evenly
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacingAdjustment {
    pub axis: &'static str,
    pub extent: f64,
    pub requested: f64,
    pub adjusted: f64,
}

impl fmt::Display for SpacingAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} degrees does not divide evenly by {}. Adjusting {} to {}",
            self.extent, self.axis, self.axis, self.adjusted
        )
    }
}

/// Round `spacing` so that it divides `extent` a whole number of times.
///
/// Spacings that already divide evenly are returned unchanged; otherwise the
/// spacing becomes `extent / floor(extent / spacing)`.
pub fn adjust_spacing(
    axis: &'static str,
    extent: f64,
    spacing: f64,
) -> Result<(f64, Option<SpacingAdjustment>)> {
    if !spacing.is_finite() || spacing <= 0.0 || spacing > extent {
        return Err(SyntheticError::InvalidSpacing {
            message: format!("{} must be in (0, {}], got {}", axis, extent, spacing),
        });
    }
    if extent % spacing == 0.0 {
        return Ok((spacing, None));
    }
    let adjusted = extent / (extent / spacing).floor();
    Ok((
        adjusted,
        Some(SpacingAdjustment {
            axis,
            extent,
            requested: spacing,
            adjusted,
        }),
    ))
}

fn centres(start: f64, spacing: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + spacing / 2.0 + i as f64 * spacing).collect()
}

fn edges(start: f64, spacing: f64, count: usize) -> Vec<f64> {
    (0..=count).map(|i| start + i as f64 * spacing).collect()
}

/// Build a rectilinear grid shell with `lat` and `lon` coordinates.
///
/// With `bounds`, `lat_bnds` and `lon_bnds` are added on a size-2 `bnds`
/// dimension. GFDL and CMIP grids always point `lat`/`lon` at their bounds
/// when bounds exist; the remaining attribute tables are only attached with
/// `add_attrs`. Spacing adjustments are logged and recorded as dataset
/// warnings.
pub fn construct_rect_grid(
    dlon: f64,
    dlat: f64,
    add_attrs: bool,
    convention: Convention,
    bounds: bool,
) -> Result<SyntheticDataset> {
    let mut dset = SyntheticDataset::new();

    let (dlat, lat_adjust) = adjust_spacing("dlat", 180.0, dlat)?;
    let (dlon, lon_adjust) = adjust_spacing("dlon", 360.0, dlon)?;
    for adjustment in [lat_adjust, lon_adjust].into_iter().flatten() {
        warn!("{}", adjustment);
        dset.warn(adjustment.to_string());
    }

    let nlat = (180.0 / dlat).round() as usize;
    let nlon = (360.0 / dlon).round() as usize;

    let (mut lat_attrs, mut lon_attrs) = if add_attrs {
        convention.rect_axis_attrs()
    } else {
        (Attributes::new(), Attributes::new())
    };

    let bounds_attrs = convention.rect_bounds_attrs();
    if bounds && bounds_attrs.is_some() {
        lat_attrs.insert("bounds".into(), "lat_bnds".into());
        lon_attrs.insert("bounds".into(), "lon_bnds".into());
    }

    dset.insert(
        "lat",
        Variable::coordinate("lat", centres(-90.0, dlat, nlat), lat_attrs),
    )?;
    dset.insert(
        "lon",
        Variable::coordinate("lon", centres(0.0, dlon, nlon), lon_attrs),
    )?;

    if bounds {
        let (lat_bnds_attrs, lon_bnds_attrs) = match (add_attrs, bounds_attrs) {
            (true, Some(tables)) => tables,
            _ => (Attributes::new(), Attributes::new()),
        };
        dset.insert(
            "lat_bnds",
            Variable::new(
                &["lat", "bnds"],
                ArrayData::Float64(pairwise_bounds(&edges(-90.0, dlat, nlat))?),
            )?
            .with_attrs(lat_bnds_attrs),
        )?;
        dset.insert(
            "lon_bnds",
            Variable::new(
                &["lon", "bnds"],
                ArrayData::Float64(pairwise_bounds(&edges(0.0, dlon, nlon))?),
            )?
            .with_attrs(lon_bnds_attrs),
        )?;

        if convention == Convention::Cmip {
            dset.insert("bnds", bnds_variable())?;
        }
    }

    Ok(dset)
}

/// Vertex index variable for the size-2 bounds dimension
pub(crate) fn bnds_variable() -> Variable {
    Variable {
        dims: vec!["bnds".to_string()],
        data: ArrayData::Float64(Array1::from(vec![0.0, 1.0]).into_dyn()),
        attrs: str_attrs(&[("long_name", "vertex number")]),
    }
}
