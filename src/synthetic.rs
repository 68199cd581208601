//! Synthetic dataset assembler
//!
//! [`generate_synthetic_dataset`] runs a fixed sequence of stages for one
//! variable: horizontal grid, time axis, vertical coordinate, field data,
//! masking, attachment, auxiliary coordinates, convention stamp and tripolar
//! cleanup. Each stage works on the dataset produced by the previous one.

use crate::convention::{Convention, CMIP6_GLOBAL_ATTRIBUTES};
use crate::dataset::{ArrayData, Attributes, SyntheticDataset, Variable};
use crate::errors::{Result, SyntheticError};
use crate::generators::{self, KernelArgs};
use crate::horizontal::rectilinear::bnds_variable;
use crate::horizontal::{construct_rect_grid, construct_tripolar_grid, GridKind, PointType};
use crate::time_axis::{generate_time_axis, TimeResolution};
use crate::vertical::{select_vertical, VerticalKind};
use ndarray::{ArrayD, Axis};
use std::path::PathBuf;
use tracing::{debug, info};

/// Where a field's values come from
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSource {
    /// Draw from the registered kernel named in the request
    Generator,
    /// Pre-computed values shaped `([time,] [level,] y, x)`
    Data(ArrayD<f64>),
    /// A 2-D array of the horizontal grid, e.g. `depth` or `wet`
    Grid(String),
}

/// Where an auxiliary coordinate's values come from
#[derive(Debug, Clone, PartialEq)]
pub enum AuxSource {
    /// Copy a variable of the horizontal grid
    Grid(String),
    /// Explicit values on named dimensions
    Data { dims: Vec<String>, values: ArrayD<f64> },
}

/// Auxiliary coordinate attached to the field and listed in its
/// `coordinates` attribute
#[derive(Debug, Clone, PartialEq)]
pub struct AuxCoordinate {
    pub name: String,
    pub source: AuxSource,
    pub attrs: Attributes,
}

/// Everything needed to assemble one variable's dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSpec {
    pub varname: String,
    pub dlon: f64,
    pub dlat: f64,
    pub startyear: i32,
    pub nyears: u32,
    pub timeres: TimeResolution,
    pub attrs: Attributes,
    pub convention: Convention,
    pub generator: String,
    pub generator_args: KernelArgs,
    pub stats: Option<Vec<(f64, f64)>>,
    pub static_field: bool,
    pub grid: GridKind,
    pub point_type: PointType,
    pub field: FieldSource,
    pub coordinates: Vec<AuxCoordinate>,
    pub vertical: Option<VerticalKind>,
    pub static_file: Option<PathBuf>,
}

impl DatasetSpec {
    /// Monthly NCAR field from the `normal` kernel on a 20°×20° grid
    pub fn new(varname: impl Into<String>) -> Self {
        Self {
            varname: varname.into(),
            dlon: 20.0,
            dlat: 20.0,
            startyear: 1,
            nyears: 10,
            timeres: TimeResolution::Monthly,
            attrs: Attributes::new(),
            convention: Convention::Ncar,
            generator: "normal".to_string(),
            generator_args: KernelArgs::default(),
            stats: None,
            static_field: false,
            grid: GridKind::Rectilinear,
            point_type: PointType::T,
            field: FieldSource::Generator,
            coordinates: Vec::new(),
            vertical: None,
            static_file: None,
        }
    }

    pub fn with_spacing(mut self, dlon: f64, dlat: f64) -> Self {
        self.dlon = dlon;
        self.dlat = dlat;
        self
    }

    pub fn with_years(mut self, startyear: i32, nyears: u32) -> Self {
        self.startyear = startyear;
        self.nyears = nyears;
        self
    }

    pub fn with_time_resolution(mut self, timeres: TimeResolution) -> Self {
        self.timeres = timeres;
        self
    }

    pub fn with_attrs(mut self, attrs: Attributes) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn with_convention(mut self, convention: Convention) -> Self {
        self.convention = convention;
        self
    }

    pub fn with_generator(mut self, name: impl Into<String>, args: KernelArgs) -> Self {
        self.generator = name.into();
        self.generator_args = args;
        self
    }

    pub fn with_stats(mut self, stats: Vec<(f64, f64)>) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn static_field(mut self, is_static: bool) -> Self {
        self.static_field = is_static;
        self
    }

    pub fn with_grid(mut self, grid: GridKind, point_type: PointType) -> Self {
        self.grid = grid;
        self.point_type = point_type;
        self
    }

    pub fn with_field(mut self, field: FieldSource) -> Self {
        self.field = field;
        self
    }

    pub fn with_coordinate(mut self, coordinate: AuxCoordinate) -> Self {
        self.coordinates.push(coordinate);
        self
    }

    pub fn with_vertical(mut self, vertical: VerticalKind) -> Self {
        self.vertical = Some(vertical);
        self
    }

    pub fn with_static_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.static_file = Some(path.into());
        self
    }

    /// Number of statistical profiles the kernel will draw
    fn profile_count(&self) -> usize {
        self.stats
            .as_ref()
            .or(self.generator_args.stats.as_ref())
            .map_or(1, |s| s.len())
    }
}

/// Horizontal dimension names and sizes of a grid shell
fn horizontal_dims(grid: &SyntheticDataset, kind: GridKind) -> Result<[(String, usize); 2]> {
    let reference = match kind {
        GridKind::Rectilinear => {
            let lat = grid.require("lat")?;
            let lon = grid.require("lon")?;
            return Ok([
                ("lat".to_string(), lat.shape()[0]),
                ("lon".to_string(), lon.shape()[0]),
            ]);
        }
        GridKind::Tripolar => grid.require("mask")?,
    };
    Ok([
        (reference.dims[0].clone(), reference.shape()[0]),
        (reference.dims[1].clone(), reference.shape()[1]),
    ])
}

/// A 2-D grid array by generic name, following convention renames
fn grid_array(grid: &SyntheticDataset, name: &str, point_type: PointType) -> Result<ArrayD<f64>> {
    let sfx = point_type.suffix();
    let candidates = match name {
        "lat" => vec!["lat".to_string(), format!("geolat{}", sfx)],
        "lon" => vec!["lon".to_string(), format!("geolon{}", sfx)],
        "wet" => vec![format!("wet{}", sfx)],
        other => vec![other.to_string()],
    };
    candidates
        .iter()
        .find_map(|n| grid.get(n))
        .and_then(|v| v.data.to_f64())
        .ok_or_else(|| SyntheticError::VariableNotFound {
            var: name.to_string(),
        })
}

/// Assemble the dataset for one variable
pub fn generate_synthetic_dataset(spec: &DatasetSpec) -> Result<SyntheticDataset> {
    let conv = spec.convention;

    if spec.field == FieldSource::Generator {
        generators::lookup(&spec.generator)?;
    }

    // 1. horizontal grid
    let mut dset = match spec.grid {
        GridKind::Rectilinear => {
            construct_rect_grid(spec.dlon, spec.dlat, true, conv, conv == Convention::Cmip)?
        }
        GridKind::Tripolar => construct_tripolar_grid(
            spec.point_type,
            true,
            conv,
            true,
            spec.static_file.as_deref(),
        )?,
    };
    let [(ydim, ny), (xdim, nx)] = horizontal_dims(&dset, spec.grid)?;
    debug!("{} grid {}x{} for '{}'", spec.grid, ny, nx, spec.varname);

    // 2. time axis
    let ntimes = if spec.static_field {
        1
    } else {
        let axis = generate_time_axis(spec.timeres, spec.startyear, spec.nyears, conv)?;
        let ntimes = axis.len();
        dset.merge(axis.to_dataset(conv)?)?;
        ntimes
    };

    // 3. vertical coordinate
    let nprofiles = match &spec.field {
        FieldSource::Generator => spec.profile_count(),
        FieldSource::Data(values) => {
            let leading = if spec.static_field { 2 } else { 3 };
            if values.ndim() > leading {
                values.shape()[values.ndim() - 3]
            } else {
                1
            }
        }
        FieldSource::Grid(_) => 1,
    };
    let vertical = if nprofiles > 1 {
        spec.vertical
            .or_else(|| select_vertical(conv, spec.grid, nprofiles))
    } else {
        None
    };
    if let Some(kind) = vertical {
        debug!("Using {} vertical coordinate", kind);
        dset.merge(kind.build()?)?;
    }

    // 4. field data
    let mut field: ArrayD<f32> = match &spec.field {
        FieldSource::Generator => {
            let mut args = spec.generator_args.clone();
            if let Some(stats) = &spec.stats {
                args.stats = Some(stats.clone());
            }
            let data = generators::generate_random_array((ny, nx), ntimes, &spec.generator, &args)?;
            // kernels always emit a leading sample axis
            if spec.static_field {
                data.index_axis_move(Axis(0), 0)
            } else {
                data
            }
        }
        FieldSource::Data(values) => values.mapv(|v| v as f32),
        FieldSource::Grid(name) => {
            if !spec.static_field {
                return Err(SyntheticError::InvalidArgument {
                    message: format!("'{}' is taken from the grid and must be static", spec.varname),
                });
            }
            grid_array(&dset, name, spec.point_type)?.mapv(|v| v as f32)
        }
    };

    let base_ndim = if spec.static_field { 2 } else { 3 };
    let shape = field.shape().to_vec();
    if shape.len() < base_ndim || shape.len() > base_ndim + 1 || shape[shape.len() - 2..] != [ny, nx] {
        return Err(SyntheticError::InvalidArgument {
            message: format!(
                "field '{}' has shape {:?}; expected ({}[level,] {}, {})",
                spec.varname,
                shape,
                if spec.static_field { "" } else { "time, " },
                ny,
                nx
            ),
        });
    }
    let level_axis = if spec.static_field { 0 } else { 1 };
    if shape.len() == base_ndim + 1 && shape[level_axis] == 1 {
        field = field.index_axis_move(Axis(level_axis), 0);
    }

    // 5. masking
    if let Some(mask) = dset.get("mask").and_then(|m| m.data.to_f64()) {
        let mask = mask.mapv(|m| m as f32);
        field.zip_mut_with(&mask, |v, &m| *v *= m);
    }

    // 6. attachment
    let mut dims: Vec<&str> = Vec::with_capacity(4);
    if !spec.static_field {
        dims.push("time");
    }
    if field.ndim() == base_ndim + 1 {
        let found = field.shape()[level_axis];
        let kind = vertical.ok_or(SyntheticError::LevelMismatch { expected: 1, found })?;
        if kind.levels() != found {
            return Err(SyntheticError::LevelMismatch {
                expected: kind.levels(),
                found,
            });
        }
        dims.push(kind.level_dim(conv));
    }
    dims.push(&ydim);
    dims.push(&xdim);

    let mut attrs = spec.attrs.clone();

    // 7. auxiliary coordinates
    let mut coord_names = Vec::new();
    for aux in &spec.coordinates {
        let var = match &aux.source {
            AuxSource::Grid(name) => {
                let mut var = dset
                    .get(name)
                    .cloned()
                    .ok_or_else(|| SyntheticError::VariableNotFound { var: name.clone() })?;
                var.attrs = aux.attrs.clone();
                var
            }
            AuxSource::Data { dims, values } => {
                let dims: Vec<&str> = dims.iter().map(|d| d.as_str()).collect();
                Variable::new(&dims, ArrayData::Float64(values.clone()))?.with_attrs(aux.attrs.clone())
            }
        };
        dset.insert(&aux.name, var)?;
        coord_names.push(aux.name.as_str());
    }
    if !coord_names.is_empty() {
        attrs.insert("coordinates".into(), coord_names.join(" ").into());
    }

    dset.insert(
        &spec.varname,
        Variable::new(&dims, ArrayData::Float32(field))?.with_attrs(attrs),
    )?;

    // 8. convention stamp
    dset.set_attr("convention", conv.as_str());
    if conv == Convention::Cmip {
        for name in CMIP6_GLOBAL_ATTRIBUTES {
            dset.attrs.entry(name.to_string()).or_insert_with(|| "".into());
        }
        if dset.dim_len("bnds").is_some() && !dset.contains("bnds") {
            dset.insert("bnds", bnds_variable())?;
        }
    }

    // 9. tripolar cleanup
    if spec.grid == GridKind::Tripolar {
        let wet = format!("wet{}", spec.point_type.suffix());
        let redundant: Vec<&str> = ["mask", wet.as_str(), "depth"]
            .into_iter()
            .filter(|n| *n != spec.varname)
            .collect();
        dset.drop_vars(&redundant);
    }

    info!(
        "Assembled '{}' ({} convention, {} samples)",
        spec.varname, conv, ntimes
    );
    Ok(dset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::str_attrs;

    fn field<'a>(dset: &'a SyntheticDataset, name: &str) -> &'a Variable {
        dset.require(name).unwrap()
    }

    #[test]
    fn single_profile_field_layout() {
        let spec = DatasetSpec::new("tas")
            .with_years(1, 1)
            .with_attrs(str_attrs(&[("units", "K")]))
            .with_stats(vec![(280.0, 5.0)]);
        let dset = generate_synthetic_dataset(&spec).unwrap();
        let tas = field(&dset, "tas");
        assert_eq!(tas.dims, vec!["time", "lat", "lon"]);
        assert_eq!(tas.shape(), &[12, 9, 18]);
        assert_eq!(tas.attrs["units"], "K");
        assert_eq!(dset.attr_str("convention"), Some("ncar"));
        assert!(dset.contains("date"));
        assert!(!dset.contains("lev"));
    }

    #[test]
    fn hybrid_levels_for_ncar() {
        let stats: Vec<(f64, f64)> = (0..60).map(|i| (i as f64, 1.0)).collect();
        let spec = DatasetSpec::new("ta").with_years(1, 1).with_stats(stats);
        let dset = generate_synthetic_dataset(&spec).unwrap();
        assert_eq!(field(&dset, "ta").dims, vec!["time", "lev", "lat", "lon"]);
        assert!(dset.contains("hyam"));
    }

    #[test]
    fn profile_count_must_match_levels() {
        let spec = DatasetSpec::new("ta")
            .with_years(1, 1)
            .with_stats(vec![(1.0, 1.0), (2.0, 1.0)]);
        match generate_synthetic_dataset(&spec) {
            Err(SyntheticError::LevelMismatch { expected, found }) => {
                assert_eq!(expected, 60);
                assert_eq!(found, 2);
            }
            other => panic!("expected LevelMismatch, got {:?}", other),
        }
    }

    #[test]
    fn gfdl_plev19_selection() {
        let stats: Vec<(f64, f64)> = (0..19).map(|i| (i as f64, 1.0)).collect();
        let spec = DatasetSpec::new("ua")
            .with_convention(Convention::Gfdl)
            .with_years(1, 1)
            .with_time_resolution(TimeResolution::Daily)
            .with_stats(stats);
        let dset = generate_synthetic_dataset(&spec).unwrap();
        assert_eq!(field(&dset, "ua").dims[1], "plev19");
        assert!(dset.contains("average_DT"));
    }

    #[test]
    fn unknown_generator_fails_before_work() {
        let spec = DatasetSpec::new("x")
            .with_generator("gamma", KernelArgs::default())
            .with_spacing(7.0, 7.0);
        assert!(matches!(
            generate_synthetic_dataset(&spec),
            Err(SyntheticError::UnknownGenerator { .. })
        ));
    }

    #[test]
    fn cmip_stamps_global_attributes() {
        let spec = DatasetSpec::new("pr")
            .with_convention(Convention::Cmip)
            .with_years(1850, 1)
            .with_generator(
                "convective",
                KernelArgs {
                    varname: Some("pr".to_string()),
                    ..Default::default()
                },
            );
        let dset = generate_synthetic_dataset(&spec).unwrap();
        for name in CMIP6_GLOBAL_ATTRIBUTES {
            assert_eq!(dset.attr_str(name), Some(""), "missing {}", name);
        }
        assert_eq!(dset.require("bnds").unwrap().attrs["long_name"], "vertex number");
        assert!(dset.contains("lat_bnds"));
        assert_eq!(dset.attr_str("convention"), Some("cmip"));
    }

    #[test]
    fn static_supplied_data_with_aux_coordinate() {
        let values = ArrayD::from_elem(ndarray::IxDyn(&[9, 18]), 2.0);
        let lat2d = ArrayD::from_elem(ndarray::IxDyn(&[9, 18]), 0.0);
        let spec = DatasetSpec::new("orog")
            .static_field(true)
            .with_field(FieldSource::Data(values))
            .with_coordinate(AuxCoordinate {
                name: "lat2d".to_string(),
                source: AuxSource::Data {
                    dims: vec!["lat".to_string(), "lon".to_string()],
                    values: lat2d,
                },
                attrs: str_attrs(&[("units", "degrees_north")]),
            });
        let dset = generate_synthetic_dataset(&spec).unwrap();
        let orog = field(&dset, "orog");
        assert_eq!(orog.dims, vec!["lat", "lon"]);
        assert_eq!(orog.attrs["coordinates"], "lat2d");
        assert!(!dset.contains("time"));
        assert!(dset.attr_str("base_time_unit").is_none());
    }

    #[test]
    fn grid_sourced_field_must_be_static() {
        let spec = DatasetSpec::new("deptho").with_field(FieldSource::Grid("depth".to_string()));
        assert!(matches!(
            generate_synthetic_dataset(&spec),
            Err(SyntheticError::InvalidArgument { .. })
        ));
    }
}
