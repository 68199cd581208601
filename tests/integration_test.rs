//! End-to-end tests: assemble, write to NetCDF, read back through the
//! statistics query.

use mdtf_synthetic::config::ConfigFile;
use mdtf_synthetic::dataset::str_attrs;
use mdtf_synthetic::metadata::{dataset_stats, list_variables};
use mdtf_synthetic::prelude::*;
use mdtf_synthetic::setup::{run_convention, synthetic_main, GenerateOptions, RunOptions};
use ndarray::Array2;
use netcdf::{create, open, AttributeValue};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const NY: usize = 4;
const NX: usize = 6;

/// Write a small MOM6-style static file with every point type
fn write_ocean_static(path: &Path) {
    let mut file = create(path).expect("Failed to create static file");
    for (dim, len) in [("xh", NX), ("xq", NX), ("yh", NY), ("yq", NY)] {
        file.add_dimension(dim, len).expect("Failed to add dimension");
        let mut var = file.add_variable::<f64>(dim, &[dim]).expect("Failed to add axis");
        let values: Vec<f64> = (0..len).map(|i| i as f64 * 10.0).collect();
        var.put_values(&values, ..).expect("Failed to write axis");
    }

    // one land row at the bottom
    let wet = Array2::from_shape_fn((NY, NX), |(j, _)| if j == 0 { 0.0 } else { 1.0 });
    let lat = Array2::from_shape_fn((NY, NX), |(j, _)| -60.0 + 40.0 * j as f64);
    let lon = Array2::from_shape_fn((NY, NX), |(_, i)| 30.0 + 60.0 * i as f64);

    for (sfx, ydim, xdim) in [("", "yh", "xh"), ("_u", "yh", "xq"), ("_v", "yq", "xh"), ("_c", "yq", "xq")] {
        for (name, values) in [("geolat", &lat), ("geolon", &lon), ("wet", &wet)] {
            let mut var = file
                .add_variable::<f64>(&format!("{}{}", name, sfx), &[ydim, xdim])
                .expect("Failed to add grid variable");
            var.put(values.view(), ..).expect("Failed to write grid variable");
        }
    }

    let depth = Array2::from_shape_fn((NY, NX), |(j, i)| if j == 0 { 0.0 } else { 100.0 * (i + 1) as f64 });
    let mut var = file
        .add_variable::<f64>("depth_ocean", &["yh", "xh"])
        .expect("Failed to add depth");
    var.put(depth.view(), ..).expect("Failed to write depth");
}

fn str_attr(var: &netcdf::Variable, name: &str) -> String {
    match var.attribute(name).expect("Missing attribute").value().unwrap() {
        AttributeValue::Str(s) => s,
        other => panic!("unexpected attribute value {:?}", other),
    }
}

#[test]
fn gfdl_daily_round_trip_recovers_statistics() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("tas.nc");

    let spec = DatasetSpec::new("tas")
        .with_convention(Convention::Gfdl)
        .with_time_resolution(TimeResolution::Daily)
        .with_years(1, 2)
        .with_attrs(str_attrs(&[("units", "K")]))
        .with_stats(vec![(280.0, 5.0)]);
    let dset = generate_synthetic_dataset(&spec).unwrap();
    write_to_netcdf(&dset, &path, TimeDtype::Float).unwrap();

    let stats = dataset_stats(&path, "tas", None).unwrap();
    assert_eq!(stats.len(), 1);
    let (mean, std) = stats[0];
    assert!((mean - 280.0).abs() < 0.2, "mean {}", mean);
    assert!((std - 5.0).abs() < 0.2, "std {}", std);

    let file = open(&path).unwrap();
    let time = file.variable("time").unwrap();
    assert_eq!(time.dimensions()[0].len(), 730);
    assert_eq!(str_attr(&time, "units"), "days since 0001-01-01");
    assert_eq!(str_attr(&time, "calendar"), "noleap");
    let first: Vec<f64> = time.get_values::<f64, _>(..).unwrap();
    assert_eq!(first[0], 0.5);

    let tas = file.variable("tas").unwrap();
    let dims: Vec<String> = tas.dimensions().iter().map(|d| d.name()).collect();
    assert_eq!(dims, vec!["time", "lat", "lon"]);
    assert_eq!(str_attr(&tas, "units"), "K");
    for name in ["average_T1", "average_T2", "average_DT", "time_bnds", "lat_bnds"] {
        assert!(file.variable(name).is_some(), "missing {}", name);
    }
    assert!(file.variable("date").is_none());

    let history = match file.attribute("history").unwrap().value().unwrap() {
        AttributeValue::Str(s) => s,
        other => panic!("unexpected history {:?}", other),
    };
    assert!(history.starts_with("Created by mdtf-synthetic on "));

    // limiting to the first samples still reduces every grid cell
    let limited = dataset_stats(&path, "tas", Some(10)).unwrap();
    assert!((limited[0].0 - 280.0).abs() < 1.0);
}

#[test]
fn ncar_monthly_levels_reduce_per_level() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("ta.nc");

    let profiles: Vec<(f64, f64)> = (0..60).map(|k| (200.0 + k as f64, 1.0)).collect();
    let spec = DatasetSpec::new("ta")
        .with_years(1, 1)
        .with_stats(profiles);
    let dset = generate_synthetic_dataset(&spec).unwrap();
    write_to_netcdf(&dset, &path, TimeDtype::Int).unwrap();

    let stats = dataset_stats(&path, "ta", None).unwrap();
    assert_eq!(stats.len(), 60);
    assert!((stats[0].0 - 200.0).abs() < 0.5);
    assert!((stats[59].0 - 259.0).abs() < 0.5);

    let names = list_variables(&path).unwrap();
    for name in ["time", "time_bnds", "date", "lev", "hyam", "hybm", "lat", "lon", "ta"] {
        assert!(names.iter().any(|n| n == name), "missing {}", name);
    }

    let file = open(&path).unwrap();
    let date: Vec<i32> = file.variable("date").unwrap().get_values::<i32, _>(..).unwrap();
    assert_eq!(date[0], 10201);
    assert_eq!(date[11], 20101);
    let time: Vec<i32> = file.variable("time").unwrap().get_values::<i32, _>(..).unwrap();
    assert_eq!(time[0], 31);
}

#[test]
fn gfdl_daily_times_cannot_be_integers() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let spec = DatasetSpec::new("tas")
        .with_convention(Convention::Gfdl)
        .with_time_resolution(TimeResolution::Daily)
        .with_years(1, 1);
    let dset = generate_synthetic_dataset(&spec).unwrap();
    let err = write_to_netcdf(&dset, &temp_dir.path().join("tas.nc"), TimeDtype::Int).unwrap_err();
    assert!(matches!(err, SyntheticError::EncodingError(_)));
}

const CMIP_CONFIG: &str = r#"
variables:
  name: [pr, ua]
pr:
  atts:
    units: kg m-2 s-1
    standard_name: precipitation_flux
  generator:
    name: convective
    args:
      varname: pr
ua:
  atts:
    units: m s-1
  stats: [[1.0, 1.0], [2.0, 1.0], [3.0, 1.0], [4.0, 1.0], [5.0, 1.0], [6.0, 1.0], [7.0, 1.0],
          [8.0, 1.0], [9.0, 1.0], [10.0, 1.0], [11.0, 1.0], [12.0, 1.0], [13.0, 1.0],
          [14.0, 1.0], [15.0, 1.0], [16.0, 1.0], [17.0, 1.0], [18.0, 1.0], [19.0, 1.0]]
"#;

#[test]
fn cmip_run_writes_named_files() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let config = ConfigFile::from_yaml_str(CMIP_CONFIG).unwrap();
    let opts = RunOptions {
        convention: Convention::Cmip,
        casename: "CMIP.Synthetic".to_string(),
        output_dir: temp_dir.path().to_path_buf(),
        timeres: TimeResolution::Monthly,
        dlon: 30.0,
        dlat: 30.0,
        startyear: 1850,
        nyears: 1,
        time_dtype: TimeDtype::Float,
        static_file: None,
    };

    let written = synthetic_main(&config, &opts).unwrap();
    let expected: Vec<PathBuf> = ["pr", "ua"]
        .iter()
        .map(|v| {
            temp_dir
                .path()
                .join("CMIP_Synthetic_r1i1p1f1_gr1_185001-185012")
                .join(format!("{}_mon_CMIP_Synthetic_r1i1p1f1_gr1_185001-185012.nc", v))
        })
        .collect();
    assert_eq!(written, expected);

    let file = open(&written[1]).unwrap();
    let ua = file.variable("ua").unwrap();
    let dims: Vec<String> = ua.dimensions().iter().map(|d| d.name()).collect();
    assert_eq!(dims, vec!["time", "plev19", "lat", "lon"]);
    assert_eq!(str_attr(&file.variable("bnds").unwrap(), "long_name"), "vertex number");
    assert!(file.attribute("variant_label").is_some());
    match file.attribute("convention").unwrap().value().unwrap() {
        AttributeValue::Str(s) => assert_eq!(s, "cmip"),
        other => panic!("unexpected convention {:?}", other),
    }
}

#[test]
fn gfdl_convention_run_from_config_dir() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let config_dir = temp_dir.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("gfdl_day.yml"),
        "variables:\n  name: [tas]\ntas:\n  atts: {units: K}\n  stats: [280.0, 2.0]\n",
    )
    .unwrap();

    let opts = GenerateOptions {
        convention: Convention::Gfdl,
        startyear: 1,
        nyears: 1,
        dlat: 30.0,
        dlon: 60.0,
        config_dir,
        output_dir: temp_dir.path().join("out"),
        static_file: None,
        time_dtype: TimeDtype::Float,
    };
    let written = run_convention(&opts).unwrap();
    let expected = temp_dir
        .path()
        .join("out/GFDL.Synthetic/day/GFDL.Synthetic.tas.day.nc");
    assert_eq!(written, vec![expected.clone()]);
    assert!(expected.is_file());

    // a second run overwrites the same files
    assert_eq!(run_convention(&opts).unwrap(), vec![expected]);
}

#[test]
fn missing_config_file_is_reported() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let opts = GenerateOptions {
        convention: Convention::Ncar,
        startyear: 1,
        nyears: 1,
        dlat: 20.0,
        dlon: 20.0,
        config_dir: temp_dir.path().join("nowhere"),
        output_dir: temp_dir.path().to_path_buf(),
        static_file: None,
        time_dtype: TimeDtype::Float,
    };
    assert!(matches!(
        run_convention(&opts),
        Err(SyntheticError::ConfigError(_))
    ));
    // directories for every planned resolution exist even so
    for res in ["mon", "day", "3hr", "1hr"] {
        assert!(temp_dir.path().join("NCAR.Synthetic").join(res).is_dir());
    }
}

#[test]
fn tripolar_static_field_from_grid() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let static_path = temp_dir.path().join("ocean_static.nc");
    write_ocean_static(&static_path);

    let spec = DatasetSpec::new("deptho")
        .with_convention(Convention::Gfdl)
        .with_grid(GridKind::Tripolar, PointType::T)
        .with_field(FieldSource::Grid("depth".to_string()))
        .static_field(true)
        .with_static_file(&static_path);
    let dset = generate_synthetic_dataset(&spec).unwrap();

    let deptho = dset.require("deptho").unwrap();
    assert_eq!(deptho.dims, vec!["yh", "xh"]);
    let values = deptho.data.to_f64().unwrap();
    assert!(values[[0, 0]].is_nan());
    assert_eq!(values[[1, 2]], 300.0);
    for dropped in ["mask", "wet", "depth"] {
        assert!(!dset.contains(dropped), "{} should be dropped", dropped);
    }
    assert!(dset.contains("geolat") && dset.contains("geolon"));
    assert!(!dset.contains("time"));

    let out = temp_dir.path().join("deptho.nc");
    write_to_netcdf(&dset, &out, TimeDtype::Float).unwrap();
    let stats = dataset_stats(&out, "deptho", None).unwrap();
    // land row is stored as fill and skipped
    assert_eq!(stats[0].0, 350.0);

    let file = open(&out).unwrap();
    let stored = file.variable("deptho").unwrap().get_values::<f64, _>(..).unwrap();
    assert_eq!(stored[0], 1.0e20);
    assert_eq!(stored[NX + 2], 300.0);
}

#[test]
fn tripolar_ncar_renames_dimensions() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let static_path = temp_dir.path().join("ocean_static.nc");
    write_ocean_static(&static_path);

    let spec = DatasetSpec::new("uo")
        .with_years(1, 1)
        .with_grid(GridKind::Tripolar, PointType::U)
        .with_static_file(&static_path);
    let dset = generate_synthetic_dataset(&spec).unwrap();

    let uo = dset.require("uo").unwrap();
    assert_eq!(uo.dims, vec!["time", "nlat", "nlon"]);
    assert_eq!(uo.shape(), &[12, NY, NX]);
    let nlon = dset.require("nlon").unwrap();
    assert_eq!(nlon.data, ArrayData::Int32(ndarray::Array1::from(vec![1, 2, 3, 4, 5, 6]).into_dyn()));
    assert_eq!(nlon.attrs["long_name"], "cell index along first dimension");
    assert!(dset.contains("lat") && dset.contains("lon"));
    assert!(!dset.contains("wet_u"));

    // longitude really holds longitudes
    let lon = dset.require("lon").unwrap().data.to_f64().unwrap();
    assert_eq!(lon[[0, 1]], 90.0);
}

#[test]
fn tripolar_cmip_levels_use_ocean_depth() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let static_path = temp_dir.path().join("ocean_static.nc");
    write_ocean_static(&static_path);

    let depth_profiles: Vec<(f64, f64)> = (0..35).map(|k| (20.0 - 0.5 * k as f64, 1.0)).collect();
    let spec = DatasetSpec::new("thetao")
        .with_convention(Convention::Cmip)
        .with_years(1, 1)
        .with_grid(GridKind::Tripolar, PointType::T)
        .with_stats(depth_profiles)
        .with_static_file(&static_path);
    let dset = generate_synthetic_dataset(&spec).unwrap();
    assert_eq!(dset.require("thetao").unwrap().dims, vec!["time", "lev", "nlat", "nlon"]);
    assert!(dset.contains("z_l") && dset.contains("z_i"));

    let wrong = spec.clone().with_stats(vec![(1.0, 1.0), (2.0, 1.0), (3.0, 1.0)]);
    match generate_synthetic_dataset(&wrong) {
        Err(SyntheticError::LevelMismatch { expected, found }) => {
            assert_eq!(expected, 35);
            assert_eq!(found, 3);
        }
        other => panic!("expected LevelMismatch, got {:?}", other),
    }

    // 19 profiles on an ocean grid are not pressure levels
    let plev_like: Vec<(f64, f64)> = (0..19).map(|k| (k as f64, 1.0)).collect();
    match generate_synthetic_dataset(&spec.clone().with_stats(plev_like)) {
        Err(SyntheticError::LevelMismatch { expected, found }) => {
            assert_eq!(expected, 35);
            assert_eq!(found, 19);
        }
        other => panic!("expected LevelMismatch, got {:?}", other),
    }
}

#[test]
fn missing_static_file_is_reported() {
    let spec = DatasetSpec::new("tos")
        .with_grid(GridKind::Tripolar, PointType::T)
        .with_static_file("/nonexistent/ocean_static.nc");
    assert!(matches!(
        generate_synthetic_dataset(&spec),
        Err(SyntheticError::StaticFileNotFound { .. })
    ));
}
