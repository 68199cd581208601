//! Unit tests for the public API of mdtf_synthetic modules
//!
//! These cover the builders one at a time; the integration tests cover the
//! whole generate-write-read path.

use mdtf_synthetic::{
    calendar::NoLeapDateTime,
    config::ConfigFile,
    convention::Convention,
    dataset::{ArrayData, SyntheticDataset},
    errors::SyntheticError,
    generators::{generate_random_array, KernelArgs},
    horizontal::{adjust_spacing, construct_rect_grid, GridKind},
    netcdf_io::{encode_dataset, EncodedValues, TimeDtype},
    parallel::ParallelConfig,
    setup::{cmip_date_token, output_path},
    time_axis::{generate_time_axis, times_from_tuples, TimeResolution},
    vertical::{select_vertical, VerticalKind},
};
use std::path::Path;
use tempfile::tempdir;

const CONVENTIONS: [Convention; 3] = [Convention::Ncar, Convention::Gfdl, Convention::Cmip];

#[test]
fn test_error_messages() {
    let err = SyntheticError::LevelMismatch {
        expected: 35,
        found: 3,
    };
    let msg = format!("{}", err);
    assert!(msg.contains("35") && msg.contains('3'));

    let err = SyntheticError::VariableNotFound {
        var: "tas".to_string(),
    };
    assert!(format!("{}", err).contains("Variable 'tas' not found"));

    let err = "ecmwf".parse::<Convention>().unwrap_err();
    assert!(format!("{}", err).contains("ecmwf"));
}

#[test]
fn test_time_axis_lengths() {
    for conv in CONVENTIONS {
        let mon = generate_time_axis(TimeResolution::Monthly, 1, 3, conv).unwrap();
        assert_eq!(mon.len(), 36);
        assert!(mon.is_contiguous());

        let day = generate_time_axis(TimeResolution::Daily, 1, 2, conv).unwrap();
        assert_eq!(day.len(), 730);
        assert!(day.is_contiguous());

        let three = generate_time_axis(TimeResolution::Hourly(3), 1, 1, conv).unwrap();
        assert_eq!(three.len(), 365 * 8);
        // the first bound collapses onto the first sample
        assert_eq!(three.bounds[0].0, three.bounds[0].1);
        assert_eq!(three.bounds[2], (three.times[1], three.times[2]));
    }
}

#[test]
fn test_monthly_sample_days() {
    let ncar = generate_time_axis(TimeResolution::Monthly, 2000, 1, Convention::Ncar).unwrap();
    assert_eq!(ncar.times[0], NoLeapDateTime::ymd(2000, 2, 1));
    assert_eq!(ncar.times[11], NoLeapDateTime::ymd(2001, 1, 1));

    let gfdl = generate_time_axis(TimeResolution::Monthly, 2000, 1, Convention::Gfdl).unwrap();
    assert_eq!(gfdl.times[0], NoLeapDateTime::ymd(2000, 1, 15));
    assert_eq!(gfdl.bounds[11], (NoLeapDateTime::ymd(2000, 12, 1), NoLeapDateTime::ymd(2001, 1, 1)));
}

#[test]
fn test_explicit_time_tuples() {
    let times = vec![NoLeapDateTime::ymd(10, 1, 16), NoLeapDateTime::ymd(10, 2, 15)];
    let edges = [
        NoLeapDateTime::ymd(10, 1, 1),
        NoLeapDateTime::ymd(10, 2, 1),
        NoLeapDateTime::ymd(10, 3, 1),
    ];
    let dset = times_from_tuples(times.clone(), &edges, Convention::Ncar).unwrap();
    assert_eq!(dset.attr_str("base_time_unit"), Some("days since 0010-01-01"));
    assert!(dset.contains("date"));

    assert!(matches!(
        times_from_tuples(times, &edges[..2], Convention::Ncar),
        Err(SyntheticError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_rect_grid_adjustment() {
    let (spacing, adjustment) = adjust_spacing("dlat", 180.0, 7.0).unwrap();
    assert_eq!(spacing, 180.0 / 25.0);
    assert!(adjustment.is_some());

    let grid = construct_rect_grid(7.0, 7.0, true, Convention::Gfdl, true).unwrap();
    assert_eq!(grid.dim_len("lat"), Some(25));
    assert_eq!(grid.dim_len("lon"), Some(51));
    assert_eq!(grid.warnings.len(), 2);
    assert_eq!(grid.require("lat").unwrap().attrs["bounds"], "lat_bnds");
}

#[test]
fn test_vertical_selection() {
    assert_eq!(
        select_vertical(Convention::Ncar, GridKind::Rectilinear, 60),
        Some(VerticalKind::NcarHybrid)
    );
    assert_eq!(
        select_vertical(Convention::Gfdl, GridKind::Rectilinear, 32),
        Some(VerticalKind::GfdlPressure)
    );
    assert_eq!(select_vertical(Convention::Gfdl, GridKind::Rectilinear, 1), None);
    assert_eq!("rho2_l".parse::<VerticalKind>().unwrap(), VerticalKind::Mom6Density);

    for kind in VerticalKind::ALL {
        let dset = kind.build().unwrap();
        let dim = kind.level_dim(Convention::Gfdl);
        assert_eq!(dset.dim_len(dim), Some(kind.levels()), "{}", kind);
    }
}

#[test]
fn test_generator_registry() {
    let args = KernelArgs {
        varname: Some("cwv".to_string()),
        ..Default::default()
    };
    let cwv = generate_random_array((3, 4), 2, "convective", &args).unwrap();
    assert_eq!(cwv.shape(), &[2, 3, 4]);
    assert!(cwv.iter().all(|&v| v > 0.0));

    assert!(matches!(
        generate_random_array((3, 4), 2, "lognormal", &KernelArgs::default()),
        Err(SyntheticError::UnknownGenerator { .. })
    ));
}

#[test]
fn test_encoding_of_empty_dataset() {
    let encoded = encode_dataset(&SyntheticDataset::new(), TimeDtype::Int).unwrap();
    assert!(encoded.is_empty());

    let dset = times_from_tuples(
        vec![NoLeapDateTime::ymd(1, 1, 2)],
        &[NoLeapDateTime::ymd(1, 1, 1), NoLeapDateTime::ymd(1, 1, 3)],
        Convention::Gfdl,
    )
    .unwrap();
    let encoded = encode_dataset(&dset, TimeDtype::Int).unwrap();
    let time = encoded.iter().find(|e| e.name == "time").unwrap();
    assert!(matches!(&time.values, EncodedValues::Int32(v) if v[[0]] == 1));
    let dt = dset.require("average_DT").unwrap();
    assert!(matches!(&dt.data, ArrayData::TimeDelta(d) if d[[0]] == 2.0));
}

#[test]
fn test_config_from_file() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("ncar_mon.yml");
    std::env::set_var("MDTF_SYNTHETIC_UNIT_TEST_MEAN", "273.15");
    std::fs::write(
        &path,
        "variables:\n  name: [ts]\nts:\n  atts: {units: K}\n  stats: [${MDTF_SYNTHETIC_UNIT_TEST_MEAN}, 1.0]\n",
    )
    .unwrap();

    let cfg = ConfigFile::load(&path).unwrap();
    let stats = cfg.get("ts").unwrap().stats.clone().unwrap().into_profiles();
    assert_eq!(stats, vec![(273.15, 1.0)]);

    assert!(matches!(
        ConfigFile::load(&temp_dir.path().join("missing.yml")),
        Err(SyntheticError::ConfigError(_))
    ));
}

#[test]
fn test_output_naming() {
    assert_eq!(cmip_date_token(1, 10, TimeResolution::Daily), "00010101-00101231");
    let ncar = output_path(
        Convention::Ncar,
        Path::new("out"),
        "NCAR.Synthetic",
        "PRECT",
        TimeResolution::Hourly(3),
        1,
        10,
    );
    assert_eq!(ncar, Path::new("out/NCAR.Synthetic/3hr/NCAR.Synthetic.PRECT.3hr.nc"));
}

#[test]
fn test_parallel_config() {
    let config = ParallelConfig::new(None);
    assert!(config.num_threads.is_none());
    assert!(config.setup_global_pool().is_ok());
}
