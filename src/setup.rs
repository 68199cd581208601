//! Output layout and the generation loop
//!
//! GFDL and NCAR files land in `<output>/<case>/<res>/<case>.<var>.<res>.nc`.
//! CMIP files land in `<output>/<case_>_r1i1p1f1_gr1_<years>/` and are named
//! `<var>_<res>_<case_>_r1i1p1f1_gr1_<years>.nc`, where `<case_>` is the case
//! name with dots replaced by underscores and `<years>` is the date-range
//! token.

use crate::config::ConfigFile;
use crate::convention::Convention;
use crate::errors::Result;
use crate::netcdf_io::{write_to_netcdf, TimeDtype};
use crate::synthetic::{generate_synthetic_dataset, DatasetSpec};
use crate::time_axis::TimeResolution;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// CMIP ensemble and grid labels
const CMIP_MEMBER: &str = "r1i1p1f1_gr1";

/// Run-wide settings for one configuration file
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub convention: Convention,
    pub casename: String,
    pub output_dir: PathBuf,
    pub timeres: TimeResolution,
    pub dlon: f64,
    pub dlat: f64,
    pub startyear: i32,
    pub nyears: u32,
    pub time_dtype: TimeDtype,
    pub static_file: Option<PathBuf>,
}

impl RunOptions {
    /// Request carrying these settings, ready for a variable record
    pub fn base_spec(&self) -> DatasetSpec {
        let mut spec = DatasetSpec::new("")
            .with_convention(self.convention)
            .with_spacing(self.dlon, self.dlat)
            .with_years(self.startyear, self.nyears)
            .with_time_resolution(self.timeres);
        if let Some(path) = &self.static_file {
            spec = spec.with_static_file(path.clone());
        }
        spec
    }

    pub fn output_path(&self, varname: &str) -> PathBuf {
        output_path(
            self.convention,
            &self.output_dir,
            &self.casename,
            varname,
            self.timeres,
            self.startyear,
            self.nyears,
        )
    }
}

/// Zero-padded `start-end` year token, with month or day suffixes for
/// monthly and daily output
pub fn cmip_date_token(startyear: i32, nyears: u32, timeres: TimeResolution) -> String {
    let endyear = startyear + nyears as i32 - 1;
    let (start_sfx, end_sfx) = match timeres {
        TimeResolution::Monthly => ("01", "12"),
        TimeResolution::Daily => ("0101", "1231"),
        TimeResolution::Hourly(_) => ("", ""),
    };
    format!("{:04}{}-{:04}{}", startyear, start_sfx, endyear, end_sfx)
}

/// Directory holding one resolution's files
pub fn output_root(
    convention: Convention,
    output_dir: &Path,
    casename: &str,
    timeres: TimeResolution,
    startyear: i32,
    nyears: u32,
) -> PathBuf {
    match convention {
        Convention::Cmip => output_dir.join(format!(
            "{}_{}_{}",
            casename.replace('.', "_"),
            CMIP_MEMBER,
            cmip_date_token(startyear, nyears, timeres)
        )),
        Convention::Gfdl | Convention::Ncar => {
            output_dir.join(casename).join(timeres.keyword())
        }
    }
}

/// Full path of one variable's file
pub fn output_path(
    convention: Convention,
    output_dir: &Path,
    casename: &str,
    varname: &str,
    timeres: TimeResolution,
    startyear: i32,
    nyears: u32,
) -> PathBuf {
    let root = output_root(convention, output_dir, casename, timeres, startyear, nyears);
    let filename = match convention {
        Convention::Cmip => format!(
            "{}_{}_{}_{}_{}.nc",
            varname,
            timeres,
            casename.replace('.', "_"),
            CMIP_MEMBER,
            cmip_date_token(startyear, nyears, timeres)
        ),
        Convention::Gfdl | Convention::Ncar => {
            format!("{}.{}.{}.nc", casename, varname, timeres)
        }
    };
    root.join(filename)
}

/// Create the output directory of every planned resolution; existing
/// directories are left alone
pub fn create_output_dirs(
    convention: Convention,
    output_dir: &Path,
    casename: &str,
    plan: &[ResolutionRun],
    startyear: i32,
    nyears: u32,
) -> Result<Vec<PathBuf>> {
    info!("Creating output data directories");
    plan.iter()
        .map(|run| -> Result<PathBuf> {
            let root = output_root(convention, output_dir, casename, run.timeres, startyear, nyears);
            fs::create_dir_all(&root)?;
            Ok(root)
        })
        .collect()
}

/// Generate and write every variable of one configuration file.
///
/// Returns the written paths in configuration order.
pub fn synthetic_main(config: &ConfigFile, opts: &RunOptions) -> Result<Vec<PathBuf>> {
    info!(
        "Generating {} variables with time resolution of {}",
        config.variables.len(),
        opts.timeres
    );
    let mut written = Vec::with_capacity(config.variables.len());
    for (varname, record) in &config.variables {
        let spec = record.to_dataset_spec(varname, opts.base_spec())?;
        let dset = generate_synthetic_dataset(&spec)?;
        for message in &dset.warnings {
            warn!("{}: {}", varname, message);
        }

        let path = opts.output_path(varname);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        write_to_netcdf(&dset, &path, opts.time_dtype)?;
        info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// One resolution pass of a convention's run
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionRun {
    pub timeres: TimeResolution,
    /// `(dlon, dlat)` that replaces the requested spacing
    pub spacing: Option<(f64, f64)>,
    /// Configuration file stem under the config directory
    pub config_name: String,
}

/// Resolutions generated for each convention, with their config files
pub fn resolution_plan(convention: Convention) -> Vec<ResolutionRun> {
    let run = |timeres: TimeResolution, spacing: Option<(f64, f64)>| ResolutionRun {
        timeres,
        spacing,
        config_name: format!("{}_{}", convention.as_str(), timeres),
    };
    match convention {
        Convention::Gfdl => vec![run(TimeResolution::Daily, None)],
        Convention::Ncar => vec![
            run(TimeResolution::Monthly, None),
            run(TimeResolution::Daily, Some((5.0, 5.0))),
            run(TimeResolution::Hourly(3), None),
            run(TimeResolution::Hourly(1), None),
        ],
        Convention::Cmip => vec![
            run(TimeResolution::Monthly, None),
            run(TimeResolution::Daily, None),
        ],
    }
}

/// Default case name for a convention
pub fn default_casename(convention: Convention) -> &'static str {
    match convention {
        Convention::Gfdl => "GFDL.Synthetic",
        Convention::Ncar => "NCAR.Synthetic",
        Convention::Cmip => "CMIP.Synthetic",
    }
}

/// Settings shared by every resolution pass of a convention
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    pub convention: Convention,
    pub startyear: i32,
    pub nyears: u32,
    pub dlat: f64,
    pub dlon: f64,
    pub config_dir: PathBuf,
    pub output_dir: PathBuf,
    pub static_file: Option<PathBuf>,
    pub time_dtype: TimeDtype,
}

/// Run every resolution pass of a convention
pub fn run_convention(opts: &GenerateOptions) -> Result<Vec<PathBuf>> {
    let plan = resolution_plan(opts.convention);
    let casename = default_casename(opts.convention);
    create_output_dirs(
        opts.convention,
        &opts.output_dir,
        casename,
        &plan,
        opts.startyear,
        opts.nyears,
    )?;

    let mut written = Vec::new();
    for pass in &plan {
        let config_path = opts.config_dir.join(format!("{}.yml", pass.config_name));
        info!("Importing {} variable information from {}", opts.convention, config_path.display());
        let config = ConfigFile::load(&config_path)?;

        let (dlon, dlat) = pass.spacing.unwrap_or((opts.dlon, opts.dlat));
        let run = RunOptions {
            convention: opts.convention,
            casename: casename.to_string(),
            output_dir: opts.output_dir.clone(),
            timeres: pass.timeres,
            dlon,
            dlat,
            startyear: opts.startyear,
            nyears: opts.nyears,
            time_dtype: opts.time_dtype,
            static_file: opts.static_file.clone(),
        };
        written.extend(synthetic_main(&config, &run)?);
    }
    Ok(written)
}
