//! Defines command-line interface options using `clap` for the mdtf-synthetic application.

use crate::convention::Convention;
use crate::errors::{Result, SyntheticError};
use crate::netcdf_io::TimeDtype;
use crate::setup::GenerateOptions;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Synthetic climate-model NetCDF fixture generator
#[derive(Parser, Debug)]
#[command(
    version,
    name = "mdtf-synthetic",
    about = "Generate synthetic GFDL, NCAR/CESM and CMIP-style NetCDF datasets"
)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate every configured variable for one convention
    Generate(GenerateArgs),
    /// Print the variables of a file, or per-level mean/std of one variable
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Model convention: GFDL, CESM, NCAR or CMIP
    #[arg(short, long, value_parser = parse_convention)]
    pub convention: Convention,

    /// Start year of time period
    #[arg(long, default_value_t = 1)]
    pub startyear: i32,

    /// Total length of time period in years
    #[arg(long, default_value_t = 10)]
    pub nyears: u32,

    /// Latitude resolution in degrees, valid range [0.5, 30.0]
    #[arg(long, default_value_t = 20.0)]
    pub dlat: f64,

    /// Longitude resolution in degrees, valid range [0.5, 60.0]
    #[arg(long, default_value_t = 20.0)]
    pub dlon: f64,

    /// Directory holding the <convention>_<res>.yml variable files
    #[arg(long, default_value = "config")]
    pub config_dir: PathBuf,

    /// Root directory for generated output
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Reference ocean static file for tripolar variables
    #[arg(long)]
    pub ocean_static: Option<PathBuf>,

    /// Storage type for time variables: float or int
    #[arg(long, default_value_t = TimeDtype::Float, value_parser = parse_time_dtype)]
    pub time_dtype: TimeDtype,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Path to the NetCDF file
    pub file: PathBuf,

    /// Variable to reduce; lists the variables when omitted
    #[arg(long)]
    pub var: Option<String>,

    /// Only use the first N time samples
    #[arg(long)]
    pub limit: Option<usize>,

    /// Number of threads to use for parallel processing. Defaults to number of CPU cores.
    #[arg(short = 't', long)]
    pub threads: Option<usize>,
}

fn parse_convention(s: &str) -> std::result::Result<Convention, String> {
    s.parse::<Convention>().map_err(|e| e.to_string())
}

fn parse_time_dtype(s: &str) -> std::result::Result<TimeDtype, String> {
    s.parse::<TimeDtype>().map_err(|e| e.to_string())
}

impl GenerateArgs {
    /// Check ranges and convert into generation settings
    pub fn into_options(self) -> Result<GenerateOptions> {
        if !(0.5..=30.0).contains(&self.dlat) {
            return Err(SyntheticError::InvalidArgument {
                message: format!("dlat value {} is invalid; valid range is [0.5 30.0]", self.dlat),
            });
        }
        if !(0.5..=60.0).contains(&self.dlon) {
            return Err(SyntheticError::InvalidArgument {
                message: format!("dlon value {} is invalid; valid range is [0.5 60.0]", self.dlon),
            });
        }
        if self.nyears == 0 {
            return Err(SyntheticError::InvalidArgument {
                message: "nyears must be at least 1".to_string(),
            });
        }
        Ok(GenerateOptions {
            convention: self.convention,
            startyear: self.startyear,
            nyears: self.nyears,
            dlat: self.dlat,
            dlon: self.dlon,
            config_dir: self.config_dir,
            output_dir: self.output_dir,
            static_file: self.ocean_static,
            time_dtype: self.time_dtype,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generate_defaults() {
        let cli = Cli::try_parse_from(["mdtf-synthetic", "generate", "-c", "CESM"]).unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.convention, Convention::Ncar);
        assert_eq!(args.nyears, 10);
        let opts = args.into_options().unwrap();
        assert_eq!(opts.dlat, 20.0);
        assert_eq!(opts.time_dtype, TimeDtype::Float);
    }

    #[test]
    fn rejects_out_of_range_spacing() {
        let cli = Cli::try_parse_from([
            "mdtf-synthetic",
            "generate",
            "--convention",
            "GFDL",
            "--dlon",
            "61",
        ])
        .unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert!(matches!(
            args.into_options(),
            Err(SyntheticError::InvalidArgument { .. })
        ));
        assert!(Cli::try_parse_from(["mdtf-synthetic", "generate", "-c", "ECMWF"]).is_err());
    }

    #[test]
    fn parses_stats() {
        let cli =
            Cli::try_parse_from(["mdtf-synthetic", "stats", "out.nc", "--var", "tas", "--limit", "3"])
                .unwrap();
        let Command::Stats(args) = cli.command else {
            panic!("expected stats");
        };
        assert_eq!(args.var.as_deref(), Some("tas"));
        assert_eq!(args.limit, Some(3));
    }
}
