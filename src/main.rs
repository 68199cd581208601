//! Entry point for the mdtf-synthetic application.
//! Handles CLI parsing, logging setup, and dispatches generation or the statistics query.

use clap::Parser;
use mdtf_synthetic::cli::{Cli, Command, StatsArgs};
use mdtf_synthetic::metadata::{dataset_stats, list_variables, print_level_stats, print_metadata};
use mdtf_synthetic::parallel::{get_parallel_info, ParallelConfig};
use mdtf_synthetic::setup::run_convention;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run_stats(args: StatsArgs, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    ParallelConfig::new(args.threads).setup_global_pool()?;
    if verbose {
        get_parallel_info().print_info();
    }

    match args.var {
        Some(var) => {
            let stats = dataset_stats(&args.file, &var, args.limit)?;
            print_level_stats(&var, &stats);
        }
        None => {
            let file = netcdf::open(&args.file)?;
            print_metadata(&file)?;
            println!("\n{} variables", list_variables(&args.file)?.len());
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Generate(args) => {
            let opts = args.into_options()?;
            println!("Starting mdtf-synthetic for the {} convention", opts.convention);
            let written = run_convention(&opts)?;
            println!("✅ Wrote {} files under {}", written.len(), opts.output_dir.display());
        }
        Command::Stats(args) => run_stats(args, cli.verbose)?,
    }

    Ok(())
}
